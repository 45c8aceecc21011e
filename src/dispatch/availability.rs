use std::collections::HashMap;
use std::num::NonZeroU32;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect, RelationTrait};
use sea_orm::sea_query::{Expr, JoinType, Query};
use uuid::Uuid;

use crate::entities::ride_status::RideStatusKind;
use crate::entities::{chair, chair_model, latest_chair_location, ride, ride_status};
use crate::utils::geo::Coordinate;

/// A chair that may take a new ride this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChairCandidate {
    pub chair_id: Uuid,
    /// Live position from the location cache.
    pub anchor: Coordinate,
    pub speed: NonZeroU32,
}

/// Latest event of a ride's status log: newest `created_at`, with the
/// milestone rank breaking timestamp ties.
pub fn latest_status<'a>(
    events: impl IntoIterator<Item = &'a ride_status::Model>,
) -> Option<RideStatusKind> {
    events
        .into_iter()
        .max_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.status.rank().cmp(&b.status.rank()))
        })
        .map(|e| e.status)
}

/// The one definition of a finished ride. The delivered-to-chair marker is
/// not consulted.
pub fn is_finished(latest: Option<RideStatusKind>) -> bool {
    matches!(latest, Some(RideStatusKind::Completed))
}

/// Which chairs are currently carrying an unfinished ride.
///
/// Rebuilt from storage for every cycle and handed to the resolver.
#[derive(Debug, Clone, Default)]
pub struct ChairStatusBook {
    open_rides: HashMap<Uuid, Uuid>,
}

impl ChairStatusBook {
    pub fn from_history(rides: &[ride::Model], statuses: &[ride_status::Model]) -> Self {
        let mut by_ride: HashMap<Uuid, Vec<&ride_status::Model>> = HashMap::new();
        for event in statuses {
            by_ride.entry(event.ride_id).or_default().push(event);
        }

        let mut open_rides = HashMap::new();
        for r in rides {
            let Some(chair_id) = r.chair_id else {
                continue;
            };
            let latest = by_ride
                .get(&r.id)
                .and_then(|events| latest_status(events.iter().copied()));
            if is_finished(latest) {
                continue;
            }
            if let Some(previous) = open_rides.insert(chair_id, r.id) {
                tracing::warn!(
                    chair_id = %chair_id,
                    ride_id = %r.id,
                    other_ride_id = %previous,
                    "Chair holds more than one unfinished ride"
                );
            }
        }

        Self { open_rides }
    }

    /// Load the book from storage, optionally for a single chair.
    pub async fn load<C: ConnectionTrait>(conn: &C, chair_id: Option<Uuid>) -> Result<Self, DbErr> {
        let rides = load_open_rides(conn, chair_id).await?;
        if rides.is_empty() {
            return Ok(Self::default());
        }
        let statuses = ride_status::Entity::find()
            .filter(ride_status::Column::RideId.is_in(rides.iter().map(|r| r.id)))
            .all(conn)
            .await?;

        Ok(Self::from_history(&rides, &statuses))
    }

    pub fn is_free(&self, chair_id: Uuid) -> bool {
        !self.open_rides.contains_key(&chair_id)
    }

    pub fn open_ride(&self, chair_id: Uuid) -> Option<Uuid> {
        self.open_rides.get(&chair_id).copied()
    }

    pub fn busy_count(&self) -> usize {
        self.open_rides.len()
    }
}

/// Assigned rides that have no COMPLETED event, optionally for one chair.
///
/// COMPLETED is terminal, so a ride carrying it can never be open again and
/// its history is left in storage. Whatever is returned still goes through
/// [`is_finished`] on its latest event.
pub async fn load_open_rides<C: ConnectionTrait>(
    conn: &C,
    chair_id: Option<Uuid>,
) -> Result<Vec<ride::Model>, DbErr> {
    let completed = Query::select()
        .expr(Expr::val(1))
        .from(ride_status::Entity)
        .and_where(
            Expr::col((ride_status::Entity, ride_status::Column::RideId))
                .equals((ride::Entity, ride::Column::Id)),
        )
        .and_where(ride_status::Column::Status.eq(RideStatusKind::Completed))
        .to_owned();

    let mut rides = ride::Entity::find()
        .filter(ride::Column::ChairId.is_not_null())
        .filter(Expr::exists(completed).not());
    if let Some(chair_id) = chair_id {
        rides = rides.filter(ride::Column::ChairId.eq(chair_id));
    }
    rides.all(conn).await
}

/// Pick the free chairs out of the active set, sorted by chair id.
///
/// Chairs without a cached position or with a non-positive model speed
/// cannot be costed and are left out.
pub fn resolve_available(
    chairs: Vec<(chair::Model, Option<chair_model::Model>)>,
    locations: Vec<latest_chair_location::Model>,
    book: &ChairStatusBook,
) -> Vec<ChairCandidate> {
    let locations: HashMap<Uuid, Coordinate> = locations
        .into_iter()
        .map(|l| (l.chair_id, l.coordinate()))
        .collect();

    let mut candidates: Vec<ChairCandidate> = chairs
        .into_iter()
        .filter(|(c, _)| c.is_active && book.is_free(c.id))
        .filter_map(|(c, model)| {
            let Some(anchor) = locations.get(&c.id).copied() else {
                tracing::debug!(chair_id = %c.id, "Chair has no known position yet");
                return None;
            };
            let speed = model
                .and_then(|m| u32::try_from(m.speed).ok())
                .and_then(NonZeroU32::new);
            let Some(speed) = speed else {
                tracing::warn!(chair_id = %c.id, model = %c.model, "Chair model has no usable speed");
                return None;
            };
            Some(ChairCandidate {
                chair_id: c.id,
                anchor,
                speed,
            })
        })
        .collect();

    candidates.sort_by_key(|c| c.chair_id);
    candidates
}

/// Active chairs that are free right now, with anchor and speed.
pub async fn load_candidates<C: ConnectionTrait>(
    conn: &C,
    book: &ChairStatusBook,
) -> Result<Vec<ChairCandidate>, DbErr> {
    let chairs = chair::Entity::find()
        .filter(chair::Column::IsActive.eq(true))
        .find_also_related(chair_model::Entity)
        .all(conn)
        .await?;
    if chairs.is_empty() {
        return Ok(Vec::new());
    }

    let locations = latest_chair_location::Entity::find()
        .join(JoinType::InnerJoin, latest_chair_location::Relation::Chair.def())
        .filter(chair::Column::IsActive.eq(true))
        .all(conn)
        .await?;

    Ok(resolve_available(chairs, locations, book))
}
