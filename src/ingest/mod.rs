//! Location ingest pipeline.
//!
//! Folds the raw `chair_location` report log into `latest_chair_location`,
//! accumulating each chair's Manhattan travel distance. Progress is kept as
//! a watermark over report ids that moves in the same transaction as the
//! cache writes, so each report is applied exactly once.
//!
//! Report ids are allocated at insert time but become visible at commit,
//! so a later id can show up before an earlier one. A batch therefore stops
//! at the first id gap and picks it up again on the next tick. A gap is only
//! stepped over once the report behind it is older than [`GAP_GRACE_SECS`], at
//! which point the missing id is taken to be a rolled-back insert.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::entities::{chair, chair_location, ingest_watermark, latest_chair_location};
use crate::utils::geo::{is_within_bounds, manhattan_distance, Coordinate};

/// Watermark row used for the chair location log.
pub const LOCATION_WATERMARK: &str = "chair_location";

/// Seconds an id gap may stay open before the batch moves past it.
pub const GAP_GRACE_SECS: i64 = 5;

/// Reports further than this from the origin on either axis are rejected.
pub const MAX_ABS_COORDINATE: i32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedPosition {
    pub coordinate: Coordinate,
    pub total_distance: i64,
}

impl From<&latest_chair_location::Model> for TrackedPosition {
    fn from(row: &latest_chair_location::Model) -> Self {
        Self {
            coordinate: row.coordinate(),
            total_distance: row.total_distance,
        }
    }
}

/// Fold one position into a chair's running state. The first position a
/// chair ever reports contributes no distance.
pub fn advance(previous: Option<TrackedPosition>, next: Coordinate) -> TrackedPosition {
    match previous {
        None => TrackedPosition {
            coordinate: next,
            total_distance: 0,
        },
        Some(prev) => TrackedPosition {
            coordinate: next,
            total_distance: prev.total_distance + manhattan_distance(prev.coordinate, next),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    UnknownChair,
    OutOfBounds,
}

fn validate(report: &chair_location::Model, known_chairs: &HashSet<Uuid>) -> Result<Coordinate, Rejection> {
    if !known_chairs.contains(&report.chair_id) {
        return Err(Rejection::UnknownChair);
    }
    let coordinate = Coordinate::new(report.latitude, report.longitude);
    if !is_within_bounds(coordinate, MAX_ABS_COORDINATE) {
        return Err(Rejection::OutOfBounds);
    }
    Ok(coordinate)
}

/// Length of the leading run of `reports` (sorted by id) that is safe to
/// apply. The run ends at the first id gap whose following report was
/// created after `cutoff`.
pub fn settled_prefix(
    watermark: i32,
    reports: &[chair_location::Model],
    cutoff: DateTimeWithTimeZone,
) -> usize {
    let mut expected = watermark.saturating_add(1);
    for (i, r) in reports.iter().enumerate() {
        if r.id != expected && r.created_at > cutoff {
            return i;
        }
        expected = r.id.saturating_add(1);
    }
    reports.len()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub applied: usize,
    pub skipped: usize,
    pub watermark: i32,
}

impl IngestReport {
    pub fn is_empty(&self) -> bool {
        self.applied == 0 && self.skipped == 0
    }
}

/// Apply the next batch of reports past the watermark.
///
/// Reports are taken in id order up to the first unsettled gap (so the
/// watermark never jumps over one) and then applied by report timestamp.
pub async fn ingest_batch(db: &DatabaseConnection, batch_size: u64) -> Result<IngestReport, DbErr> {
    let cutoff: DateTimeWithTimeZone = (Utc::now() - chrono::Duration::seconds(GAP_GRACE_SECS)).into();
    let txn = db.begin().await?;

    let watermark = ingest_watermark::Entity::find_by_id(LOCATION_WATERMARK.to_string())
        .one(&txn)
        .await?
        .map(|w| w.last_id)
        .unwrap_or(0);

    let mut reports = chair_location::Entity::find()
        .filter(chair_location::Column::Id.gt(watermark))
        .order_by_asc(chair_location::Column::Id)
        .limit(batch_size.max(1))
        .all(&txn)
        .await?;

    let settled = settled_prefix(watermark, &reports, cutoff);
    if settled < reports.len() {
        tracing::debug!(
            watermark,
            held_back = reports.len() - settled,
            "Waiting for an earlier position report to become visible"
        );
        reports.truncate(settled);
    }

    let Some(last_id) = reports.iter().map(|r| r.id).max() else {
        txn.commit().await?;
        return Ok(IngestReport {
            watermark,
            ..Default::default()
        });
    };
    reports.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let reporting: HashSet<Uuid> = reports.iter().map(|r| r.chair_id).collect();
    let known_chairs: HashSet<Uuid> = chair::Entity::find()
        .filter(chair::Column::Id.is_in(reporting.iter().copied()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();

    let mut tracked: HashMap<Uuid, TrackedPosition> = if known_chairs.is_empty() {
        HashMap::new()
    } else {
        latest_chair_location::Entity::find()
            .filter(latest_chair_location::Column::ChairId.is_in(known_chairs.iter().copied()))
            .all(&txn)
            .await?
            .iter()
            .map(|row| (row.chair_id, TrackedPosition::from(row)))
            .collect()
    };

    let mut report = IngestReport {
        watermark: last_id,
        ..Default::default()
    };
    let mut touched: BTreeMap<Uuid, DateTimeWithTimeZone> = BTreeMap::new();

    for r in &reports {
        let coordinate = match validate(r, &known_chairs) {
            Ok(coordinate) => coordinate,
            Err(reason) => {
                tracing::warn!(
                    report_id = r.id,
                    chair_id = %r.chair_id,
                    reason = ?reason,
                    "Skipping malformed position report"
                );
                report.skipped += 1;
                continue;
            }
        };

        let next = advance(tracked.get(&r.chair_id).copied(), coordinate);
        tracked.insert(r.chair_id, next);
        touched.insert(r.chair_id, r.created_at);
        report.applied += 1;
    }

    for (chair_id, updated_at) in &touched {
        let Some(position) = tracked.get(chair_id) else {
            continue;
        };
        let row = latest_chair_location::ActiveModel {
            chair_id: Set(*chair_id),
            latitude: Set(position.coordinate.latitude),
            longitude: Set(position.coordinate.longitude),
            total_distance: Set(position.total_distance),
            updated_at: Set(*updated_at),
        };
        latest_chair_location::Entity::insert(row)
            .on_conflict(
                OnConflict::column(latest_chair_location::Column::ChairId)
                    .update_columns([
                        latest_chair_location::Column::Latitude,
                        latest_chair_location::Column::Longitude,
                        latest_chair_location::Column::TotalDistance,
                        latest_chair_location::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
    }

    let mark = ingest_watermark::ActiveModel {
        name: Set(LOCATION_WATERMARK.to_string()),
        last_id: Set(last_id),
        updated_at: Set(Utc::now().into()),
    };
    ingest_watermark::Entity::insert(mark)
        .on_conflict(
            OnConflict::column(ingest_watermark::Column::Name)
                .update_columns([
                    ingest_watermark::Column::LastId,
                    ingest_watermark::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;
    Ok(report)
}

/// Drive `ingest_batch` on a fixed cadence. A failed batch leaves the
/// watermark where it was and is retried on the next tick.
pub async fn run_ingest_loop(db: DatabaseConnection, interval: Duration, batch_size: u64) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!(
        interval_ms = interval.as_millis() as u64,
        batch_size,
        "Location ingest loop started"
    );

    loop {
        ticker.tick().await;
        match ingest_batch(&db, batch_size).await {
            Ok(report) if !report.is_empty() => {
                tracing::debug!(
                    applied = report.applied,
                    skipped = report.skipped,
                    watermark = report.watermark,
                    "Applied position reports"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Location ingest failed"),
        }
    }
}
