use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dispatch::availability::latest_status;
use crate::entities::ride_status::RideStatusKind;
use crate::entities::{ride, ride_status};
use crate::error::{AppError, AppResult};
use crate::ingest::MAX_ABS_COORDINATE;
use crate::utils::geo::{is_within_bounds, Coordinate};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRideRequest {
    pub pickup_coordinate: Coordinate,
    pub destination_coordinate: Coordinate,
}

#[derive(Debug, Serialize)]
pub struct CreateRideResponse {
    pub ride_id: Uuid,
}

/// Request a ride. It waits for a chair until a dispatch cycle picks it up.
pub async fn create_ride(
    State(state): State<AppState>,
    Json(payload): Json<CreateRideRequest>,
) -> AppResult<(StatusCode, Json<CreateRideResponse>)> {
    for point in [payload.pickup_coordinate, payload.destination_coordinate] {
        if !is_within_bounds(point, MAX_ABS_COORDINATE) {
            return Err(AppError::BadRequest("Coordinate out of range".to_string()));
        }
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    let ride_id = Uuid::new_v4();

    let txn = state.db.begin().await?;

    ride::ActiveModel {
        id: Set(ride_id),
        pickup_latitude: Set(payload.pickup_coordinate.latitude),
        pickup_longitude: Set(payload.pickup_coordinate.longitude),
        destination_latitude: Set(payload.destination_coordinate.latitude),
        destination_longitude: Set(payload.destination_coordinate.longitude),
        chair_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    ride_status::ActiveModel {
        id: Set(Uuid::new_v4()),
        ride_id: Set(ride_id),
        status: Set(RideStatusKind::Matching),
        created_at: Set(now),
        chair_sent_at: Set(None),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok((StatusCode::ACCEPTED, Json(CreateRideResponse { ride_id })))
}

#[derive(Debug, Deserialize)]
pub struct AppendStatusRequest {
    pub status: RideStatusKind,
}

/// Append the next milestone to a ride's status log
pub async fn append_status(
    State(state): State<AppState>,
    Path(ride_id): Path<Uuid>,
    Json(payload): Json<AppendStatusRequest>,
) -> AppResult<StatusCode> {
    let txn = state.db.begin().await?;

    // Appends for one ride are serialised on its row.
    let r = ride::Entity::find_by_id(ride_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

    let events = ride_status::Entity::find()
        .filter(ride_status::Column::RideId.eq(ride_id))
        .all(&txn)
        .await?;

    let expected = match latest_status(&events) {
        None => Some(RideStatusKind::Matching),
        Some(latest) => latest.next(),
    };
    if expected != Some(payload.status) {
        return Err(AppError::Conflict(format!(
            "Ride cannot move to {:?} from its current status",
            payload.status
        )));
    }
    if payload.status != RideStatusKind::Matching && r.chair_id.is_none() {
        return Err(AppError::BadRequest(
            "Ride has no chair assigned yet".to_string(),
        ));
    }

    // Keep the log strictly ordered even if the clock did not move.
    let mut now: DateTimeWithTimeZone = Utc::now().into();
    if let Some(newest) = events.iter().map(|e| e.created_at).max() {
        if now <= newest {
            now = newest + chrono::Duration::microseconds(1);
        }
    }

    ride_status::ActiveModel {
        id: Set(Uuid::new_v4()),
        ride_id: Set(ride_id),
        status: Set(payload.status),
        created_at: Set(now),
        chair_sent_at: Set(None),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::debug!(ride_id = %ride_id, status = ?payload.status, "Ride status appended");
    Ok(StatusCode::NO_CONTENT)
}
