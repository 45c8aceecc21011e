use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{chair, chair_location, chair_model, latest_chair_location};
use crate::error::{AppError, AppResult};
use crate::utils::geo::Coordinate;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateChairRequest {
    pub name: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct ChairResponse {
    pub id: Uuid,
    pub name: String,
    pub model: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Register a chair. New chairs start inactive.
pub async fn create_chair(
    State(state): State<AppState>,
    Json(payload): Json<CreateChairRequest>,
) -> AppResult<(StatusCode, Json<ChairResponse>)> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Chair name must not be empty".to_string()));
    }

    chair_model::Entity::find_by_id(payload.model.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Unknown chair model: {}", payload.model)))?;

    let new_chair = chair::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        model: Set(payload.model),
        is_active: Set(false),
        created_at: Set(Utc::now().into()),
    };
    let c = new_chair.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(ChairResponse {
            id: c.id,
            name: c.name,
            model: c.model,
            is_active: c.is_active,
            created_at: c.created_at.with_timezone(&Utc),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    pub is_active: bool,
}

/// Take a chair in or out of service
pub async fn update_activity(
    State(state): State<AppState>,
    Path(chair_id): Path<Uuid>,
    Json(payload): Json<ActivityRequest>,
) -> AppResult<StatusCode> {
    let c = chair::Entity::find_by_id(chair_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Chair not found".to_string()))?;

    let mut active: chair::ActiveModel = c.into();
    active.is_active = Set(payload.is_active);
    active.update(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct CoordinateResponse {
    pub recorded_at: DateTime<Utc>,
}

/// Append a position report. The location cache picks it up on the next
/// ingest tick.
pub async fn post_coordinate(
    State(state): State<AppState>,
    Path(chair_id): Path<Uuid>,
    Json(payload): Json<Coordinate>,
) -> AppResult<Json<CoordinateResponse>> {
    chair::Entity::find_by_id(chair_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Chair not found".to_string()))?;

    let new_report = chair_location::ActiveModel {
        chair_id: Set(chair_id),
        latitude: Set(payload.latitude),
        longitude: Set(payload.longitude),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    let saved = new_report.insert(&state.db).await?;

    Ok(Json(CoordinateResponse {
        recorded_at: saved.created_at.with_timezone(&Utc),
    }))
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub chair_id: Uuid,
    pub latitude: i32,
    pub longitude: i32,
    pub total_distance: i64,
    pub updated_at: DateTime<Utc>,
}

/// Latest cached position and travelled distance of a chair
pub async fn get_location(
    State(state): State<AppState>,
    Path(chair_id): Path<Uuid>,
) -> AppResult<Json<LocationResponse>> {
    let location = latest_chair_location::Entity::find_by_id(chair_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No location recorded for chair".to_string()))?;

    Ok(Json(LocationResponse {
        chair_id: location.chair_id,
        latitude: location.latitude,
        longitude: location.longitude,
        total_distance: location.total_distance,
        updated_at: location.updated_at.with_timezone(&Utc),
    }))
}
