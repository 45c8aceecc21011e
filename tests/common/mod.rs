#![allow(dead_code)]

use chair_dispatch::entities::ride_status::RideStatusKind;
use chair_dispatch::entities::{chair, chair_location, chair_model, latest_chair_location, ride, ride_status};
use chair_dispatch::{AppState, Config};
use chrono::{Duration, TimeZone, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

/// Fresh in-memory database without any schema.
pub async fn empty_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    Database::connect(options).await.expect("connect to sqlite")
}

/// Fresh in-memory database with all migrations applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = empty_db().await;
    migration::Migrator::up(&db, None)
        .await
        .expect("run migrations");
    db
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        ingest_interval_ms: 100,
        ingest_batch_size: 1000,
        matching_interval_ms: None,
    }
}

pub fn test_state(db: DatabaseConnection) -> AppState {
    AppState::new(db, test_config())
}

/// Fixed point in time plus an offset, so ordering in tests is explicit.
pub fn at(secs: i64) -> DateTimeWithTimeZone {
    (Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::seconds(secs)).into()
}

pub async fn add_model(db: &DatabaseConnection, name: &str, speed: i32) {
    chair_model::ActiveModel {
        name: Set(name.to_string()),
        speed: Set(speed),
    }
    .insert(db)
    .await
    .expect("insert chair model");
}

/// Active chair of the given model, without any position.
pub async fn add_chair(db: &DatabaseConnection, model: &str) -> Uuid {
    add_chair_with_id(db, Uuid::new_v4(), model, true).await
}

pub async fn add_chair_with_id(db: &DatabaseConnection, id: Uuid, model: &str, is_active: bool) -> Uuid {
    chair::ActiveModel {
        id: Set(id),
        name: Set(format!("chair-{id}")),
        model: Set(model.to_string()),
        is_active: Set(is_active),
        created_at: Set(at(0)),
    }
    .insert(db)
    .await
    .expect("insert chair");
    id
}

/// Write the chair's cached position directly, bypassing ingest.
pub async fn place_chair(db: &DatabaseConnection, chair_id: Uuid, lat: i32, lng: i32) {
    latest_chair_location::ActiveModel {
        chair_id: Set(chair_id),
        latitude: Set(lat),
        longitude: Set(lng),
        total_distance: Set(0),
        updated_at: Set(at(0)),
    }
    .insert(db)
    .await
    .expect("insert latest location");
}

/// Active, positioned chair.
pub async fn add_placed_chair(db: &DatabaseConnection, model: &str, lat: i32, lng: i32) -> Uuid {
    let id = add_chair(db, model).await;
    place_chair(db, id, lat, lng).await;
    id
}

/// Waiting ride with its initial MATCHING event.
pub async fn add_ride(db: &DatabaseConnection, lat: i32, lng: i32, created: i64) -> Uuid {
    let id = Uuid::new_v4();
    ride::ActiveModel {
        id: Set(id),
        pickup_latitude: Set(lat),
        pickup_longitude: Set(lng),
        destination_latitude: Set(lat + 10),
        destination_longitude: Set(lng + 10),
        chair_id: Set(None),
        created_at: Set(at(created)),
        updated_at: Set(at(created)),
    }
    .insert(db)
    .await
    .expect("insert ride");
    add_status(db, id, RideStatusKind::Matching, created).await;
    id
}

pub async fn add_status(db: &DatabaseConnection, ride_id: Uuid, status: RideStatusKind, created: i64) {
    ride_status::ActiveModel {
        id: Set(Uuid::new_v4()),
        ride_id: Set(ride_id),
        status: Set(status),
        created_at: Set(at(created)),
        chair_sent_at: Set(None),
    }
    .insert(db)
    .await
    .expect("insert ride status");
}

/// Walk a ride through every milestone up to COMPLETED.
pub async fn complete_ride(db: &DatabaseConnection, ride_id: Uuid, from: i64) {
    let steps = [
        RideStatusKind::Enroute,
        RideStatusKind::Pickup,
        RideStatusKind::Carrying,
        RideStatusKind::Arrived,
        RideStatusKind::Completed,
    ];
    for (i, status) in steps.into_iter().enumerate() {
        add_status(db, ride_id, status, from + i as i64).await;
    }
}

pub async fn chair_of(db: &DatabaseConnection, ride_id: Uuid) -> Option<Uuid> {
    ride::Entity::find_by_id(ride_id)
        .one(db)
        .await
        .expect("load ride")
        .expect("ride exists")
        .chair_id
}

pub async fn report_position(db: &DatabaseConnection, chair_id: Uuid, lat: i32, lng: i32, created: i64) -> i32 {
    chair_location::ActiveModel {
        chair_id: Set(chair_id),
        latitude: Set(lat),
        longitude: Set(lng),
        created_at: Set(at(created)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert position report")
    .id
}

pub async fn latest_location(db: &DatabaseConnection, chair_id: Uuid) -> Option<latest_chair_location::Model> {
    latest_chair_location::Entity::find_by_id(chair_id)
        .one(db)
        .await
        .expect("load latest location")
}
