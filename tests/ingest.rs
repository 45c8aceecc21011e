mod common;

use chair_dispatch::entities::{chair_location, ingest_watermark};
use chair_dispatch::ingest::{ingest_batch, LOCATION_WATERMARK, MAX_ABS_COORDINATE};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use common::*;

async fn watermark(db: &DatabaseConnection) -> Option<i32> {
    ingest_watermark::Entity::find_by_id(LOCATION_WATERMARK.to_string())
        .one(db)
        .await
        .unwrap()
        .map(|w| w.last_id)
}

/// Insert a report with a fixed id, stamped `offset_secs` from now.
async fn insert_report_with_id(db: &DatabaseConnection, id: i32, chair_id: Uuid, lat: i32, lng: i32, offset_secs: i64) {
    chair_location::ActiveModel {
        id: Set(id),
        chair_id: Set(chair_id),
        latitude: Set(lat),
        longitude: Set(lng),
        created_at: Set((Utc::now() + Duration::seconds(offset_secs)).into()),
    }
    .insert(db)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_distance_accumulates_across_batches() {
    let db = setup_db().await;
    let chair = add_chair(&db, "Standard").await;

    report_position(&db, chair, 0, 0, 0).await;
    ingest_batch(&db, 100).await.unwrap();
    assert_eq!(latest_location(&db, chair).await.unwrap().total_distance, 0);

    report_position(&db, chair, 3, 0, 1).await;
    ingest_batch(&db, 100).await.unwrap();
    let after_second = latest_location(&db, chair).await.unwrap();
    assert_eq!(after_second.total_distance, 3);
    assert_eq!((after_second.latitude, after_second.longitude), (3, 0));

    report_position(&db, chair, 3, 4, 2).await;
    ingest_batch(&db, 100).await.unwrap();
    let after_third = latest_location(&db, chair).await.unwrap();
    assert_eq!(after_third.total_distance, 7);
    assert_eq!(after_third.updated_at, at(2));
}

#[tokio::test]
async fn test_rerun_adds_no_distance() {
    let db = setup_db().await;
    let chair = add_chair(&db, "Standard").await;
    for (i, (lat, lng)) in [(0, 0), (3, 0), (3, 4)].into_iter().enumerate() {
        report_position(&db, chair, lat, lng, i as i64).await;
    }

    let first = ingest_batch(&db, 100).await.unwrap();
    assert_eq!(first.applied, 3);
    assert_eq!(latest_location(&db, chair).await.unwrap().total_distance, 7);

    let second = ingest_batch(&db, 100).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(second.watermark, first.watermark);
    assert_eq!(latest_location(&db, chair).await.unwrap().total_distance, 7);
}

#[tokio::test]
async fn test_batches_respect_size_and_advance_watermark() {
    let db = setup_db().await;
    let chair = add_chair(&db, "Standard").await;
    let mut last_id = 0;
    for i in 0..5 {
        last_id = report_position(&db, chair, i, 0, i as i64).await;
    }

    let a = ingest_batch(&db, 2).await.unwrap();
    assert_eq!(a.applied, 2);
    let b = ingest_batch(&db, 2).await.unwrap();
    assert_eq!(b.applied, 2);
    assert!(b.watermark > a.watermark);
    assert_eq!(latest_location(&db, chair).await.unwrap().total_distance, 3);

    let c = ingest_batch(&db, 2).await.unwrap();
    assert_eq!(c.applied, 1);
    assert_eq!(watermark(&db).await, Some(last_id));
    assert_eq!(latest_location(&db, chair).await.unwrap().total_distance, 4);
}

#[tokio::test]
async fn test_malformed_reports_are_skipped() {
    let db = setup_db().await;
    let chair = add_chair(&db, "Standard").await;

    report_position(&db, chair, 0, 0, 0).await;
    report_position(&db, Uuid::new_v4(), 50, 50, 1).await;
    report_position(&db, chair, MAX_ABS_COORDINATE + 1, 0, 2).await;
    let last = report_position(&db, chair, 2, 2, 3).await;

    let report = ingest_batch(&db, 100).await.unwrap();
    assert_eq!(report.applied, 2);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.watermark, last);

    let location = latest_location(&db, chair).await.unwrap();
    assert_eq!(location.total_distance, 4);
    assert_eq!((location.latitude, location.longitude), (2, 2));
}

#[tokio::test]
async fn test_batch_applied_in_timestamp_order() {
    let db = setup_db().await;
    let chair = add_chair(&db, "Standard").await;

    // Inserted out of order: the report at t=2 arrives before the one at t=1.
    report_position(&db, chair, 0, 0, 0).await;
    report_position(&db, chair, 10, 0, 2).await;
    report_position(&db, chair, 5, 0, 1).await;

    ingest_batch(&db, 100).await.unwrap();
    let location = latest_location(&db, chair).await.unwrap();
    assert_eq!((location.latitude, location.longitude), (10, 0));
    assert_eq!(location.total_distance, 10);
}

#[tokio::test]
async fn test_chairs_tracked_independently() {
    let db = setup_db().await;
    let a = add_chair(&db, "Standard").await;
    let b = add_chair(&db, "Swift").await;

    report_position(&db, a, 0, 0, 0).await;
    report_position(&db, b, 100, 100, 0).await;
    report_position(&db, a, 1, 1, 1).await;
    report_position(&db, b, 90, 100, 1).await;

    ingest_batch(&db, 100).await.unwrap();
    assert_eq!(latest_location(&db, a).await.unwrap().total_distance, 2);
    assert_eq!(latest_location(&db, b).await.unwrap().total_distance, 10);
}

#[tokio::test]
async fn test_storage_failure_leaves_nothing_applied() {
    let db = empty_db().await;
    assert!(ingest_batch(&db, 100).await.is_err());
}

#[tokio::test]
async fn test_late_committed_report_is_not_skipped() {
    let db = setup_db().await;
    let chair = add_chair(&db, "Standard").await;

    // Report 2 becomes visible while report 1 is still in flight.
    insert_report_with_id(&db, 2, chair, 0, 0, 0).await;
    let held = ingest_batch(&db, 100).await.unwrap();
    assert!(held.is_empty());
    assert_eq!(held.watermark, 0);
    assert!(latest_location(&db, chair).await.is_none());

    insert_report_with_id(&db, 1, chair, 10, 0, 1).await;
    let report = ingest_batch(&db, 100).await.unwrap();
    assert_eq!(report.applied, 2);
    assert_eq!(report.watermark, 2);

    let location = latest_location(&db, chair).await.unwrap();
    assert_eq!((location.latitude, location.longitude), (10, 0));
    assert_eq!(location.total_distance, 10);
}

#[tokio::test]
async fn test_stale_id_gap_is_passed() {
    let db = setup_db().await;
    let chair = add_chair(&db, "Standard").await;

    insert_report_with_id(&db, 1, chair, 0, 0, -60).await;
    insert_report_with_id(&db, 3, chair, 4, 0, -59).await;

    let report = ingest_batch(&db, 100).await.unwrap();
    assert_eq!(report.applied, 2);
    assert_eq!(watermark(&db).await, Some(3));
    assert_eq!(latest_location(&db, chair).await.unwrap().total_distance, 4);
}

#[tokio::test]
async fn test_failed_watermark_write_rolls_back_cache() {
    let db = setup_db().await;
    let chair = add_chair(&db, "Standard").await;

    report_position(&db, chair, 0, 0, 0).await;
    let first = ingest_batch(&db, 100).await.unwrap();

    report_position(&db, chair, 3, 0, 1).await;
    db.execute_unprepared(
        "CREATE TRIGGER reject_watermark BEFORE INSERT ON ingest_watermark \
         BEGIN SELECT RAISE(ABORT, 'watermark unavailable'); END;",
    )
    .await
    .unwrap();

    assert!(ingest_batch(&db, 100).await.is_err());
    let location = latest_location(&db, chair).await.unwrap();
    assert_eq!((location.latitude, location.longitude), (0, 0));
    assert_eq!(location.total_distance, 0);
    assert_eq!(watermark(&db).await, Some(first.watermark));

    db.execute_unprepared("DROP TRIGGER reject_watermark").await.unwrap();

    let retried = ingest_batch(&db, 100).await.unwrap();
    assert_eq!(retried.applied, 1);
    assert_eq!(latest_location(&db, chair).await.unwrap().total_distance, 3);

    assert!(ingest_batch(&db, 100).await.unwrap().is_empty());
    assert_eq!(latest_location(&db, chair).await.unwrap().total_distance, 3);
}
