//! Periodic ride-to-chair matching.
//!
//! A cycle reads the waiting rides and the free chairs, estimates travel
//! times, assigns chairs oldest ride first and commits the result in one
//! transaction. Every cycle starts again from storage, so a failed cycle is
//! simply retried by the next trigger.

pub mod availability;
pub mod commit;
pub mod cost;
pub mod solver;
pub mod trigger;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::ride;

pub use availability::{ChairCandidate, ChairStatusBook};
pub use commit::CommitReport;
pub use solver::{Assignment, WaitingRide};
pub use trigger::{CycleOutcome, Dispatcher};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub waiting_rides: usize,
    pub available_chairs: usize,
    pub proposed: usize,
    pub commit: CommitReport,
}

/// Rides without a chair, oldest first.
pub async fn load_waiting_rides(db: &DatabaseConnection) -> Result<Vec<WaitingRide>, DbErr> {
    let rides = ride::Entity::find()
        .filter(ride::Column::ChairId.is_null())
        .order_by_asc(ride::Column::CreatedAt)
        .order_by_asc(ride::Column::Id)
        .all(db)
        .await?;

    Ok(rides.iter().map(WaitingRide::from).collect())
}

/// Run one full dispatch cycle.
pub async fn run_cycle(db: &DatabaseConnection) -> Result<CycleReport, DbErr> {
    let mut report = CycleReport::default();

    let waiting = load_waiting_rides(db).await?;
    report.waiting_rides = waiting.len();
    if waiting.is_empty() {
        tracing::debug!("No waiting rides");
        return Ok(report);
    }

    let book = ChairStatusBook::load(db, None).await?;
    let chairs = availability::load_candidates(db, &book).await?;
    report.available_chairs = chairs.len();
    if chairs.is_empty() {
        tracing::debug!(waiting = waiting.len(), busy = book.busy_count(), "No available chairs");
        return Ok(report);
    }

    let assignments = solver::assign_fifo(&waiting, &chairs);
    report.proposed = assignments.len();
    for a in &assignments {
        tracing::debug!(
            ride_id = %a.ride_id,
            chair_id = %a.chair_id,
            travel_time = a.travel_time.as_f64(),
            "Proposed assignment"
        );
    }

    report.commit = commit::commit_assignments(db, &assignments).await?;

    tracing::info!(
        waiting = report.waiting_rides,
        available = report.available_chairs,
        committed = report.commit.committed,
        skipped = report.commit.skipped(),
        "Dispatch cycle finished"
    );

    Ok(report)
}
