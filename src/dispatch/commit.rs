use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, LockBehavior, LockType};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};

use crate::dispatch::availability::ChairStatusBook;
use crate::dispatch::solver::Assignment;
use crate::entities::{chair, ride};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub committed: usize,
    /// Chair row was claimed by another in-flight cycle.
    pub skipped_locked: usize,
    /// Chair picked up a ride after this cycle's snapshot was taken.
    pub skipped_busy: usize,
    /// Ride was already assigned by someone else.
    pub lost_races: usize,
}

impl CommitReport {
    pub fn skipped(&self) -> usize {
        self.skipped_locked + self.skipped_busy + self.lost_races
    }
}

/// Write a cycle's assignments in a single transaction.
///
/// Chairs are claimed with `FOR UPDATE SKIP LOCKED` and re-checked for an
/// unfinished ride before the ride is updated; the update only applies
/// while the ride's chair is still NULL. Any database error rolls back the
/// whole set.
pub async fn commit_assignments(
    db: &DatabaseConnection,
    assignments: &[Assignment],
) -> Result<CommitReport, DbErr> {
    let mut report = CommitReport::default();
    if assignments.is_empty() {
        return Ok(report);
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    let txn = db.begin().await?;

    for assignment in assignments {
        let claimed = chair::Entity::find_by_id(assignment.chair_id)
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .one(&txn)
            .await?;
        if claimed.is_none() {
            tracing::debug!(
                chair_id = %assignment.chair_id,
                ride_id = %assignment.ride_id,
                "Chair claimed by another cycle, skipping"
            );
            report.skipped_locked += 1;
            continue;
        }

        let book = ChairStatusBook::load(&txn, Some(assignment.chair_id)).await?;
        if let Some(open_ride) = book.open_ride(assignment.chair_id) {
            tracing::debug!(
                chair_id = %assignment.chair_id,
                ride_id = %assignment.ride_id,
                open_ride_id = %open_ride,
                "Chair became busy since snapshot, skipping"
            );
            report.skipped_busy += 1;
            continue;
        }

        let result = ride::Entity::update_many()
            .col_expr(ride::Column::ChairId, Expr::value(assignment.chair_id))
            .col_expr(ride::Column::UpdatedAt, Expr::value(now))
            .filter(ride::Column::Id.eq(assignment.ride_id))
            .filter(ride::Column::ChairId.is_null())
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            tracing::debug!(
                ride_id = %assignment.ride_id,
                "Ride already assigned, skipping"
            );
            report.lost_races += 1;
            continue;
        }

        report.committed += 1;
    }

    txn.commit().await?;
    Ok(report)
}
