use std::sync::Arc;
use std::time::Duration;

use sea_orm::{DatabaseConnection, DbErr};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use crate::dispatch::{run_cycle, CycleReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Another cycle was already running; this trigger was dropped.
    Skipped,
}

/// Single-flight entry point for dispatch cycles.
pub struct Dispatcher {
    db: DatabaseConnection,
    cycle_lock: Mutex<()>,
}

impl Dispatcher {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Run one cycle unless one is already in progress.
    pub async fn trigger(&self) -> Result<CycleOutcome, DbErr> {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            tracing::debug!("Dispatch cycle already in progress, dropping trigger");
            return Ok(CycleOutcome::Skipped);
        };

        run_cycle(&self.db).await.map(CycleOutcome::Completed)
    }

    pub fn is_running(&self) -> bool {
        self.cycle_lock.try_lock().is_err()
    }
}

/// In-process replacement for an external poller.
pub async fn run_matching_loop(dispatcher: Arc<Dispatcher>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!(interval_ms = interval.as_millis() as u64, "Matching loop started");

    loop {
        ticker.tick().await;
        if let Err(e) = dispatcher.trigger().await {
            tracing::error!(error = %e, "Dispatch cycle failed");
        }
    }
}
