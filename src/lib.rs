pub mod config;
pub mod db;
pub mod dispatch;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod routes;
pub mod utils;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(db.clone()));
        Self {
            db,
            config,
            dispatcher,
        }
    }
}
