use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub ingest_interval_ms: u64,
    pub ingest_batch_size: u64,
    /// When unset, matching only runs when the trigger endpoint is polled.
    pub matching_interval_ms: Option<u64>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set"),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            ingest_interval_ms: env::var("INGEST_INTERVAL_MS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .expect("INGEST_INTERVAL_MS must be a number"),
            ingest_batch_size: env::var("INGEST_BATCH_SIZE")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .expect("INGEST_BATCH_SIZE must be a number"),
            matching_interval_ms: env::var("MATCHING_INTERVAL_MS").ok().map(|v| {
                v.parse()
                    .expect("MATCHING_INTERVAL_MS must be a number")
            }),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn ingest_interval(&self) -> Duration {
        Duration::from_millis(self.ingest_interval_ms.max(1))
    }

    pub fn matching_interval(&self) -> Option<Duration> {
        self.matching_interval_ms
            .map(|ms| Duration::from_millis(ms.max(1)))
    }
}
