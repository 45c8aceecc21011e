pub mod chair;
pub mod chair_location;
pub mod chair_model;
pub mod ingest_watermark;
pub mod latest_chair_location;
pub mod ride;
pub mod ride_status;
