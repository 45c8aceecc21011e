use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{chair, internal, ride};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Internal trigger, polled by the matching driver
    let internal_routes = Router::new()
        .route("/api/internal/matching", get(internal::trigger_matching));

    // Chair registration and position reports
    let chair_routes = Router::new()
        .route("/api/chairs", post(chair::create_chair))
        .route("/api/chairs/{id}/activity", post(chair::update_activity))
        .route("/api/chairs/{id}/coordinate", post(chair::post_coordinate))
        .route("/api/chairs/{id}/location", get(chair::get_location));

    // Ride requests and lifecycle
    let ride_routes = Router::new()
        .route("/api/rides", post(ride::create_ride))
        .route("/api/rides/{id}/status", post(ride::append_status));

    Router::new()
        .merge(internal_routes)
        .merge(chair_routes)
        .merge(ride_routes)
        .with_state(state)
}
