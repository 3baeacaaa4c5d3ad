use crate::handlers;
use crate::state::AppState;
use crate::storage::RecordStore;
use axum::{
    Router,
    routing::{get, patch},
};

pub fn router<S: RecordStore>(state: AppState<S>) -> Router {
    Router::new()
        .route(
            "/api/records",
            get(handlers::list_records::<S>).post(handlers::create_record::<S>),
        )
        .route("/api/records/:row_id", patch(handlers::update_record::<S>))
        .route("/api/dashboard", get(handlers::get_dashboard::<S>))
        .route("/api/streaks", get(handlers::get_streaks::<S>))
        .route("/api/today", get(handlers::get_today::<S>))
        .with_state(state)
}
