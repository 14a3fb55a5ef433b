use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::services::search::SearchSession;

pub fn doctor_routes(state: Arc<SearchSession>) -> Router {
    Router::new()
        .route("/search", get(handlers::search_doctors))
        .route("/query", get(handlers::get_query).put(handlers::set_query))
        .route("/recommendation", post(handlers::ask_recommendation))
        .route("/{doctor_id}/book", post(handlers::book_doctor))
        .with_state(state)
}
