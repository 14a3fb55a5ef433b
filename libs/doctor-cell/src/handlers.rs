use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{DoctorError, RecommendationRequest};
use crate::services::search::SearchSession;

#[derive(Debug, Deserialize)]
pub struct DoctorSearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetQueryRequest {
    pub query: String,
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound(_) => AppError::NotFound(err.to_string()),
        }
    }
}

async fn listing(session: &SearchSession) -> Value {
    let query = session.query().await;
    let doctors = session.cards(Some(&query)).await;
    json!({
        "query": query,
        "doctors": doctors,
        "total": doctors.len()
    })
}

#[axum::debug_handler]
pub async fn search_doctors(
    State(session): State<Arc<SearchSession>>,
    Query(params): Query<DoctorSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let query = match params.q {
        Some(q) => q,
        None => session.query().await,
    };
    let doctors = session.cards(Some(&query)).await;

    Ok(Json(json!({
        "query": query,
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_query(
    State(session): State<Arc<SearchSession>>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!({ "query": session.query().await })))
}

#[axum::debug_handler]
pub async fn set_query(
    State(session): State<Arc<SearchSession>>,
    Json(request): Json<SetQueryRequest>,
) -> Result<Json<Value>, AppError> {
    session.set_query(&request.query).await;
    Ok(Json(listing(&session).await))
}

#[axum::debug_handler]
pub async fn ask_recommendation(
    State(session): State<Arc<SearchSession>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<Value>, AppError> {
    if request.problem.trim().is_empty() {
        return Err(AppError::ValidationError("Symptom description is required".to_string()));
    }

    let outcome = session.ask_recommendation(&request.problem).await;
    let mut body = listing(&session).await;
    body["recommendation"] = json!(outcome);

    Ok(Json(body))
}

#[axum::debug_handler]
pub async fn book_doctor(
    State(session): State<Arc<SearchSession>>,
    Path(doctor_id): Path<u32>,
) -> Result<Json<Value>, AppError> {
    let state = session.book(doctor_id).await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "state": state,
        "label": state.label()
    })))
}
