use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::router::doctor_routes;
use doctor_cell::services::SearchSession;
use shared_config::AppConfig;
use shared_utils::test_utils::{MockRecommendationResponses, TestConfig};

fn create_test_app(config: &AppConfig) -> (Router, Arc<SearchSession>) {
    let session = Arc::new(SearchSession::new(config).unwrap());
    (doctor_routes(session.clone()), session)
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_search_without_query_lists_everything() {
    let (app, _) = create_test_app(&TestConfig::default().to_app_config());

    let request = Request::builder()
        .method("GET")
        .uri("/search")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json_response = read_json(response).await;
    assert_eq!(json_response["total"], 4);
    assert_eq!(json_response["query"], "");
    assert_eq!(json_response["doctors"][0]["join_date_display"], "May 15, 2021");
    assert_eq!(json_response["doctors"][0]["booking_label"], "Book Appointment now");
}

#[tokio::test]
async fn test_search_with_query_param() {
    let (app, session) = create_test_app(&TestConfig::default().to_app_config());

    let request = Request::builder()
        .method("GET")
        .uri("/search?q=pedia")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let json_response = read_json(response).await;

    assert_eq!(json_response["total"], 1);
    assert_eq!(json_response["doctors"][0]["name"], "Dr. Emma Brown");
    // An ad-hoc search does not replace the active query.
    assert_eq!(session.query().await, "");
}

#[tokio::test]
async fn test_set_query_then_search() {
    let (app, _) = create_test_app(&TestConfig::default().to_app_config());

    let request = Request::builder()
        .method("PUT")
        .uri("/query")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "query": "neuro" }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["total"], 1);

    let request = Request::builder()
        .method("GET")
        .uri("/search")
        .body(Body::empty())
        .unwrap();
    let json_response = read_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(json_response["query"], "neuro");
    assert_eq!(json_response["doctors"][0]["name"], "Dr. Jane Doe");
}

#[tokio::test]
async fn test_recommendation_endpoint_retargets_query() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get_recommendation"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockRecommendationResponses::doctors(&["Cardiologist"])),
        )
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_recommendation_url(&mock_server.uri()).to_app_config();
    let (app, session) = create_test_app(&config);

    let request = Request::builder()
        .method("POST")
        .uri("/recommendation")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "problem": "chest pain" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json_response = read_json(response).await;
    assert_eq!(json_response["query"], "Cardiologist");
    assert_eq!(json_response["recommendation"]["outcome"], "suggested");
    assert_eq!(json_response["total"], 1);
    assert_eq!(session.query().await, "Cardiologist");
}

#[tokio::test]
async fn test_recommendation_failure_is_not_an_http_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get_recommendation"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_recommendation_url(&mock_server.uri()).to_app_config();
    let (app, _) = create_test_app(&config);

    let request = Request::builder()
        .method("POST")
        .uri("/recommendation")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "problem": "dizzy" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json_response = read_json(response).await;
    assert_eq!(json_response["recommendation"]["outcome"], "unchanged");
    assert_eq!(json_response["query"], "");
    assert_eq!(json_response["total"], 4);
}

#[tokio::test]
async fn test_recommendation_requires_problem_text() {
    let (app, _) = create_test_app(&TestConfig::default().to_app_config());

    let request = Request::builder()
        .method("POST")
        .uri("/recommendation")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "problem": "   " }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_book_doctor_marks_pending() {
    let (app, _) = create_test_app(&TestConfig::default().to_app_config());

    let request = Request::builder()
        .method("POST")
        .uri("/3/book")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json_response = read_json(response).await;
    assert_eq!(json_response["state"], "pending");
    assert_eq!(json_response["label"], "Pending");

    let request = Request::builder()
        .method("GET")
        .uri("/search?q=emma")
        .body(Body::empty())
        .unwrap();
    let json_response = read_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(json_response["doctors"][0]["booking"], "pending");
}

#[tokio::test]
async fn test_book_unknown_doctor() {
    let (app, _) = create_test_app(&TestConfig::default().to_app_config());

    let request = Request::builder()
        .method("POST")
        .uri("/99/book")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
