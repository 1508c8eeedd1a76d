//! HTTP surface tests using in-process requests.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use flowstate_core::config::FlowstateConfig;
use flowstate_core::engine::WorkflowEngine;
use flowstate_core::event_store::InMemoryEventStore;
use flowstate_core::events::EventPublisher;
use flowstate_core::web::{self, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

fn app() -> Router {
    let engine = Arc::new(WorkflowEngine::new(
        Arc::new(InMemoryEventStore::default()),
        EventPublisher::default(),
    ));
    let config = Arc::new(FlowstateConfig::default());
    web::router(AppState::new(engine, config, "test"))
}

fn workflow_body() -> Value {
    json!({
        "name": "unload pallet",
        "steps": [
            {"step_id": "locate", "name": "locate", "step_type": "sequential", "dependencies": []},
            {"step_id": "lift", "name": "lift", "step_type": "sequential", "dependencies": ["locate"]}
        ],
        "global_parameters": {"bay": 7}
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_workflow(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_json("/v1/workflows", &workflow_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    body["workflow_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app();

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");

    let response = app.oneshot(get("/health/detailed")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["checks"]["event_store"]["duration_ms"].is_number());
}

#[tokio::test]
async fn test_create_and_fetch_workflow() {
    let app = app();
    let id = create_workflow(&app).await;

    let response = app
        .clone()
        .oneshot(get(&format!("/v1/workflows/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["current_state"], "pending");
    assert_eq!(body["snapshot_sequence"], 1);
    assert_eq!(body["step_states"]["locate"], "pending");
}

#[tokio::test]
async fn test_create_rejects_bad_definition() {
    let app = app();
    let mut body = workflow_body();
    body["steps"] = json!([]);

    let response = app.oneshot(post_json("/v1/workflows", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_unknown_workflow_is_404() {
    let app = app();
    let response = app
        .oneshot(get(&format!("/v1/workflows/{}", uuid::Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_actions_drive_the_state_machine() {
    let app = app();
    let id = create_workflow(&app).await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/workflows/{id}/actions"),
            &json!({"action": "start"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["current_state"], "active");
    assert_eq!(body["current_substate"], "initializing");

    // Completing before the steps finish is an illegal edge
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/workflows/{id}/actions"),
            &json!({"action": "complete"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["error"], "unprocessable_entity");
}

#[tokio::test]
async fn test_step_actions_and_ready_steps() {
    let app = app();
    let id = create_workflow(&app).await;

    for action in [
        json!({"action": "start"}),
        json!({"action": "start_step", "step_id": "locate"}),
        json!({"action": "complete_step", "step_id": "locate", "output": {"x": 3}}),
    ] {
        let response = app
            .clone()
            .oneshot(post_json(&format!("/v1/workflows/{id}/actions"), &action))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get(&format!("/v1/workflows/{id}/ready-steps")))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["ready_steps"], json!(["lift"]));
}

#[tokio::test]
async fn test_list_filters_by_state() {
    let app = app();
    let first = create_workflow(&app).await;
    let _second = create_workflow(&app).await;

    app.clone()
        .oneshot(post_json(
            &format!("/v1/workflows/{first}/actions"),
            &json!({"action": "start"}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/v1/workflows?state=active"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["workflows"][0]["workflow_id"], json!(first));

    let response = app
        .clone()
        .oneshot(get("/v1/workflows?state=not-a-state"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_log_and_rebuild_endpoints() {
    let app = app();
    let id = create_workflow(&app).await;

    app.clone()
        .oneshot(post_json(
            &format!("/v1/workflows/{id}/actions"),
            &json!({"action": "start"}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get(&format!("/v1/workflows/{id}/events")))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["events"][0]["event_type"], "workflow_created");
    assert_eq!(body["events"][1]["sequence_number"], 2);

    let response = app
        .clone()
        .oneshot(get(&format!(
            "/v1/workflows/{id}/rebuild?as_of_sequence=1"
        )))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["current_state"], "pending");
    assert_eq!(body["snapshot_sequence"], 1);
}
