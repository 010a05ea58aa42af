use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use ecotoken_core::StatementTarget;
use ecotoken_service::RelayService;
use ecotoken_warehouse::{Bindings, StatementExecutor, WarehouseError};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{AppState, CorsPolicy, create_router};

const BODY_LIMIT: usize = 1_048_576;
const EXTENSION_ORIGIN: &str = "chrome-extension://abcdefghijklmnop";

type Responder = dyn Fn(&str) -> Result<Value, WarehouseError> + Send + Sync;

struct FakeExecutor {
    responder: Box<Responder>,
    statements: Mutex<Vec<String>>,
}

#[async_trait]
impl StatementExecutor for FakeExecutor {
    async fn execute(&self, statement: &str, _bindings: &Bindings) -> Result<Value, WarehouseError> {
        self.statements.lock().unwrap().push(statement.to_owned());
        (self.responder)(statement)
    }
}

fn executor(
    responder: impl Fn(&str) -> Result<Value, WarehouseError> + Send + Sync + 'static,
) -> Arc<FakeExecutor> {
    Arc::new(FakeExecutor { responder: Box::new(responder), statements: Mutex::new(Vec::new()) })
}

/// Optimize returns `envelope`; telemetry succeeds or fails per `telemetry_ok`.
fn warehouse(envelope: Value, telemetry_ok: bool) -> Arc<FakeExecutor> {
    executor(move |statement| {
        if statement.contains(".OPTIMIZE(") {
            Ok(envelope.clone())
        } else if telemetry_ok {
            Ok(json!({}))
        } else {
            Err(WarehouseError::RemoteExecution { status: 500, body: "telemetry down".to_owned() })
        }
    })
}

fn router_with(executor: Arc<FakeExecutor>, production: bool) -> Router {
    let target = StatementTarget {
        warehouse: None,
        database: "ECOTOKEN_DB".to_owned(),
        schema: "CORE".to_owned(),
        role: None,
    };
    let state = Arc::new(AppState {
        relay: Arc::new(RelayService::new(executor, &target, "ECOTOKEN")),
        cors: CorsPolicy::new(Some("abcdefghijklmnop"), None, production),
    });
    create_router(state)
}

fn post_optimize(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/optimize")
        .header("content-type", "application/json")
        .header("origin", EXTENSION_ORIGIN)
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_missing_tag_is_400_regardless_of_other_fields() {
    for body in ["", "{}", r#"{"raw_text":"hello","model":"m"}"#, r#"{"tag":""}"#] {
        let exec = warehouse(json!({"data": [["\"x\""]]}), true);
        let response = router_with(exec.clone(), false).oneshot(post_optimize(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "MISSING_TAG"}));
        assert!(exec.statements.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_success_returns_outcome() {
    let exec = warehouse(
        json!({"data": [[r#"{"optimized_text":"short","estimated_tokens_saved":5}"#]]}),
        true,
    );
    let response = router_with(exec.clone(), false)
        .oneshot(post_optimize(r#"{"tag":"t1","raw_text":"make it shorter"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(json_body(response).await, json!({"optimized_text": "short", "estimated_tokens_saved": 5}));
    assert_eq!(exec.statements.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_prompt_larger_than_default_body_limit_is_accepted() {
    let exec = warehouse(json!({"data": [[r#"{"optimized_text":"short"}"#]]}), true);
    let body = json!({"tag": "t1", "raw_text": "x".repeat(3 * 1024 * 1024)}).to_string();
    let response = router_with(exec.clone(), false).oneshot(post_optimize(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"optimized_text": "short"}));
    let statements = exec.statements.lock().unwrap();
    assert!(statements[0].starts_with("INSERT INTO"));
}

#[tokio::test]
async fn test_null_body_is_500() {
    let exec = warehouse(json!({}), true);
    let response = router_with(exec, false).oneshot(post_optimize("null")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "BACKEND_EXCEPTION");
}

#[tokio::test]
async fn test_optimize_failure_is_500_with_detail() {
    let exec = executor(|statement| {
        if statement.contains(".OPTIMIZE(") {
            Err(WarehouseError::RemoteExecution { status: 422, body: "SQL compilation error".to_owned() })
        } else {
            Ok(json!({}))
        }
    });
    let response =
        router_with(exec, false).oneshot(post_optimize(r#"{"tag":"t1"}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "BACKEND_EXCEPTION");
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("SQL compilation error"));
}

#[tokio::test]
async fn test_malformed_json_is_500() {
    let exec = warehouse(json!({}), true);
    let response = router_with(exec, false).oneshot(post_optimize("{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "BACKEND_EXCEPTION");
    assert!(!body["detail"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_no_result() {
    let exec = warehouse(json!({"rowset": []}), true);
    let response =
        router_with(exec, false).oneshot(post_optimize(r#"{"tag":"t1"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"error": "NO_RESULT"}));
}

#[tokio::test]
async fn test_telemetry_failures_do_not_change_response() {
    let envelope = json!({"data": [[r#"{"optimized_text":"short","model":"m","estimated_tokens_before":9}"#]]});
    let body = r#"{"tag":"t1","raw_text":"some prompt"}"#;

    let healthy = router_with(warehouse(envelope.clone(), true), false)
        .oneshot(post_optimize(body))
        .await
        .unwrap();
    let degraded = router_with(warehouse(envelope, false), false)
        .oneshot(post_optimize(body))
        .await
        .unwrap();

    assert_eq!(healthy.status(), degraded.status());
    assert_eq!(json_body(healthy).await, json_body(degraded).await);
}

#[tokio::test]
async fn test_preflight_is_empty_200_with_cors() {
    let exec = warehouse(json!({}), true);
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/optimize")
        .header("origin", "https://not-allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = router_with(exec.clone(), true).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(response.headers()["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(response.headers()["access-control-allow-headers"], "Content-Type, Authorization");
    assert_eq!(response.headers()["vary"], "Origin");
    assert!(text_body(response).await.is_empty());
    assert!(exec.statements.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_production_echoes_extension_origin() {
    let exec = warehouse(json!({"rowset": [["hello"]]}), true);
    let response =
        router_with(exec, true).oneshot(post_optimize(r#"{"tag":"t1"}"#)).await.unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], EXTENSION_ORIGIN);
    assert_eq!(json_body(response).await, json!("hello"));
}

#[tokio::test]
async fn test_unknown_routes_are_404() {
    for (method, uri) in [("GET", "/api/optimize"), ("POST", "/api/other"), ("GET", "/"), ("DELETE", "/api/optimize")] {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = router_with(warehouse(json!({}), true), false).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(text_body(response).await, "Not found");
    }
}
