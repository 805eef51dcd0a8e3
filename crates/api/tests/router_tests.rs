// Router-level tests driven through tower's oneshot, no database required.
//
// The pool is built lazily with a short acquire timeout and never has to
// connect: every request here is either decided before the gateway touches
// PostgreSQL, or written so that an unreachable database and a reachable one
// produce the same status.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use tablegate::{create_router, AppConfig, AppState};
use tablegate_sql_gateway::{GatewayConfig, TableGateway};

const TEST_DATABASE_URL: &str = "postgres://postgres@localhost:59999/tablegate_test";

fn test_state() -> AppState {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(100))
        .connect_lazy(TEST_DATABASE_URL)
        .expect("lazy pool");

    let config = AppConfig {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_url: TEST_DATABASE_URL.to_string(),
        table: "patients".to_string(),
    };

    let gateway = TableGateway::new(
        GatewayConfig::new("patients").expect("table name"),
        pool.clone(),
    );

    AppState {
        pool,
        gateway: Arc::new(gateway),
        config: Arc::new(config),
    }
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body is JSON")
}

#[tokio::test]
async fn options_preflight_carries_cors_headers() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/")
                .header(header::ORIGIN, "http://localhost:8080")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap();
    for method in ["GET", "POST", "OPTIONS"] {
        assert!(methods.contains(method), "{method} missing from {methods}");
    }

    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "content-type");
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn put_is_refused_with_405() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    // The allow-origin header rides on every response, not just preflights.
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let body = body_json(response).await;
    assert_eq!(body["error"], "Unsupported request method.");
}

#[tokio::test]
async fn patch_and_delete_are_refused_with_405() {
    for method in [Method::PATCH, Method::DELETE] {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method(method.clone())
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
    }
}

#[tokio::test]
async fn get_without_query_parameter_is_400() {
    let app = create_router(test_state());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid SQL command");
}

#[tokio::test]
async fn get_with_denied_statement_is_400() {
    // ?query={"query":"DROP TABLE patients"} with the value percent-encoded.
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/?query=%7B%22query%22%3A%22DROP%20TABLE%20patients%22%7D")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid SQL command");
}

#[tokio::test]
async fn get_with_bare_sql_parameter_is_400() {
    // The parameter must carry a JSON document, not the SQL text itself.
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/?query=SELECT%20*%20FROM%20patients")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid SQL command");
}

#[tokio::test]
async fn get_failure_after_admission_is_500() {
    // An admitted statement proceeds to execution; with no table and no
    // reachable database alike, the failure surfaces as the fixed 500 body.
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/?query=%7B%22query%22%3A%22SELECT%20*%20FROM%20surely_not_a_real_table%22%7D")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Data retrieval failed.");
}

#[tokio::test]
async fn post_with_denied_statement_is_400() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"query":"DELETE FROM patients"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid SQL command");
}

#[tokio::test]
async fn post_with_unparseable_body_is_400() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("INSERT INTO patients VALUES (1)"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid SQL command");
}

#[tokio::test]
async fn post_with_empty_statement_is_400() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"query":""}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_insert_with_malformed_date_is_400() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"Sara Brown","date":"01-01-1901"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid SQL command");
}

#[tokio::test]
async fn admitted_lowercase_statement_reaches_execution() {
    // Lowercase spellings pass the admission gate, so the request proceeds
    // to execution and surfaces its failure as a 500.
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"query":"drop table surely_not_a_real_table"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Data insertion failed.");
}
