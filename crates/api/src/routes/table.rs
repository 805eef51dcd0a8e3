//! The table endpoint: client-supplied SQL in, JSON out
//!
//! Replies use the fixed bodies of the service this replaces. Rejected and
//! failed requests carry `{"error": <text>}` with the real cause confined to
//! the log; successful writes carry `{"message": <text>}`.

use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use tablegate_sql_gateway::{admit_payload, admit_statement};

use crate::state::AppState;

const INSERT_SUCCESS_MSG: &str = "Data inserted successfully.";
const INSERT_FAIL_MSG: &str = "Data insertion failed.";
const QUERY_FAIL_MSG: &str = "Data retrieval failed.";
const UNSUPPORTED_METHOD_MSG: &str = "Unsupported request method.";
const INVALID_COMMAND_MSG: &str = "Invalid SQL command";

type ApiError = (StatusCode, Json<Value>);

fn reject(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

/// Create the table router
pub fn create_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(run_query).post(submit).fallback(method_not_allowed),
    )
}

/// Query-string shape of a GET request. The `query` value is itself a JSON
/// document of the form `{"query": "<sql>"}`.
#[derive(Debug, Deserialize)]
struct QueryParams {
    query: Option<String>,
}

/// POST body shapes, matched in order: a raw command first, then the
/// structured insert.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TableRequest {
    RawQuery { query: String },
    InsertRecord { name: String, date: String },
}

/// GET /: run the statement carried in the `query` parameter and return the
/// resulting rows as a JSON array.
async fn run_query(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Value>, ApiError> {
    let payload = params.query.ok_or_else(|| {
        warn!("GET without query parameter");
        reject(StatusCode::BAD_REQUEST, INVALID_COMMAND_MSG)
    })?;

    let command = admit_payload(&payload).map_err(|e| {
        warn!(error = %e, "Rejected inbound statement");
        reject(StatusCode::BAD_REQUEST, INVALID_COMMAND_MSG)
    })?;

    let rows = state.gateway.run_command(&command).await.map_err(|e| {
        error!(error = %e, "Query execution failed");
        reject(StatusCode::INTERNAL_SERVER_ERROR, QUERY_FAIL_MSG)
    })?;

    Ok(Json(Value::Array(rows)))
}

/// POST /: run a raw command from the body, or perform the parameter-bound
/// insert when the body carries a record instead of a statement.
async fn submit(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request: TableRequest = serde_json::from_str(&body).map_err(|e| {
        warn!(error = %e, "POST body matched no request shape");
        reject(StatusCode::BAD_REQUEST, INVALID_COMMAND_MSG)
    })?;

    match request {
        TableRequest::RawQuery { query } => {
            let command = admit_statement(query).map_err(|e| {
                warn!(error = %e, "Rejected inbound statement");
                reject(StatusCode::BAD_REQUEST, INVALID_COMMAND_MSG)
            })?;

            state.gateway.run_command(&command).await.map_err(|e| {
                error!(error = %e, "Command execution failed");
                reject(StatusCode::INTERNAL_SERVER_ERROR, INSERT_FAIL_MSG)
            })?;

            Ok((StatusCode::OK, Json(json!({ "message": INSERT_SUCCESS_MSG }))))
        }
        TableRequest::InsertRecord { name, date } => {
            let date_of_birth = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                warn!(error = %e, date = %date, "Record date is not YYYY-MM-DD");
                reject(StatusCode::BAD_REQUEST, INVALID_COMMAND_MSG)
            })?;

            let id = state
                .gateway
                .insert_record(&name, date_of_birth)
                .await
                .map_err(|e| {
                    error!(error = %e, "Insert failed");
                    reject(StatusCode::INTERNAL_SERVER_ERROR, INSERT_FAIL_MSG)
                })?;

            info!(id, "Record inserted");

            Ok((
                StatusCode::CREATED,
                Json(json!({ "message": INSERT_SUCCESS_MSG })),
            ))
        }
    }
}

/// Any verb other than GET, POST and OPTIONS lands here.
async fn method_not_allowed(method: Method) -> ApiError {
    warn!(method = %method, "Unsupported request method");
    reject(StatusCode::METHOD_NOT_ALLOWED, UNSUPPORTED_METHOD_MSG)
}
