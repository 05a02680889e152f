//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{calculate_payroll, preview_payroll};

use super::request::PayrollRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/payroll/preview", post(preview_handler))
        .route("/payroll/calculate", post(calculate_handler))
        .with_state(state)
}

/// Handler for GET / endpoint.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "msg": "Payroll engine running"
    }))
}

/// Handler for POST /payroll/preview endpoint.
///
/// Returns the payroll result as a flat object of whole-kwanza amounts.
async fn preview_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll preview");

    let request = match parse_request(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response.into_response(),
    };

    match preview_payroll(state.config(), request.gross_salary, request.options()) {
        Ok(preview) => {
            info!(
                correlation_id = %correlation_id,
                irt = preview.get("irt").copied(),
                net_salary = preview.get("net_salary").copied(),
                "Preview completed successfully"
            );
            json_ok(preview)
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Preview failed");
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Handler for POST /payroll/calculate endpoint.
///
/// Returns the stamped calculation with its audit trace.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll calculation");

    let request = match parse_request(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response.into_response(),
    };

    let config = state.config();
    let result = request
        .into_input(config.inss())
        .and_then(|input| calculate_payroll(config, &input));

    match result {
        Ok(calculation) => {
            info!(
                correlation_id = %correlation_id,
                calculation_id = %calculation.calculation_id,
                warnings = calculation.audit_trace.warnings.len(),
                "Calculation completed successfully"
            );
            json_ok(calculation)
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Calculation failed");
            ApiErrorResponse::from(err).into_response()
        }
    }
}

fn json_ok<T: serde::Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Unwraps the JSON body or builds the 400 response describing why it failed.
fn parse_request(
    correlation_id: Uuid,
    payload: Result<Json<PayrollRequest>, JsonRejection>,
) -> Result<PayrollRequest, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };

    Err(ApiErrorResponse::bad_request(error))
}
