//! REST endpoint for Stripe Connect onboarding.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info, warn};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use super::flow::ConnectFlow;
use super::model::{ConnectRequest, ConnectResponse, ErrorBody};
use crate::error::ConnectError;

#[derive(OpenApi)]
#[openapi(
    info(title = "Founder Connect API"),
    tags((name = "founder", description = "Founder payment onboarding"))
)]
struct ApiDoc;

/// Shared state for connect routes.
#[derive(Clone)]
pub struct ConnectRouteState {
    pub flow: Arc<ConnectFlow>,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses((status = OK, description = "Service is up")),
    tag = "founder"
)]
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "founder-connect"
    }))
}

/// Create Stripe Connect onboarding link for founder
///
/// Body `{"founder_id": "<uuid>"}`. Responds `200 {"url": ...}`, `404` when
/// the founder does not exist, `500` with `Error: <message>` otherwise.
#[utoipa::path(
    post,
    path = "/founder/connect-stripe",
    request_body = ConnectRequest,
    responses(
        (status = OK, body = ConnectResponse),
        (status = BAD_REQUEST, body = ErrorBody),
        (status = NOT_FOUND, description = "Founder not found", body = String, content_type = "text/plain"),
        (status = INTERNAL_SERVER_ERROR, description = "Error: <message>", body = String, content_type = "text/plain"),
    ),
    tag = "founder"
)]
async fn connect_stripe(
    State(state): State<ConnectRouteState>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected connect request body");
            let body = ErrorBody {
                error: rejection.body_text(),
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match state.flow.onboarding_link(request.founder_id).await {
        Ok(link) => (StatusCode::OK, Json(ConnectResponse { url: link.url })).into_response(),
        Err(ConnectError::FounderNotFound(id)) => {
            info!(founder_id = %id, "Connect requested for unknown founder");
            (StatusCode::NOT_FOUND, "Founder not found").into_response()
        }
        Err(e) => {
            error!(founder_id = %request.founder_id, error = %e, "Connect onboarding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}")).into_response()
        }
    }
}

/// Build the connect REST routes. The generated OpenAPI document is served
/// at `GET /openapi.json`.
pub fn connect_routes(state: ConnectRouteState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(health))
        .routes(routes!(connect_stripe))
        .with_state(state)
        .split_for_parts();

    let document = Json(api);
    router.route("/openapi.json", get(move || async move { document }))
}
