//! Streamable HTTP transport.
//!
//! Every `POST /mcp` is one JSON-RPC message. The inbound headers travel with
//! `tools/call` as the [`RequestContext`], which is where the caller's access
//! token comes from. Calls with an id can be cancelled through
//! `notifications/cancelled` sent by the same caller (same `Mcp-Session-Id`,
//! or same token); a dropped connection cancels by dropping the handler future.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::inflight::InFlightRequests;
use super::rpc::{self, JsonRpcRequest, JsonRpcResponse, codes};
use crate::cancel::CancelSignal;
use crate::request::RequestContext;
use crate::tools::{Invocation, McpTool, ToolContext};

/// Shared state for HTTP handlers.
pub struct HttpState {
    pub tools: Vec<Box<dyn McpTool>>,
    pub ctx: ToolContext,
    pub in_flight: Arc<InFlightRequests>,
}

/// Create the HTTP router for MCP.
pub fn create_router(tools: Vec<Box<dyn McpTool>>, ctx: ToolContext) -> Router {
    let state = Arc::new(HttpState { tools, ctx, in_flight: Arc::new(InFlightRequests::new()) });

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/mcp", post(handle_mcp_post))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ready",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "tools": state.tools.len(),
        "in_flight": state.in_flight.len()
    }))
}

/// Handle POST requests to /mcp
async fn handle_mcp_post(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    Json(req): Json<JsonRpcRequest>,
) -> Response {
    tracing::debug!(method = %req.method, "Handling MCP POST request");

    let response = match req.method.as_str() {
        "initialize" => rpc::handle_initialize(req.id, &req.params),
        "notifications/initialized" | "initialized" => {
            if req.is_notification() {
                return StatusCode::ACCEPTED.into_response();
            }
            JsonRpcResponse::success(req.id, serde_json::json!({}))
        }
        "tools/list" => rpc::handle_tools_list(req.id, &state.tools),
        "tools/call" => handle_tools_call(&state, headers, req).await,
        "ping" => JsonRpcResponse::success(req.id, serde_json::json!({})),
        "notifications/cancelled" => {
            handle_cancelled(&state, &RequestContext::new(headers), &req.params);
            if req.is_notification() {
                return StatusCode::ACCEPTED.into_response();
            }
            JsonRpcResponse::success(req.id, serde_json::json!({}))
        }
        _ => {
            if req.is_notification() {
                return StatusCode::ACCEPTED.into_response();
            }
            JsonRpcResponse::error(
                req.id,
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", req.method),
            )
        }
    };

    Json(response).into_response()
}

async fn handle_tools_call(
    state: &HttpState,
    headers: HeaderMap,
    req: JsonRpcRequest,
) -> JsonRpcResponse {
    let request = RequestContext::new(headers);

    // Held until the call finishes so a later notification can still find it.
    let (_guard, cancel) = match req.id.as_ref() {
        Some(id) => {
            let (guard, signal) = state.in_flight.register(request.caller(), id);
            (Some(guard), signal)
        }
        None => (None, CancelSignal::never()),
    };

    let invocation = Invocation::http(request, cancel);

    rpc::handle_tools_call(req.id, &req.params, &state.tools, &state.ctx, &invocation).await
}

/// Only calls registered by the same caller can be cancelled.
fn handle_cancelled(state: &HttpState, request: &RequestContext, params: &serde_json::Value) {
    let Some(request_id) = params.get("requestId") else {
        tracing::debug!("Cancellation without requestId ignored");
        return;
    };

    let reason = params.get("reason").and_then(|v| v.as_str()).unwrap_or("unspecified");

    let caller = request.caller();

    if state.in_flight.cancel(&caller, request_id) {
        tracing::info!(request_id = %request_id, reason, "Cancelled in-flight tool call");
    } else {
        tracing::debug!(request_id = %request_id, ?caller, "No in-flight call to cancel for this caller");
    }
}
