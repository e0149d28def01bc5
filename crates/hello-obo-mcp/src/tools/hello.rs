//! The `hello` tool: greet the caller, resolved through an on-behalf-of Graph lookup.

use serde_json::json;

use super::{Invocation, McpTool, ToolContext};
use crate::cancel::CancelSignal;
use crate::claims::{self, TokenClaims};
use crate::error::{ClientResult, ToolError, ToolResult};
use crate::models::{GreetingResponse, HelloInput};

/// Returned instead of a greeting when the transport supplied no HTTP request.
pub const NO_REQUEST_CONTEXT: &str = "Could not resolve HTTP request context for this invocation.";

/// Hello tool.
pub struct HelloTool;

#[async_trait::async_trait]
impl McpTool for HelloTool {
    fn name(&self) -> &'static str {
        "hello"
    }

    fn description(&self) -> &'static str {
        "Simple hello world MCP Tool that responses with a hello message."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Person to greet"
                }
            },
            "required": []
        })
    }

    async fn execute(
        &self,
        ctx: &ToolContext,
        invocation: &Invocation,
        input: serde_json::Value,
    ) -> ToolResult<String> {
        tracing::info!("Saying hello");

        let params: HelloInput = if input.is_null() {
            HelloInput::default()
        } else {
            serde_json::from_value(input).map_err(|e| ToolError::validation("name", e.to_string()))?
        };

        let Some(request) = invocation.request.as_ref() else {
            return Ok(NO_REQUEST_CONTEXT.to_string());
        };

        let user_token = request.user_token();

        let token_claims = user_token.as_deref().map(display_claims).unwrap_or_default();

        let resolved_user = match user_token.as_deref() {
            Some(token) => resolve_display_name(ctx, token, &invocation.cancel).await?,
            None => {
                tracing::debug!("No user token on request, greeting without user context");
                None
            }
        };

        let response = GreetingResponse::new(params.name, resolved_user, token_claims);

        Ok(serde_json::to_string(&response)?)
    }
}

/// Best-effort claim extraction; a malformed token yields empty claims.
fn display_claims(token: &str) -> TokenClaims {
    match claims::decode_payload(token) {
        Ok(decoded) => TokenClaims::from_claims(&decoded),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to decode JWT payload");
            TokenClaims::default()
        }
    }
}

/// Exchange the user token and read `displayName` from Graph.
///
/// Every failure except cancellation degrades to `None`.
async fn resolve_display_name(
    ctx: &ToolContext,
    user_token: &str,
    cancel: &CancelSignal,
) -> ToolResult<Option<String>> {
    match lookup_display_name(ctx, user_token, cancel).await {
        Ok(name) => Ok(Some(name)),
        Err(e) if e.is_cancelled() => Err(ToolError::Cancelled),
        Err(e) if e.is_assertion_problem() => {
            tracing::info!(
                error = %e,
                "User token not accepted for on-behalf-of exchange, proceeding without user context"
            );
            Ok(None)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to resolve user via Graph, proceeding without user context"
            );
            Ok(None)
        }
    }
}

async fn lookup_display_name(
    ctx: &ToolContext,
    user_token: &str,
    cancel: &CancelSignal,
) -> ClientResult<String> {
    let graph_token = ctx.token_exchange.acquire_on_behalf_of(user_token, cancel).await?;
    ctx.graph.display_name(&graph_token, cancel).await
}
