//! Stdio transport for MCP protocol.
//!
//! Handles JSON-RPC 2.0 over stdin/stdout. There is no HTTP request behind a
//! stdio call, so tools see a detached [`Invocation`].

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::rpc::{self, JsonRpcRequest, JsonRpcResponse, codes};
use crate::cancel::CancelSignal;
use crate::tools::{Invocation, McpTool, ToolContext};

/// Handle MCP protocol over stdio.
pub async fn run_stdio(tools: Vec<Box<dyn McpTool>>, ctx: ToolContext) -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    tracing::info!("MCP stdio server ready, waiting for requests...");

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            tracing::info!("Stdin closed, shutting down");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
            Ok(request) => {
                tracing::debug!(method = %request.method, "Received request");
                match handle_request(request, &tools, &ctx).await {
                    Some(response) => response,
                    None => continue,
                }
            }
            Err(e) => {
                JsonRpcResponse::error(None, codes::PARSE_ERROR, format!("Parse error: {}", e))
            }
        };

        let response_json = serde_json::to_string(&response)?;
        stdout.write_all(response_json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}

/// Dispatch one request. Notifications produce no response.
async fn handle_request(
    req: JsonRpcRequest,
    tools: &[Box<dyn McpTool>],
    ctx: &ToolContext,
) -> Option<JsonRpcResponse> {
    if req.is_notification() {
        tracing::debug!(method = %req.method, "Notification ignored");
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => rpc::handle_initialize(req.id, &req.params),
        "initialized" | "ping" => JsonRpcResponse::success(req.id, serde_json::json!({})),
        "tools/list" => rpc::handle_tools_list(req.id, tools),
        "tools/call" => {
            let invocation = Invocation::detached(CancelSignal::never());
            rpc::handle_tools_call(req.id, &req.params, tools, ctx, &invocation).await
        }
        _ => JsonRpcResponse::error(
            req.id,
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}
