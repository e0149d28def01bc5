//! MCP tool implementations.
//!
//! Each tool:
//! 1. Parses its input parameters
//! 2. Reads what it needs from the per-call [`Invocation`]
//! 3. Calls the outbound clients through the shared [`ToolContext`]

mod hello;

pub use hello::{HelloTool, NO_REQUEST_CONTEXT};

use std::sync::Arc;

use crate::cancel::CancelSignal;
use crate::client::{GraphClient, OboTokenClient, TokenExchange, build_http_client};
use crate::config::Config;
use crate::error::ToolResult;
use crate::request::RequestContext;

/// Process-wide tool execution context, shared by every request.
#[derive(Clone)]
pub struct ToolContext {
    /// Microsoft Graph client.
    pub graph: Arc<GraphClient>,

    /// On-behalf-of exchange.
    pub token_exchange: Arc<dyn TokenExchange>,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub fn new(graph: Arc<GraphClient>, token_exchange: Arc<dyn TokenExchange>) -> Self {
        Self { graph, token_exchange }
    }

    /// Build both clients on one shared HTTP connection pool.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails or the authority URL is invalid.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = build_http_client(config)?;
        let graph = GraphClient::new(http.clone(), config.graph_api_url.clone());
        let obo = OboTokenClient::new(http, config)?;

        Ok(Self::new(Arc::new(graph), Arc::new(obo)))
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext").field("graph", &self.graph).finish()
    }
}

/// Per-call state: the inbound request (if the transport has one) and its cancellation signal.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Inbound HTTP request, absent on transports without one (stdio).
    pub request: Option<RequestContext>,

    /// Fires when the caller abandons the call.
    pub cancel: CancelSignal,
}

impl Invocation {
    /// Invocation carrying an HTTP request.
    #[must_use]
    pub fn http(request: RequestContext, cancel: CancelSignal) -> Self {
        Self { request: Some(request), cancel }
    }

    /// Invocation without any HTTP request.
    #[must_use]
    pub fn detached(cancel: CancelSignal) -> Self {
        Self { request: None, cancel }
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "hello").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given input.
    async fn execute(
        &self,
        ctx: &ToolContext,
        invocation: &Invocation,
        input: serde_json::Value,
    ) -> ToolResult<String>;
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![Box::new(HelloTool)]
}
