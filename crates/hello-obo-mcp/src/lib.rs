//! Hello OBO MCP Server
//!
//! A Model Context Protocol (MCP) server exposing a single `hello` tool. The
//! tool takes the caller's access token from the inbound request, exchanges it
//! on-behalf-of the user for a Microsoft Graph token, looks up the user's
//! display name and answers with a greeting that echoes a few token claims.
//!
//! # Features
//!
//! - **On-behalf-of exchange**: confidential-client jwt-bearer grant, no token cache
//! - **Best-effort identity**: decode and lookup failures degrade to an anonymous greeting
//! - **Cancellable**: every outbound call races the per-request cancellation signal
//! - **Two transports**: streamable HTTP (carries headers) and stdio
//!
//! # Example
//!
//! ```no_run
//! use hello_obo_mcp::{config::Config, server::McpServer, tools::ToolContext};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let ctx = ToolContext::from_config(&config)?;
//!
//!     McpServer::new(ctx).run_http(8000).await
//! }
//! ```

pub mod cancel;
pub mod claims;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod request;
pub mod server;
pub mod tools;

pub use client::{GraphClient, OboTokenClient, TokenExchange};
pub use config::{Config, OboConfig};
pub use error::{ClaimsError, ClientError, ToolError};
