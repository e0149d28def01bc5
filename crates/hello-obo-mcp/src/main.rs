//! Hello OBO MCP Server - Entry Point
//!
//! Provides both stdio and HTTP transports.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use hello_obo_mcp::config::{Config, OboConfig};
use hello_obo_mcp::server::McpServer;
use hello_obo_mcp::tools::ToolContext;

#[derive(Parser)]
#[command(name = "hello-obo-mcp")]
#[command(about = "MCP server with an on-behalf-of hello tool")]
#[command(version)]
struct Cli {
    /// Directory (tenant) id of the API registration
    #[arg(long, env = "OBO_TENANT_ID", default_value = "")]
    tenant_id: String,

    /// Application (client) id of the API registration
    #[arg(long, env = "OBO_CLIENT_ID", default_value = "")]
    client_id: String,

    /// Client secret of the API registration
    #[arg(long, env = "OBO_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    client_secret: String,

    /// Downstream scopes (comma separated)
    #[arg(long, env = "OBO_DOWNSTREAM_SCOPES", value_delimiter = ',')]
    downstream_scopes: Vec<String>,

    /// Identity provider authority
    #[arg(long, env = "AUTHORITY_URL")]
    authority_url: Option<String>,

    /// Microsoft Graph base URL
    #[arg(long, env = "GRAPH_API_URL")]
    graph_api_url: Option<String>,

    /// Transport mode: stdio or http
    #[arg(long, default_value = "http")]
    transport: Transport,

    /// HTTP server port (only used with --transport http)
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Environment-derived config, overridden by whatever was given on the command line.
    fn config(&self) -> anyhow::Result<Config> {
        let env = Config::from_env()?;
        let pick = |cli: &str, env: String| if cli.is_empty() { env } else { cli.to_string() };

        let scopes = if self.downstream_scopes.is_empty() {
            env.obo.downstream_scopes.clone()
        } else {
            self.downstream_scopes.clone()
        };

        let obo = OboConfig::new(
            pick(&self.tenant_id, env.obo.tenant_id),
            pick(&self.client_id, env.obo.client_id),
            pick(&self.client_secret, env.obo.client_secret),
        )
        .with_scopes(scopes);

        let config = Config::new(obo).with_endpoints(
            self.authority_url.clone().or(Some(env.authority_url)),
            self.graph_api_url.clone().or(Some(env.graph_api_url)),
        );
        config.validate()?;

        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Transport {
    /// Standard input/output (no HTTP request context)
    Stdio,
    /// Streamable HTTP
    #[default]
    Http,
}

/// Logs go to stderr: stdout carries the protocol in stdio mode.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?cli.transport,
        "Starting hello OBO MCP server"
    );

    let config = cli.config()?;
    if config.obo.is_configured() {
        tracing::info!(
            tenant_id = %config.obo.tenant_id,
            client_id = %config.obo.client_id,
            scopes = ?config.obo.downstream_scopes,
            "On-behalf-of exchange configured"
        );
    } else {
        tracing::warn!("OBO credentials missing, greetings will not resolve the user's display name");
    }

    let ctx = ToolContext::from_config(&config)?;
    let server = McpServer::new(ctx);

    match cli.transport {
        Transport::Stdio => {
            tracing::info!("Running in stdio mode");
            server.run_stdio().await?;
        }
        Transport::Http => {
            tracing::info!(port = cli.port, "Running in HTTP mode");
            server.run_http(cli.port).await?;
        }
    }

    Ok(())
}
