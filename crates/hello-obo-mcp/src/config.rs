//! Configuration for the hello OBO MCP server.

use std::time::Duration;

use anyhow::Context as _;
use url::Url;

/// Endpoint and transport constants.
pub mod api {
    use std::time::Duration;

    /// Microsoft identity platform authority host.
    pub const AUTHORITY_URL: &str = "https://login.microsoftonline.com";

    /// Microsoft Graph v1.0 endpoint.
    pub const GRAPH_API: &str = "https://graph.microsoft.com/v1.0";

    /// Default downstream scope (Graph `.default`).
    pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum keepalive connections per host.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Confidential-client credentials for the on-behalf-of exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct OboConfig {
    /// Directory (tenant) the app is registered in.
    pub tenant_id: String,

    /// Application (client) id of this API's registration.
    pub client_id: String,

    /// Client secret of this API's registration.
    pub client_secret: String,

    /// Scopes requested for the downstream resource.
    pub downstream_scopes: Vec<String>,
}

impl OboConfig {
    /// Create credentials with the default Graph scope.
    #[must_use]
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            downstream_scopes: default_scopes(),
        }
    }

    /// Replace the downstream scopes. An empty list falls back to the default scope.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        let scopes: Vec<String> = scopes
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self.downstream_scopes = if scopes.is_empty() { default_scopes() } else { scopes };
        self
    }

    /// True when tenant, client id and secret are all present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.tenant_id.trim().is_empty()
            && !self.client_id.trim().is_empty()
            && !self.client_secret.is_empty()
    }
}

impl Default for OboConfig {
    fn default() -> Self {
        Self::new("", "", "")
    }
}

impl std::fmt::Debug for OboConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OboConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("has_client_secret", &!self.client_secret.is_empty())
            .field("downstream_scopes", &self.downstream_scopes)
            .finish()
    }
}

fn default_scopes() -> Vec<String> {
    vec![api::DEFAULT_SCOPE.to_string()]
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// On-behalf-of credentials.
    pub obo: OboConfig,

    /// Identity provider authority (overridable for mock servers).
    pub authority_url: String,

    /// Graph API base URL (overridable for mock servers).
    pub graph_api_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl Config {
    /// Create a configuration against the public Microsoft endpoints.
    #[must_use]
    pub fn new(obo: OboConfig) -> Self {
        Self {
            obo,
            authority_url: api::AUTHORITY_URL.to_string(),
            graph_api_url: api::GRAPH_API.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
        }
    }

    /// Create a test configuration pointing both endpoints at a mock server.
    ///
    /// The token endpoint lands at `{base_url}/{tenant}/oauth2/v2.0/token` and
    /// Graph at `{base_url}/v1.0`.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            obo: OboConfig::new("test-tenant", "test-client", "test-secret"),
            authority_url: base_url.trim_end_matches('/').to_string(),
            graph_api_url: format!("{}/v1.0", base_url.trim_end_matches('/')),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        }
    }

    /// Override the endpoints.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        authority_url: Option<String>,
        graph_api_url: Option<String>,
    ) -> Self {
        if let Some(url) = authority_url {
            self.authority_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = graph_api_url {
            self.graph_api_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `OBO_TENANT_ID`, `OBO_CLIENT_ID`, `OBO_CLIENT_SECRET` and
    /// `OBO_DOWNSTREAM_SCOPES` (comma or space separated). The function-host
    /// style names (`Obo__TenantId`, ...) are accepted as fallbacks.
    pub fn from_env() -> anyhow::Result<Self> {
        let tenant_id = env_any(&["OBO_TENANT_ID", "Obo__TenantId"]).unwrap_or_default();
        let client_id = env_any(&["OBO_CLIENT_ID", "Obo__ClientId"]).unwrap_or_default();
        let client_secret =
            env_any(&["OBO_CLIENT_SECRET", "Obo__ClientSecret"]).unwrap_or_default();
        let scopes = env_any(&["OBO_DOWNSTREAM_SCOPES", "Obo__DownstreamScopes"])
            .map(|raw| parse_scopes(&raw))
            .unwrap_or_default();

        let obo = OboConfig::new(tenant_id, client_id, client_secret).with_scopes(scopes);

        let config = Self::new(obo).with_endpoints(
            std::env::var("AUTHORITY_URL").ok(),
            std::env::var("GRAPH_API_URL").ok(),
        );
        config.validate()?;

        Ok(config)
    }

    /// Check that both endpoints are absolute URLs that can carry a path.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in
            [("authority URL", &self.authority_url), ("Graph API URL", &self.graph_api_url)]
        {
            let url = Url::parse(value).with_context(|| format!("invalid {name}: {value}"))?;
            if url.cannot_be_a_base() {
                anyhow::bail!("{name} cannot carry a path: {value}");
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(OboConfig::default())
    }
}

/// Split a scope list on commas and whitespace.
#[must_use]
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_any(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| std::env::var(name).ok())
}
