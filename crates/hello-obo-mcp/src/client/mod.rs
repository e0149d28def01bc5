//! Outbound HTTP clients.
//!
//! One pooled [`reqwest::Client`] is built at startup and shared by:
//! - [`OboTokenClient`], the on-behalf-of exchange against the token endpoint
//! - [`GraphClient`], the `/me` profile lookup on Microsoft Graph
//!
//! Neither client retries or caches; both honour the per-request [`CancelSignal`].

mod obo;

pub use obo::{OBO_GRANT_TYPE, OboTokenClient, TokenExchange};

use reqwest::Client;
use serde::Deserialize;

use crate::cancel::CancelSignal;
use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};

/// Build the shared connection-pooling HTTP client.
pub fn build_http_client(config: &Config) -> anyhow::Result<Client> {
    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(api::MAX_KEEPALIVE)
        .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
        .build()?;

    Ok(client)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserProfile {
    #[serde(default)]
    display_name: Option<String>,
}

/// Microsoft Graph client for the signed-in user's profile.
#[derive(Clone)]
pub struct GraphClient {
    /// Shared HTTP client.
    client: Client,

    /// Graph API base URL.
    graph_api_url: String,
}

impl GraphClient {
    /// Create a Graph client on top of the shared HTTP client.
    #[must_use]
    pub fn new(client: Client, graph_api_url: impl Into<String>) -> Self {
        Self { client, graph_api_url: graph_api_url.into() }
    }

    /// Graph API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.graph_api_url
    }

    /// Fetch the signed-in user's `displayName` using a delegated Graph token.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status, a body without
    /// `displayName`, or cancellation.
    pub async fn display_name(
        &self,
        access_token: &str,
        cancel: &CancelSignal,
    ) -> ClientResult<String> {
        let url = format!("{}/me", self.graph_api_url);

        let request = async {
            let response = self
                .client
                .get(&url)
                .query(&[("$select", "displayName")])
                .bearer_auth(access_token)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await?;

            let response = handle_response(response).await?;
            let body = response.text().await?;

            Ok::<_, ClientError>(body)
        };

        let body = cancel.guard(request).await??;
        display_name_from_body(&body)
    }
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient").field("graph_api_url", &self.graph_api_url).finish()
    }
}

/// Read `displayName` out of a Graph `/me` response body.
pub fn display_name_from_body(body: &str) -> ClientResult<String> {
    let profile: UserProfile = serde_json::from_str(body)?;

    profile
        .display_name
        .filter(|name| !name.is_empty())
        .ok_or(ClientError::MissingField("displayName"))
}

/// Map non-success statuses to [`ClientError`].
async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();

    match status.as_u16() {
        401 | 403 => Err(ClientError::unauthorized(status.as_u16(), text)),
        500..=599 => Err(ClientError::server(status.as_u16(), text)),
        code => Err(ClientError::UnexpectedStatus { status: code, message: text }),
    }
}
