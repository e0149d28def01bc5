//! OAuth 2.0 on-behalf-of exchange (confidential client, jwt-bearer grant).

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::handle_response;
use crate::cancel::CancelSignal;
use crate::config::{Config, OboConfig};
use crate::error::{ClientError, ClientResult};

/// `grant_type` for the on-behalf-of flow.
pub const OBO_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// AADSTS code for "the user or administrator has not consented".
const AADSTS_CONSENT_REQUIRED: u64 = 65001;

/// Exchange of a user assertion for a downstream access token.
#[async_trait::async_trait]
pub trait TokenExchange: Send + Sync {
    /// Exchange `user_token` for an access token carrying the downstream scopes.
    async fn acquire_on_behalf_of(
        &self,
        user_token: &str,
        cancel: &CancelSignal,
    ) -> ClientResult<String>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
    #[serde(default)]
    error_codes: Vec<u64>,
    #[serde(default)]
    suberror: Option<String>,
}

impl TokenErrorResponse {
    fn into_client_error(self, status: u16) -> ClientError {
        let consent = self.error == "interaction_required"
            || self.error == "consent_required"
            || self.suberror.as_deref() == Some("consent_required")
            || self.error_codes.contains(&AADSTS_CONSENT_REQUIRED);

        if consent {
            return ClientError::ConsentRequired { description: self.error_description };
        }

        if self.error == "invalid_grant" {
            return ClientError::InvalidAssertion { description: self.error_description };
        }

        ClientError::TokenEndpoint {
            status,
            error: self.error,
            description: self.error_description,
        }
    }
}

/// Confidential client performing the on-behalf-of exchange.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Clone)]
pub struct OboTokenClient {
    /// Shared HTTP client.
    client: Client,

    /// `{authority}/{tenant}/oauth2/v2.0/token`.
    token_endpoint: Url,

    /// Credentials and downstream scopes.
    obo: OboConfig,
}

impl OboTokenClient {
    /// Create the exchange client for the configured tenant.
    ///
    /// # Errors
    ///
    /// Returns error if the authority URL cannot carry a path.
    pub fn new(client: Client, config: &Config) -> anyhow::Result<Self> {
        let mut token_endpoint = Url::parse(&config.authority_url)?;
        token_endpoint
            .path_segments_mut()
            .map_err(|()| anyhow::anyhow!("authority URL cannot be a base: {}", config.authority_url))?
            .pop_if_empty()
            .extend([config.obo.tenant_id.as_str(), "oauth2", "v2.0", "token"]);

        Ok(Self { client, token_endpoint, obo: config.obo.clone() })
    }

    /// Token endpoint the exchange posts to.
    #[must_use]
    pub fn token_endpoint(&self) -> &str {
        self.token_endpoint.as_str()
    }

    /// Downstream scopes requested on every exchange.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.obo.downstream_scopes
    }

    async fn exchange(&self, user_token: &str) -> ClientResult<String> {
        let scope = self.obo.downstream_scopes.join(" ");
        let form = [
            ("grant_type", OBO_GRANT_TYPE),
            ("client_id", self.obo.client_id.as_str()),
            ("client_secret", self.obo.client_secret.as_str()),
            ("assertion", user_token),
            ("scope", scope.as_str()),
            ("requested_token_use", "on_behalf_of"),
        ];

        let response = self.client.post(self.token_endpoint.clone()).form(&form).send().await?;
        let status = response.status();

        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(error) if !error.error.is_empty() => error.into_client_error(status.as_u16()),
                _ => ClientError::UnexpectedStatus { status: status.as_u16(), message: body },
            });
        }

        let response = handle_response(response).await?;
        let token: TokenResponse = serde_json::from_str(&response.text().await?)?;

        if token.access_token.is_empty() {
            return Err(ClientError::MissingField("access_token"));
        }

        tracing::debug!(expires_in = ?token.expires_in, "On-behalf-of exchange succeeded");

        Ok(token.access_token)
    }
}

#[async_trait::async_trait]
impl TokenExchange for OboTokenClient {
    async fn acquire_on_behalf_of(
        &self,
        user_token: &str,
        cancel: &CancelSignal,
    ) -> ClientResult<String> {
        if !self.obo.is_configured() {
            return Err(ClientError::NotConfigured);
        }

        tracing::debug!(
            endpoint = %self.token_endpoint,
            scopes = ?self.obo.downstream_scopes,
            "Requesting on-behalf-of token"
        );

        cancel.guard(self.exchange(user_token)).await?
    }
}

impl std::fmt::Debug for OboTokenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OboTokenClient")
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("obo", &self.obo)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_body(json: serde_json::Value) -> TokenErrorResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_token_endpoint_from_authority() {
        let config = Config::for_testing("http://127.0.0.1:9999/");
        let client = OboTokenClient::new(Client::new(), &config).unwrap();
        assert_eq!(client.token_endpoint(), "http://127.0.0.1:9999/test-tenant/oauth2/v2.0/token");
    }

    #[test]
    fn test_consent_classification() {
        let err = error_body(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "AADSTS65001: The user or administrator has not consented",
            "error_codes": [65001],
            "suberror": "consent_required"
        }))
        .into_client_error(400);
        assert!(matches!(err, ClientError::ConsentRequired { .. }));

        let err = error_body(serde_json::json!({"error": "interaction_required"}))
            .into_client_error(400);
        assert!(matches!(err, ClientError::ConsentRequired { .. }));
    }

    #[test]
    fn test_consent_required_error_code() {
        let err = error_body(serde_json::json!({
            "error": "consent_required",
            "error_description": "AADSTS65004: User declined to consent to access the app."
        }))
        .into_client_error(400);
        assert!(matches!(err, ClientError::ConsentRequired { ref description } if description.starts_with("AADSTS65004")));
    }

    #[test]
    fn test_invalid_grant_classification() {
        let err = error_body(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "AADSTS500133: Assertion is not within its valid time range.",
            "error_codes": [500133]
        }))
        .into_client_error(400);
        assert!(matches!(err, ClientError::InvalidAssertion { .. }));
    }

    #[test]
    fn test_other_oauth_errors() {
        let err = error_body(serde_json::json!({"error": "invalid_client"})).into_client_error(401);
        assert!(matches!(err, ClientError::TokenEndpoint { status: 401, .. }));
    }

    #[test]
    fn test_debug_hides_secret() {
        let client = OboTokenClient::new(Client::new(), &Config::for_testing("http://localhost"))
            .unwrap();
        assert!(!format!("{client:?}").contains("test-secret"));
    }
}
