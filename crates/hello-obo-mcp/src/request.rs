//! Inbound HTTP request context handed to tools.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

/// Header App Service authentication injects with the caller's access token.
pub const AAD_ACCESS_TOKEN_HEADER: &str = "x-ms-token-aad-access-token";

/// Header the streamable HTTP transport uses to name a client session.
pub const MCP_SESSION_ID_HEADER: &str = "mcp-session-id";

/// Who sent a request. JSON-RPC ids are only unique per caller.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Caller {
    /// Client that announced an `Mcp-Session-Id`.
    Session(String),
    /// Client identified by the token it presented.
    User(String),
    /// No session and no token; all such clients share one scope.
    Anonymous,
}

impl std::fmt::Debug for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session(id) => f.debug_tuple("Session").field(id).finish(),
            Self::User(_) => f.write_str("User(..)"),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// The parts of the inbound HTTP request a tool may look at.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: HeaderMap,
}

impl RequestContext {
    /// Wrap the inbound headers.
    #[must_use]
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    /// Inbound headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Resolve the caller's token.
    ///
    /// The provider-injected header wins over `Authorization: Bearer`. Blank
    /// values count as absent.
    #[must_use]
    pub fn user_token(&self) -> Option<String> {
        if let Some(token) = first_value(&self.headers, AAD_ACCESS_TOKEN_HEADER) {
            return Some(token.to_string());
        }

        first_value(&self.headers, AUTHORIZATION.as_str())
            .map(strip_bearer)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }

    /// Identify the caller: the session header first, then the user token.
    #[must_use]
    pub fn caller(&self) -> Caller {
        if let Some(session) = first_value(&self.headers, MCP_SESSION_ID_HEADER) {
            return Caller::Session(session.to_string());
        }

        self.user_token().map_or(Caller::Anonymous, Caller::User)
    }
}

fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Strip a leading `Bearer` scheme, matched case-insensitively.
fn strip_bearer(value: &str) -> &str {
    const SCHEME: &str = "bearer";

    match value.get(..SCHEME.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(SCHEME) => {
            let rest = &value[SCHEME.len()..];
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                rest.trim_start()
            } else {
                value
            }
        }
        _ => value,
    }
}
