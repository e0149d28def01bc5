//! Greeting payload returned by the `hello` tool.

use serde::Serialize;

use crate::claims::TokenClaims;

/// Subject used when neither a name nor a display name is available.
pub const DEFAULT_SUBJECT: &str = "världen";

/// Structured `hello` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GreetingResponse {
    pub message: String,
    #[serde(rename = "resolvedUser")]
    pub resolved_user: Option<String>,
    #[serde(rename = "providedName")]
    pub provided_name: Option<String>,
    pub token: TokenClaims,
}

impl GreetingResponse {
    /// Assemble the payload, choosing the subject by precedence.
    #[must_use]
    pub fn new(
        provided_name: Option<String>,
        resolved_user: Option<String>,
        token: TokenClaims,
    ) -> Self {
        let subject = greeting_subject(provided_name.as_deref(), resolved_user.as_deref());

        Self {
            message: format!("Tja {subject}! Jag är Keen Test MCP\u{2011}verktyg."),
            resolved_user,
            provided_name,
            token,
        }
    }
}

/// Explicit name, else resolved display name, else [`DEFAULT_SUBJECT`].
#[must_use]
pub fn greeting_subject<'a>(provided: Option<&'a str>, resolved: Option<&'a str>) -> &'a str {
    provided
        .filter(|s| !s.trim().is_empty())
        .or_else(|| resolved.filter(|s| !s.trim().is_empty()))
        .unwrap_or(DEFAULT_SUBJECT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_precedence() {
        assert_eq!(greeting_subject(Some("Alan"), Some("Grace Hopper")), "Alan");
        assert_eq!(greeting_subject(Some("  "), Some("Grace Hopper")), "Grace Hopper");
        assert_eq!(greeting_subject(None, Some("")), DEFAULT_SUBJECT);
        assert_eq!(greeting_subject(None, None), DEFAULT_SUBJECT);
    }

    #[test]
    fn test_wire_shape() {
        let response = GreetingResponse::new(Some("Alan".into()), None, TokenClaims::default());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["message"], "Tja Alan! Jag är Keen Test MCP‑verktyg.");
        assert!(json["resolvedUser"].is_null());
        assert_eq!(json["providedName"], "Alan");
        assert!(json["token"]["scopes_or_roles"].is_null());
        assert!(json["token"].get("preferred_username").is_some());
    }
}
