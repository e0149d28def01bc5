//! Unverified JWT payload decoding.
//!
//! **WARNING**: nothing here checks the signature, issuer, audience or expiry.
//! The claims are echoed back to the caller for display and must never drive
//! an authorization decision.

use std::collections::HashMap;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use serde::Serialize;

use crate::error::ClaimsError;

/// Standard alphabet, canonical padding, tolerant of non-zero trailing bits.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Claim names, lowercased, mapped to a string rendering of their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims {
    entries: HashMap<String, String>,
}

impl Claims {
    /// Case-insensitive claim lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Number of distinct claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no claims were decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The subset of claims echoed in the greeting payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenClaims {
    pub name: Option<String>,
    pub preferred_username: Option<String>,
    pub oid: Option<String>,
    pub tid: Option<String>,
    /// Delegated `scp`, or app `roles` when no `scp` is present.
    pub scopes_or_roles: Option<String>,
}

impl TokenClaims {
    /// Pick the displayed claims out of a decoded payload.
    #[must_use]
    pub fn from_claims(claims: &Claims) -> Self {
        let owned = |key: &str| claims.get(key).map(str::to_string);

        Self {
            name: owned("name"),
            preferred_username: owned("preferred_username"),
            oid: owned("oid"),
            tid: owned("tid"),
            scopes_or_roles: owned("scp").or_else(|| owned("roles")),
        }
    }
}

/// Decode a base64url segment, restoring the padding JWTs strip.
///
/// A length of 1 modulo 4 can never be valid base64 and is rejected up front.
pub fn decode_base64url(segment: &str) -> Result<Vec<u8>, ClaimsError> {
    let mut normalized: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    match normalized.len() % 4 {
        1 => return Err(ClaimsError::InvalidLength(normalized.len())),
        2 => normalized.push_str("=="),
        3 => normalized.push('='),
        _ => {}
    }

    Ok(PAYLOAD_ENGINE.decode(normalized)?)
}

/// Decode the payload segment of `header.payload.signature` into [`Claims`].
///
/// Keys differing only by case collapse into one entry; the last in document order wins.
pub fn decode_payload(token: &str) -> Result<Claims, ClaimsError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() < 2 {
        return Err(ClaimsError::Format { segments: segments.len() });
    }

    let bytes = decode_base64url(segments[1])?;
    let text = String::from_utf8(bytes)?;
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)?;

    let entries = object
        .into_iter()
        .map(|(name, value)| (name.to_lowercase(), render_claim(value)))
        .collect();

    Ok(Claims { entries })
}

fn render_claim(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.to_string(),
        },
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
