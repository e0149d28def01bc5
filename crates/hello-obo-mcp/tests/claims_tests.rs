//! Tests for unverified JWT payload decoding.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

use hello_obo_mcp::claims::{TokenClaims, decode_base64url, decode_payload};
use hello_obo_mcp::error::ClaimsError;

fn jwt(payload: &str) -> String {
    format!("eyJhbGciOiJub25lIn0.{}.sig", URL_SAFE_NO_PAD.encode(payload))
}

// =============================================================================
// Payload decoding
// =============================================================================

#[test]
fn test_full_claim_set() {
    let token = jwt(
        r#"{"aud":"api://hello","name":"Ada Lovelace","preferred_username":"ada@contoso.com",
            "oid":"abc","tid":"tenant-1","scp":"User.Read","exp":1700000000}"#,
    );

    let claims = TokenClaims::from_claims(&decode_payload(&token).unwrap());

    assert_eq!(
        claims,
        TokenClaims {
            name: Some("Ada Lovelace".into()),
            preferred_username: Some("ada@contoso.com".into()),
            oid: Some("abc".into()),
            tid: Some("tenant-1".into()),
            scopes_or_roles: Some("User.Read".into()),
        }
    );
}

#[test]
fn test_absent_scopes_and_roles() {
    let token = jwt(r#"{"name":"Ada","oid":"abc"}"#);
    let claims = TokenClaims::from_claims(&decode_payload(&token).unwrap());

    assert_eq!(claims.name.as_deref(), Some("Ada"));
    assert!(claims.scopes_or_roles.is_none());
    assert!(claims.tid.is_none());
}

#[test]
fn test_claim_names_are_case_insensitive() {
    let token = jwt(r#"{"Name":"Ada","OID":"abc","Scp":"Files.Read"}"#);
    let decoded = decode_payload(&token).unwrap();

    assert_eq!(decoded.get("name"), Some("Ada"));
    assert_eq!(decoded.get("NAME"), Some("Ada"));
    assert_eq!(decoded.get("oid"), Some("abc"));

    let claims = TokenClaims::from_claims(&decoded);
    assert_eq!(claims.scopes_or_roles.as_deref(), Some("Files.Read"));
}

#[test]
fn test_non_string_claims_render_as_text() {
    let token = jwt(r#"{"exp":1700000000,"ver":2.0,"mfa":true,"amr":["pwd","mfa"]}"#);
    let decoded = decode_payload(&token).unwrap();

    assert_eq!(decoded.get("exp"), Some("1700000000"));
    assert_eq!(decoded.get("ver"), Some("2.0"));
    assert_eq!(decoded.get("mfa"), Some("true"));
    assert_eq!(decoded.get("amr"), Some(r#"["pwd","mfa"]"#));
}

#[test]
fn test_empty_object_has_no_claims() {
    let decoded = decode_payload(&jwt("{}")).unwrap();
    assert!(decoded.is_empty());
    assert_eq!(TokenClaims::from_claims(&decoded), TokenClaims::default());
}

#[test]
fn test_signature_is_ignored() {
    let payload = URL_SAFE_NO_PAD.encode(r#"{"oid":"abc"}"#);
    for token in [format!("h.{payload}"), format!("h.{payload}.x"), format!("h.{payload}.x.y.z")] {
        assert_eq!(decode_payload(&token).unwrap().get("oid"), Some("abc"));
    }
}

// =============================================================================
// Malformed input
// =============================================================================

#[test]
fn test_format_errors() {
    assert!(matches!(decode_payload(""), Err(ClaimsError::Format { segments: 1 })));
    assert!(matches!(decode_payload("opaque"), Err(ClaimsError::Format { segments: 1 })));
}

#[test]
fn test_payload_not_base64() {
    assert!(matches!(decode_payload("h.!!!!.s"), Err(ClaimsError::Base64(_))));
}

#[test]
fn test_payload_not_json_object() {
    let array = format!("h.{}.s", URL_SAFE_NO_PAD.encode("[1,2,3]"));
    assert!(matches!(decode_payload(&array), Err(ClaimsError::Json(_))));

    let text = format!("h.{}.s", URL_SAFE_NO_PAD.encode("hello"));
    assert!(matches!(decode_payload(&text), Err(ClaimsError::Json(_))));
}

#[test]
fn test_payload_not_utf8() {
    let token = format!("h.{}.s", URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0xfd]));
    assert!(matches!(decode_payload(&token), Err(ClaimsError::Utf8(_))));
}

#[test]
fn test_empty_payload_segment() {
    // Decodes to zero bytes, which is not a JSON object
    assert!(matches!(decode_payload("h..s"), Err(ClaimsError::Json(_))));
}

// =============================================================================
// base64url padding
// =============================================================================

#[test]
fn test_padding_restored_for_each_remainder() {
    // "a" -> "YQ" (len % 4 == 2), "ab" -> "YWI" (len % 4 == 3), "abc" -> "YWJj" (len % 4 == 0)
    assert_eq!(decode_base64url("YQ").unwrap(), b"a");
    assert_eq!(decode_base64url("YWI").unwrap(), b"ab");
    assert_eq!(decode_base64url("YWJj").unwrap(), b"abc");
}

#[test]
fn test_dangling_character_rejected() {
    assert!(matches!(decode_base64url("YWJjZ"), Err(ClaimsError::InvalidLength(5))));
    assert!(matches!(decode_base64url("A"), Err(ClaimsError::InvalidLength(1))));
}

#[test]
fn test_url_safe_alphabet() {
    let bytes = [0xfb, 0xff, 0xbf];
    let url_safe = URL_SAFE_NO_PAD.encode(bytes);
    assert_eq!(url_safe, "-_-_");
    assert_eq!(STANDARD.encode(bytes), "+/+/");

    assert_eq!(decode_base64url(&url_safe).unwrap(), bytes);
    // Standard alphabet input is accepted as-is
    assert_eq!(decode_base64url("+/+/").unwrap(), bytes);
}

#[test]
fn test_non_canonical_trailing_bits_accepted() {
    // "YR" carries non-zero trailing bits; the canonical form is "YQ"
    assert_eq!(decode_base64url("YR").unwrap(), b"a");
}
