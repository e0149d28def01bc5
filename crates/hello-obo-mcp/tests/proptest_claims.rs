//! Property-based tests for claim decoding and greeting subject selection.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use proptest::prelude::*;

use hello_obo_mcp::claims::{decode_base64url, decode_payload};
use hello_obo_mcp::error::ClaimsError;
use hello_obo_mcp::models::{DEFAULT_SUBJECT, greeting_subject};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any unpadded base64url segment decodes back to its bytes.
    #[test]
    fn unpadded_segments_decode(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let segment = URL_SAFE_NO_PAD.encode(&bytes);
        prop_assert_eq!(decode_base64url(&segment).unwrap(), bytes);
    }

    /// A segment one character past a multiple of four is never valid.
    #[test]
    fn dangling_character_always_rejected(segment in "([A-Za-z0-9_-]{4}){0,16}[A-Za-z0-9_-]") {
        let is_invalid_length = matches!(decode_base64url(&segment), Err(ClaimsError::InvalidLength(_)));
        prop_assert!(is_invalid_length);
    }

    /// Tokens without a dot are rejected before any decoding.
    #[test]
    fn dotless_tokens_are_format_errors(token in "[^.]{0,64}") {
        let is_format = matches!(decode_payload(&token), Err(ClaimsError::Format { segments: 1 }));
        prop_assert!(is_format);
    }

    /// Decoding never panics on arbitrary input.
    #[test]
    fn decode_payload_never_panics(token in ".{0,128}") {
        let _ = decode_payload(&token);
    }

    /// String claims survive decoding and are found under any casing.
    #[test]
    fn string_claims_case_insensitive(key in "[a-z][a-z_]{0,15}", value in "[ -~]{0,32}") {
        let mut object = serde_json::Map::new();
        object.insert(key.clone(), serde_json::Value::String(value.clone()));
        let payload = serde_json::Value::Object(object).to_string();
        let token = format!("h.{}.s", URL_SAFE_NO_PAD.encode(payload));
        let claims = decode_payload(&token).unwrap();

        prop_assert_eq!(claims.get(&key), Some(value.as_str()));
        prop_assert_eq!(claims.get(&key.to_uppercase()), Some(value.as_str()));
    }

    /// A non-blank provided name always wins.
    #[test]
    fn provided_name_wins(provided in "[A-Za-z]{1,20}", resolved in proptest::option::of("[A-Za-z ]{0,20}")) {
        prop_assert_eq!(greeting_subject(Some(provided.as_str()), resolved.as_deref()), provided.as_str());
    }

    /// Blank inputs never become the subject.
    #[test]
    fn blank_inputs_fall_back(blank in "[ \t]{0,5}") {
        prop_assert_eq!(greeting_subject(Some(blank.as_str()), Some(blank.as_str())), DEFAULT_SUBJECT);
        prop_assert_eq!(greeting_subject(None, Some(blank.as_str())), DEFAULT_SUBJECT);
    }
}
