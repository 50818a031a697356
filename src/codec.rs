//! URL hand-off encoding
//!
//! Options travel as percent-encoded JSON on both legs of the round trip:
//!
//! - watch → webview: `<config-page-url>?<encoded-json>`
//! - webview → watch: `<close-scheme>://close#<encoded-json>`
//!
//! Encoding leaves only the unreserved set (`A-Z a-z 0-9 - _ . ~`) intact,
//! so every payload produced here decodes with `decodeURIComponent` and
//! every `encodeURIComponent` payload decodes here.

use crate::error::{ConfigError, Result};
use crate::types::Options;

/// Serialize options to JSON and percent-encode the result
pub fn encode_options(options: &Options) -> Result<String> {
    let json = serde_json::to_string(options)?;
    Ok(urlencoding::encode(&json).into_owned())
}

/// Percent-decode a payload and parse it as flat options
pub fn decode_options(encoded: &str) -> Result<Options> {
    check_escapes(encoded)?;
    let json = urlencoding::decode(encoded)
        .map_err(|e| ConfigError::MalformedPayload(format!("invalid percent-encoding: {}", e)))?;

    let value: serde_json::Value = serde_json::from_str(&json)
        .map_err(|e| ConfigError::MalformedPayload(format!("invalid JSON: {}", e)))?;

    Options::from_json_value(value)
}

/// Reject any `%` not followed by two hex digits
///
/// `urlencoding::decode` passes such sequences through unchanged, while
/// `decodeURIComponent` throws on them.
fn check_escapes(encoded: &str) -> Result<()> {
    let bytes = encoded.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(ConfigError::MalformedPayload(format!(
                    "invalid percent-encoding at offset {}",
                    i
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// Build the URL that opens the configuration page with `options` attached
pub fn config_page_url(base: &str, options: &Options) -> Result<String> {
    Ok(format!("{}?{}", base, encode_options(options)?))
}

/// The raw options payload of a page URL, if any
///
/// Everything after the first `?`, cut at a `#` fragment. An empty query
/// counts as missing.
pub fn query_payload(url: &str) -> Option<&str> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();
    if query.is_empty() {
        None
    } else {
        Some(query)
    }
}

/// Build the sentinel URL that tells the host the webview is done
pub fn close_url(scheme: &str, options: &Options) -> Result<String> {
    Ok(format!("{}://close#{}", scheme, encode_options(options)?))
}

/// Extract the encoded payload from a close URL using `scheme`
pub fn close_payload<'a>(url: &'a str, scheme: &str) -> Result<&'a str> {
    url.strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix("://close#"))
        .ok_or_else(|| {
            ConfigError::MalformedPayload(format!("not a {}://close# URL: {}", scheme, url))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionValue;

    #[test]
    fn test_encode_defaults() {
        let encoded = encode_options(&Options::with_defaults()).unwrap();
        assert_eq!(encoded, "%7B%22reversed%22%3A0%7D");
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode_options(&Options::new()).unwrap(), "%7B%7D");
    }

    #[test]
    fn test_roundtrip_mixed_values() {
        let opts = Options::new()
            .with("reversed", 1)
            .with("label", "Moon & Tiles / ünïcode?#")
            .with("ratio", 0.25)
            .with("enabled", true)
            .with("empty", OptionValue::Null);

        let decoded = decode_options(&encode_options(&opts).unwrap()).unwrap();
        assert_eq!(decoded, opts);
    }

    #[test]
    fn test_decode_browser_encoding() {
        // encodeURIComponent(JSON.stringify({reversed: 1, note: "it's (ok)"}))
        let decoded =
            decode_options("%7B%22reversed%22%3A1%2C%22note%22%3A%22it's%20(ok)%22%7D").unwrap();
        assert_eq!(decoded.reversed(), 1);
        assert_eq!(decoded.get("note"), Some(&OptionValue::from("it's (ok)")));
    }

    #[test]
    fn test_decode_unencoded_json() {
        let decoded = decode_options(r#"{"reversed":1}"#).unwrap();
        assert_eq!(decoded.reversed(), 1);
    }

    #[test]
    fn test_decode_not_json() {
        let err = decode_options("not%20json").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedPayload(_)));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = decode_options("%FF%FE").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedPayload(_)));
    }

    #[test]
    fn test_decode_bad_escapes() {
        for bad in [
            "%7B%22a%22%3A%22%ZZ%22%7D",
            "%7B%22a%22%3A%22%G1%22%7D",
            "%7B%22a%22%3A1%7D%4",
            "%7B%7D%",
        ] {
            let err = decode_options(bad).unwrap_err();
            assert!(
                matches!(err, ConfigError::MalformedPayload(_)),
                "{:?} accepted",
                bad
            );
        }
    }

    #[test]
    fn test_decode_lowercase_hex_escapes() {
        let decoded = decode_options("%7b%22reversed%22%3a1%7d").unwrap();
        assert_eq!(decoded.reversed(), 1);
    }

    #[test]
    fn test_decode_nested_rejected() {
        let err = decode_options("%7B%22a%22%3A%7B%7D%7D").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedPayload(_)));
    }

    #[test]
    fn test_config_page_url() {
        let url = config_page_url("http://akrs.github.io/moontiles/", &Options::with_defaults())
            .unwrap();
        assert_eq!(
            url,
            "http://akrs.github.io/moontiles/?%7B%22reversed%22%3A0%7D"
        );
        assert_eq!(query_payload(&url), Some("%7B%22reversed%22%3A0%7D"));
    }

    #[test]
    fn test_query_payload_missing() {
        assert_eq!(query_payload("http://example.com/"), None);
        assert_eq!(query_payload("http://example.com/?"), None);
        assert_eq!(query_payload("http://example.com/?#frag"), None);
    }

    #[test]
    fn test_query_payload_strips_fragment() {
        assert_eq!(query_payload("http://x/?abc#top"), Some("abc"));
    }

    #[test]
    fn test_close_url_and_payload() {
        let opts = Options::new().with("reversed", 1);
        let url = close_url("pebblejs", &opts).unwrap();
        assert_eq!(url, "pebblejs://close#%7B%22reversed%22%3A1%7D");

        let payload = close_payload(&url, "pebblejs").unwrap();
        assert_eq!(decode_options(payload).unwrap(), opts);
    }

    #[test]
    fn test_close_payload_wrong_scheme() {
        let err = close_payload("http://close#%7B%7D", "pebblejs").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedPayload(_)));
        assert!(close_payload("pebblejs://open#%7B%7D", "pebblejs").is_err());
    }
}
