//! The reusable script-payload extractor.
//!
//! All three catalog levels embed their data the same way: one JSON object
//! inside an IIFE-style script, starting at a known key prefix (`"s1":` on
//! the index, `"p<N>":` on category tabs) and terminated by a non-JSON `)`
//! suffix. This module implements that pattern once; the per-level parsers
//! never re-derive it.

use exn::OptionExt;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::instrument;

use crate::consts;
use crate::error::{ErrorKind, Result};

/// Locates the JSON payload span inside a script body: from the first
/// `{"s<N>":` / `{"p<N>":` key prefix up to the last `}` before the trailing
/// `)`, never crossing a statement boundary (`;`).
pub(crate) fn payload_span(js: &str) -> Option<&str> {
    let start = consts::PAYLOAD_KEY_REGEX.find(js)?.start();
    let segment = &js[start..];
    let segment = match segment.find(';') {
        Some(end) => &segment[..end],
        None => segment,
    };
    let close = segment.rfind("})")?;
    Some(&segment[..=close])
}

/// Extracts every guarded payload from the scripts matched by `selector`,
/// in document order, as `(key, value)` pairs.
///
/// Scripts whose content does not begin with the payload guard marker are
/// ignored; they are unrelated page machinery, not errors.
///
/// # Errors
///
/// - [`ErrorKind::MissingScript`] if no guarded script matches the selector
/// - [`ErrorKind::PayloadNotFound`] if a guarded script has no payload span
/// - [`ErrorKind::MalformedPayload`] if a span is not parseable JSON or is
///   not a single-key object
#[instrument(skip_all)]
pub fn script_payloads(document: &Html, selector: &Selector) -> Result<Vec<(String, Value)>> {
    let mut payloads = Vec::new();
    for script in document.select(selector) {
        let js = script.text().collect::<String>();
        let js = js.trim_start();
        if !js.starts_with(consts::PAYLOAD_GUARD) {
            continue;
        }
        let span = payload_span(js).ok_or_raise(|| ErrorKind::PayloadNotFound)?;
        let value: Value =
            serde_json::from_str(span).map_err(|e| ErrorKind::MalformedPayload(e.to_string()))?;
        let Value::Object(mut object) = value else {
            exn::bail!(ErrorKind::MalformedPayload("payload is not a JSON object".to_string()));
        };
        let Some(key) = object.keys().next().cloned() else {
            exn::bail!(ErrorKind::MalformedPayload("payload object is empty".to_string()));
        };
        let value = object.remove(&key).unwrap_or(Value::Null);
        payloads.push((key, value));
    }
    if payloads.is_empty() {
        exn::bail!(ErrorKind::MissingScript);
    }
    Ok(payloads)
}

/// Extracts the single payload stored under `key`.
///
/// # Errors
///
/// Everything [`script_payloads`] raises, plus [`ErrorKind::MissingKey`] when
/// no guarded script carries the requested key.
pub fn script_payload(document: &Html, selector: &Selector, key: &'static str) -> Result<Value> {
    for (found, value) in script_payloads(document, selector)? {
        if found == key {
            return Ok(value);
        }
    }
    exn::bail!(ErrorKind::MissingKey(key));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_span_stops_at_trailing_paren() {
        let js = r#"catpagejs({"s1":{"B":["Bach"]}})"#;
        assert_eq!(payload_span(js), Some(r#"{"s1":{"B":["Bach"]}}"#));
    }

    #[test]
    fn test_payload_span_takes_last_close_before_paren() {
        // Nested objects: the span must run to the outermost close.
        let js = r#"catpagejs({"p1":{"A":["x|1"],"B":["y"]}});other();"#;
        assert_eq!(payload_span(js), Some(r#"{"p1":{"A":["x|1"],"B":["y"]}}"#));
    }

    #[test]
    fn test_payload_span_never_crosses_statement_boundary() {
        let js = r#"catpagejs({"p2":["a"]}); var x = ({"p9":["b"]})"#;
        assert_eq!(payload_span(js), Some(r#"{"p2":["a"]}"#));
    }

    #[test]
    fn test_payload_span_missing() {
        assert_eq!(payload_span("var nothing = 1;"), None);
        assert_eq!(payload_span(r#"catpagejs({"q1":[]})"#), None);
    }

    #[test]
    fn test_script_payloads_ignores_unguarded_scripts() {
        let html = r#"
            <div class="jq-ui-tabs">
                <div><script>setupTabs();</script></div>
                <div><script>catpagejs({"p1":["Work A|2"]})</script></div>
            </div>
        "#;
        let document = Html::parse_document(html);
        let payloads = script_payloads(&document, &consts::WORKS_SCRIPT_SELECTOR).unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].0, "p1");
    }

    #[test]
    fn test_script_payloads_errors_without_any_guarded_script() {
        let document = Html::parse_document(r#"<div class="jq-ui-tabs"><div><script>init();</script></div></div>"#);
        let err = script_payloads(&document, &consts::WORKS_SCRIPT_SELECTOR).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingScript));
    }

    #[test]
    fn test_script_payload_missing_key() {
        let html = r#"<div class="jq-ui-tabs"><div><script>catpagejs({"p1":[]})</script></div></div>"#;
        let document = Html::parse_document(html);
        let err = script_payload(&document, &consts::WORKS_SCRIPT_SELECTOR, "s1").unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingKey("s1")));
    }

    #[test]
    fn test_script_payload_malformed_json() {
        let html = r#"<div class="jq-ui-tabs"><div><script>catpagejs({"p1":[unquoted]})</script></div></div>"#;
        let document = Html::parse_document(html);
        let err = script_payload(&document, &consts::WORKS_SCRIPT_SELECTOR, "p1").unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedPayload(_)));
    }
}
