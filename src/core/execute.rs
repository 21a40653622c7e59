//! Request executor
//!
//! Performs exactly one outbound call per entity and normalizes whatever
//! happens into a [`TransformResult`]. This function never fails: transport
//! errors become a synthetic 500 result and are judged later by the outcome
//! policy like any other status.

use crate::adapters::session::{header_map, Session};
use crate::domain::{is_ok_status, TransformResult};
use regex::Regex;
use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static JSON_MIME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*application/([^;]*\+)?json\s*(;|$)").ok());

/// Whether the headers declare a JSON body
///
/// Looks for a `content-type` or `mime-type` header (any case) whose value is
/// `application/json` or an `application/...+json` media type, optionally
/// followed by parameters.
pub fn is_json_content_type(headers: &BTreeMap<String, String>) -> bool {
    let Some(ref json_mime) = *JSON_MIME else {
        return false;
    };

    headers.iter().any(|(name, value)| {
        (name.eq_ignore_ascii_case("content-type") || name.eq_ignore_ascii_case("mime-type"))
            && json_mime.is_match(value)
    })
}

/// One outbound call
#[derive(Debug, Clone)]
pub struct OutboundRequest<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub headers: &'a BTreeMap<String, String>,
    pub payload: Option<&'a Value>,
    pub is_json: bool,
}

/// Performs the call and classifies its result
pub async fn execute(session: &Session, request: &OutboundRequest<'_>) -> TransformResult {
    let method = match Method::from_bytes(request.method.to_uppercase().as_bytes()) {
        Ok(method) => method,
        Err(e) => {
            return TransformResult::failure(500, format!("Invalid method '{}': {e}", request.method))
        }
    };

    let headers = match header_map(request.headers) {
        Ok(headers) => headers,
        Err(e) => return TransformResult::failure(500, e.to_string()),
    };

    let mut builder = session.request(method.clone(), request.url).headers(headers);

    if method != Method::GET {
        match request.payload {
            None | Some(Value::Null) => {}
            Some(payload) if request.is_json => builder = builder.json(payload),
            Some(Value::Object(fields)) => builder = builder.form(&form_fields(fields)),
            Some(Value::String(raw)) => builder = builder.body(raw.clone()),
            Some(other) => builder = builder.body(other.to_string()),
        }
    }

    let response = match builder.send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(url = %request.url, error = %e, "Outbound call failed");
            return TransformResult::failure(500, e.to_string());
        }
    };

    let status_code = response.status().as_u16();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return TransformResult::failure(500, e.to_string()),
    };

    if is_ok_status(status_code) {
        let return_value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        TransformResult::new(status_code, return_value)
    } else {
        TransformResult::failure(status_code, text)
    }
}

/// Flattens a JSON object into form fields; non-string values are sent as JSON text
fn form_fields(fields: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}
