use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// HTTP status reported for a request that timed out before the server answered.
pub(crate) const TIMEOUT_STATUS: u16 = 408;

/// What to do with a structured response that has no `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingStatusPolicy {
    /// Treat the response as a `ServerError`.
    #[default]
    Error,
    /// Treat the response as a `Success`.
    Success,
}

/// Outcome of one save attempt.
///
/// Every expected outcome is a variant here; transport failures are reported
/// separately as [`TransportError`](super::TransportError).
#[derive(Debug, Clone, PartialEq)]
pub enum SaveResult {
    /// The server accepted the data.
    Success {
        redirect_url: Option<String>,
        payload: Map<String, Value>,
    },
    /// The server rejected one or more fields.
    ValidationError {
        field_errors: BTreeMap<String, Vec<String>>,
    },
    /// The server failed without field detail.
    ServerError { http_status: u16, message: String },
    /// The server rendered a full page instead of a status payload.
    NonStructuredResponse,
    /// The form's own constraints failed; nothing was sent.
    SkippedClientInvalid,
    /// Another save for the same form was already in flight; nothing was sent.
    SkippedConcurrent,
}

impl SaveResult {
    /// Returns `true` for [`SaveResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns `true` if no request was issued.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::SkippedClientInvalid | Self::SkippedConcurrent)
    }

    pub(crate) fn timed_out() -> Self {
        Self::ServerError {
            http_status: TIMEOUT_STATUS,
            message: "the server did not answer in time".to_string(),
        }
    }
}

/// The parts of an HTTP response that classification looks at. The body has
/// already been read, exactly once.
#[derive(Debug, Clone, Copy)]
pub struct RawResponse<'a> {
    pub status: u16,
    pub content_type: Option<&'a str>,
    pub body: &'a str,
}

/// Classifies a raw response into a [`SaveResult`].
///
/// - An HTML content type, or a body that is not a JSON object, is a
///   `NonStructuredResponse`, except on 5xx where it becomes a `ServerError`.
/// - `status: "error"` with field detail is a `ValidationError`; without it
///   a `ServerError` carrying the server's message.
/// - `status: "success"` is a `Success`, unless the HTTP status signals
///   failure, in which case the structured message is surfaced as a
///   `ServerError`.
/// - A missing `status` follows `policy`.
pub fn classify_response(raw: &RawResponse<'_>, policy: MissingStatusPolicy) -> SaveResult {
    let http_ok = (200..400).contains(&raw.status);

    let Some(map) = parse_structured(raw) else {
        if raw.status >= 500 {
            return SaveResult::ServerError {
                http_status: raw.status,
                message: format!("HTTP {}", raw.status),
            };
        }
        return SaveResult::NonStructuredResponse;
    };

    match map.get("status") {
        Some(Value::String(s)) if s == "error" => {
            let field_errors = map.get("errors").map(field_errors).unwrap_or_default();
            if field_errors.is_empty() {
                SaveResult::ServerError {
                    http_status: raw.status,
                    message: message_of(&map)
                        .unwrap_or_else(|| "the server reported an error".to_string()),
                }
            } else {
                SaveResult::ValidationError { field_errors }
            }
        }
        Some(Value::String(s)) if s == "success" => success_or_failure(raw.status, http_ok, map),
        None => match policy {
            MissingStatusPolicy::Success => success_or_failure(raw.status, http_ok, map),
            MissingStatusPolicy::Error => SaveResult::ServerError {
                http_status: raw.status,
                message: message_of(&map)
                    .unwrap_or_else(|| "response is missing a status field".to_string()),
            },
        },
        Some(other) => SaveResult::ServerError {
            http_status: raw.status,
            message: format!("unexpected status {other}"),
        },
    }
}

fn parse_structured(raw: &RawResponse<'_>) -> Option<Map<String, Value>> {
    if raw
        .content_type
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
    {
        return None;
    }
    match serde_json::from_str::<Value>(raw.body) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn success_or_failure(status: u16, http_ok: bool, map: Map<String, Value>) -> SaveResult {
    if !http_ok {
        return SaveResult::ServerError {
            http_status: status,
            message: message_of(&map).unwrap_or_else(|| format!("HTTP {status}")),
        };
    }
    let redirect_url = map
        .get("redirect_url")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .map(str::to_string);
    SaveResult::Success {
        redirect_url,
        payload: map,
    }
}

fn message_of(map: &Map<String, Value>) -> Option<String> {
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Normalizes an `errors` value into `field -> [message, ...]`.
///
/// Accepts plain strings, arrays of strings, and arrays of
/// `{"message": ...}` objects for each field.
fn field_errors(errors: &Value) -> BTreeMap<String, Vec<String>> {
    let Value::Object(fields) = errors else {
        return BTreeMap::new();
    };
    fields
        .iter()
        .map(|(name, detail)| {
            let messages = match detail {
                Value::Array(items) => items.iter().map(message_text).collect(),
                other => vec![message_text(other)],
            };
            (name.clone(), messages)
        })
        .filter(|(_, messages): &(String, Vec<String>)| !messages.is_empty())
        .collect()
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| value.to_string(), str::to_string),
        other => other.to_string(),
    }
}
