use super::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub message: String,
    pub code: Option<String>,
}

fn string_field(body: &serde_json::Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|it| !it.is_empty())
        .map(str::to_owned)
}

/// Extract the human message and machine code from a non-2xx response body.
///
/// The message comes from `message`, then `error`, then a generic status line.
/// Any well-formed JSON is accepted; only malformed bodies are errors.
pub fn decode_error_json_response(
    status: u16,
    json: &str,
) -> Result<ApiErrorBody, TransportError> {
    let body: serde_json::Value = serde_json::from_str(json)?;
    let message = string_field(&body, "message")
        .or_else(|| string_field(&body, "error"))
        .unwrap_or_else(|| format!("Request failed with status {status}"));
    Ok(ApiErrorBody {
        message,
        code: string_field(&body, "code"),
    })
}
