use std::time::Duration;

use serde::Deserialize;

use super::TransportError;
use super::lenient::lenient;
use crate::domain::PingResponse;

const HEALTHY: &str = "healthy";

#[derive(Debug, Clone, Deserialize)]
struct HealthJsonResponse {
    #[serde(default, deserialize_with = "lenient")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    timestamp: Option<f64>,
}

/// Decode `GET /health`. `now_ms` is used unless the server sends a numeric timestamp.
pub fn decode_health_json_response(
    json: &str,
    latency: Duration,
    now_ms: i64,
) -> Result<PingResponse, TransportError> {
    let parsed: HealthJsonResponse = serde_json::from_str(json)?;
    let status = parsed
        .status
        .filter(|it| !it.is_empty())
        .unwrap_or_else(|| HEALTHY.to_owned());
    Ok(PingResponse {
        ok: status == HEALTHY,
        status,
        latency,
        timestamp: parsed.timestamp.map_or(now_ms, |ts| ts as i64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_status_defaults_to_healthy() {
        let ping = decode_health_json_response("{}", Duration::from_millis(5), 42).unwrap();
        assert!(ping.ok);
        assert_eq!(ping.status, "healthy");
        assert_eq!(ping.timestamp, 42);
        assert_eq!(ping.latency, Duration::from_millis(5));
    }

    #[test]
    fn only_healthy_status_is_ok() {
        let json = r#"{"status": "degraded", "timestamp": 1700000000000}"#;
        let ping = decode_health_json_response(json, Duration::ZERO, 0).unwrap();
        assert!(!ping.ok);
        assert_eq!(ping.status, "degraded");
        assert_eq!(ping.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn non_numeric_timestamp_uses_local_clock() {
        let json = r#"{"status": "healthy", "timestamp": "2024-01-01T00:00:00.000Z"}"#;
        let ping = decode_health_json_response(json, Duration::ZERO, 42).unwrap();
        assert!(ping.ok);
        assert_eq!(ping.timestamp, 42);

        let ping = decode_health_json_response(r#"{"status": 1}"#, Duration::ZERO, 7).unwrap();
        assert!(ping.ok);
        assert_eq!(ping.status, "healthy");
        assert_eq!(ping.timestamp, 7);
    }
}
