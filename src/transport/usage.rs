use serde::{Deserialize, Serialize};

use super::lenient::lenient;
use super::{TransportError, is_empty_metadata};
use crate::domain::{Metadata, TrackUsage, TrackUsageResponse};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackUsageJsonRequest<'a> {
    customer_id: &'a str,
    usage_type: &'a str,
    quantity: f64,
    idempotency_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    units: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty_metadata")]
    metadata: &'a Metadata,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackUsageJsonResponse {
    #[serde(default, deserialize_with = "lenient")]
    success: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    usage_event_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    customer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    usage_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    is_internal: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    message: Option<String>,
}

/// Encode `POST /usage/internal`; `idempotency_key` is the caller's key or the derived one.
pub fn encode_track_usage_json(
    request: &TrackUsage,
    idempotency_key: &str,
) -> Result<String, TransportError> {
    let body = TrackUsageJsonRequest {
        customer_id: &request.customer_id,
        usage_type: &request.meter,
        quantity: request.quantity,
        idempotency_key,
        units: request.units.as_deref(),
        description: request.description.as_deref(),
        metadata: &request.metadata,
    };
    Ok(serde_json::to_string(&body)?)
}

/// Decode the response; a missing `quantity` falls back to the submitted one.
pub fn decode_track_usage_json_response(
    request: &TrackUsage,
    json: &str,
) -> Result<TrackUsageResponse, TransportError> {
    let parsed: TrackUsageJsonResponse = serde_json::from_str(json)?;
    Ok(TrackUsageResponse {
        success: parsed.success.unwrap_or(true),
        usage_event_id: parsed.usage_event_id,
        customer_id: parsed.customer_id,
        usage_type: parsed.usage_type,
        quantity: parsed.quantity.unwrap_or(request.quantity),
        is_internal: parsed.is_internal.unwrap_or(false),
        message: parsed.message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_maps_meter_to_usage_type() {
        let mut request = TrackUsage::new("cus_1", "tokens", 1500.0);
        request.units = Some("tokens".to_owned());

        let value: serde_json::Value =
            serde_json::from_str(&encode_track_usage_json(&request, "track_abc").unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "customerId": "cus_1",
                "usageType": "tokens",
                "quantity": 1500.0,
                "idempotencyKey": "track_abc",
                "units": "tokens"
            })
        );
    }

    #[test]
    fn encode_keeps_zero_and_negative_quantities() {
        let request = TrackUsage::new("cus_1", "tokens", 0.0);
        let json = encode_track_usage_json(&request, "k").unwrap();
        assert!(json.contains(r#""quantity":0.0"#), "{json}");

        let request = TrackUsage::new("cus_1", "tokens", -5.0);
        let json = encode_track_usage_json(&request, "k").unwrap();
        assert!(json.contains(r#""quantity":-5.0"#), "{json}");
    }

    #[test]
    fn decode_maps_payload_and_defaults() {
        let request = TrackUsage::new("cus_1", "tokens", 1500.0);
        let json = r#"
        {
          "success": true,
          "usageEventId": "use_1",
          "customerId": "cus_1",
          "usageType": "tokens",
          "quantity": 1500,
          "isInternal": true,
          "message": "recorded"
        }
        "#;

        let parsed = decode_track_usage_json_response(&request, json).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.usage_event_id.as_deref(), Some("use_1"));
        assert_eq!(parsed.quantity, 1500.0);
        assert!(parsed.is_internal);
        assert_eq!(parsed.message.as_deref(), Some("recorded"));

        let parsed = decode_track_usage_json_response(&request, r#"{"success": true}"#).unwrap();
        assert_eq!(parsed.quantity, 1500.0);
        assert_eq!(parsed.usage_event_id, None);
    }
}
