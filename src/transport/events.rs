use serde::{Deserialize, Serialize};

use super::lenient::lenient;
use super::number::TransportCount;
use super::{TransportError, is_empty_metadata, is_zero};
use crate::domain::{EmitEvent, Event, EventCounts, Metadata};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventJsonRequest<'a> {
    run_id: &'a str,
    event_type: &'a str,
    #[serde(skip_serializing_if = "is_zero")]
    quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    units: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "is_zero")]
    cost_units: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    idempotency_key: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty_metadata")]
    metadata: &'a Metadata,
}

impl<'a> EventJsonRequest<'a> {
    fn new(event: &'a EmitEvent, idempotency_key: Option<&'a str>) -> Self {
        Self {
            run_id: &event.run_id,
            event_type: &event.event_type,
            quantity: event.quantity,
            units: event.units.as_deref().filter(|it| !it.is_empty()),
            description: event.description.as_deref().filter(|it| !it.is_empty()),
            cost_units: event.cost_units,
            idempotency_key,
            metadata: &event.metadata,
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchEventsJsonRequest<'a> {
    events: Vec<EventJsonRequest<'a>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventJsonResponse {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    run_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    event_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    cost_units: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    is_duplicate: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct BatchEventsJsonResponse {
    #[serde(default, deserialize_with = "lenient")]
    created: Option<TransportCount>,
    #[serde(default, deserialize_with = "lenient")]
    duplicates: Option<TransportCount>,
}

/// Encode `POST /run-events`; `idempotency_key` is the caller's key or the derived one.
pub fn encode_emit_event_json(
    event: &EmitEvent,
    idempotency_key: &str,
) -> Result<String, TransportError> {
    Ok(serde_json::to_string(&EventJsonRequest::new(
        event,
        Some(idempotency_key),
    ))?)
}

/// Encode `POST /run-events/batch` with each event's own idempotency key.
pub fn encode_batch_events_json(events: &[EmitEvent]) -> Result<String, TransportError> {
    let body = BatchEventsJsonRequest {
        events: events
            .iter()
            .map(|event| EventJsonRequest::new(event, event.idempotency_key.as_deref()))
            .collect(),
    };
    Ok(serde_json::to_string(&body)?)
}

pub fn decode_event_json_response(json: &str) -> Result<Event, TransportError> {
    let parsed: EventJsonResponse = serde_json::from_str(json)?;
    Ok(Event {
        id: parsed.id.unwrap_or_default(),
        run_id: parsed.run_id,
        event_type: parsed.event_type,
        quantity: parsed.quantity.unwrap_or(0.0),
        cost_units: parsed.cost_units.unwrap_or(0.0),
        is_duplicate: parsed.is_duplicate.unwrap_or(false),
        timestamp: parsed.timestamp,
    })
}

pub fn decode_batch_events_json_response(json: &str) -> Result<EventCounts, TransportError> {
    let parsed: BatchEventsJsonResponse = serde_json::from_str(json)?;
    Ok(EventCounts {
        created: parsed
            .created
            .and_then(TransportCount::into_u64)
            .unwrap_or(0),
        duplicates: parsed
            .duplicates
            .and_then(TransportCount::into_u64)
            .unwrap_or(0),
    })
}
