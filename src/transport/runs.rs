use serde::{Deserialize, Serialize};

use super::lenient::{lenient, lenient_decimal};
use super::number::{TransportCount, TransportDecimal};
use super::{TransportError, is_empty_metadata};
use crate::domain::{EndRun, EndRunResponse, Metadata, Run, RunStatus, StartRun};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartRunJsonRequest<'a> {
    customer_id: &'a str,
    workflow_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_run_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_run_id: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty_metadata")]
    metadata: &'a Metadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EndRunJsonRequest<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty_metadata")]
    metadata: &'a Metadata,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunJsonResponse {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    customer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    workflow_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    workflow_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    correlation_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndRunJsonResponse {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    ended_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    duration_ms: Option<TransportCount>,
    #[serde(default, deserialize_with = "lenient")]
    event_count: Option<TransportCount>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    total_cost_units: Option<TransportDecimal>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|it| !it.is_empty())
}

pub fn encode_start_run_json(request: &StartRun) -> Result<String, TransportError> {
    let body = StartRunJsonRequest {
        customer_id: &request.customer_id,
        workflow_id: &request.workflow_id,
        external_run_id: non_empty(request.external_run_id.as_ref()),
        correlation_id: non_empty(request.correlation_id.as_ref()),
        parent_run_id: non_empty(request.parent_run_id.as_ref()),
        metadata: &request.metadata,
    };
    Ok(serde_json::to_string(&body)?)
}

pub fn encode_end_run_json(request: &EndRun) -> Result<String, TransportError> {
    let body = EndRunJsonRequest {
        status: request.status.as_str(),
        error_message: non_empty(request.error_message.as_ref()),
        error_code: non_empty(request.error_code.as_ref()),
        metadata: &request.metadata,
    };
    Ok(serde_json::to_string(&body)?)
}

pub fn decode_run_json_response(json: &str) -> Result<Run, TransportError> {
    let parsed: RunJsonResponse = serde_json::from_str(json)?;
    Ok(Run {
        id: parsed.id.unwrap_or_default(),
        customer_id: parsed.customer_id,
        workflow_id: parsed.workflow_id,
        workflow_name: parsed.workflow_name,
        status: parsed
            .status
            .as_deref()
            .map_or(RunStatus::Pending, RunStatus::from_wire),
        correlation_id: parsed.correlation_id,
        created_at: parsed.created_at,
    })
}

/// Decode `PATCH /runs/{id}`. A zero or missing duration is reported as `None`.
pub fn decode_end_run_json_response(json: &str) -> Result<EndRunResponse, TransportError> {
    let parsed: EndRunJsonResponse = serde_json::from_str(json)?;
    Ok(EndRunResponse {
        id: parsed.id.unwrap_or_default(),
        status: parsed
            .status
            .as_deref()
            .map_or(RunStatus::Pending, RunStatus::from_wire),
        ended_at: parsed.ended_at,
        duration_ms: parsed
            .duration_ms
            .and_then(TransportCount::into_u64)
            .filter(|ms| *ms > 0),
        event_count: parsed
            .event_count
            .and_then(TransportCount::into_u64)
            .unwrap_or(0),
        total_cost_units: parsed.total_cost_units.map(TransportDecimal::into_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_start_run_includes_optional_ids_only_when_set() {
        let request = StartRun::new("cus_1", "wf_1");
        assert_eq!(
            encode_start_run_json(&request).unwrap(),
            r#"{"customerId":"cus_1","workflowId":"wf_1"}"#
        );

        let mut request = StartRun::new("cus_1", "wf_1");
        request.external_run_id = Some("job-7".to_owned());
        request.correlation_id = Some(String::new());
        request.parent_run_id = Some("run_0".to_owned());
        let value: serde_json::Value =
            serde_json::from_str(&encode_start_run_json(&request).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "customerId": "cus_1",
                "workflowId": "wf_1",
                "externalRunId": "job-7",
                "parentRunId": "run_0"
            })
        );
    }

    #[test]
    fn encode_end_run_uses_wire_status() {
        let mut request = EndRun::new(RunStatus::Failed);
        request.error_message = Some("out of memory".to_owned());
        request.error_code = Some("OOM".to_owned());
        let value: serde_json::Value =
            serde_json::from_str(&encode_end_run_json(&request).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "status": "FAILED",
                "errorMessage": "out of memory",
                "errorCode": "OOM"
            })
        );
    }

    #[test]
    fn decode_run_echoes_server_fields() {
        let json = r#"
        {
          "id": "run_1",
          "customerId": "cus_1",
          "workflowId": "wf_1",
          "workflowName": "Training Run",
          "status": "RUNNING",
          "correlationId": "trace-1",
          "createdAt": "2024-01-01T00:00:00Z"
        }
        "#;

        let run = decode_run_json_response(json).unwrap();
        assert_eq!(run.id, "run_1");
        assert_eq!(run.customer_id.as_deref(), Some("cus_1"));
        assert_eq!(run.workflow_id.as_deref(), Some("wf_1"));
        assert_eq!(run.workflow_name.as_deref(), Some("Training Run"));
        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(run.correlation_id.as_deref(), Some("trace-1"));
    }

    #[test]
    fn decode_end_run_maps_duration_and_cost() {
        let json = r#"
        {
          "id": "run_1",
          "status": "COMPLETED",
          "endedAt": "2024-01-01T00:00:01Z",
          "durationMs": 1234,
          "eventCount": 3,
          "totalCostUnits": 0.75
        }
        "#;

        let ended = decode_end_run_json_response(json).unwrap();
        assert_eq!(ended.status, RunStatus::Completed);
        assert_eq!(ended.duration_ms, Some(1234));
        assert_eq!(ended.event_count, 3);
        assert_eq!(ended.total_cost_units.as_deref(), Some("0.75"));

        let ended = decode_end_run_json_response(r#"{"id": "run_1", "durationMs": 0}"#).unwrap();
        assert_eq!(ended.duration_ms, None);
        assert_eq!(ended.status, RunStatus::Pending);
    }
}
