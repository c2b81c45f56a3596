use serde::{Deserialize, Serialize};

use super::TransportError;
use super::lenient::{lenient, lenient_list};
use crate::domain::Workflow;

/// Product surface sent for workflows created on the fly.
pub const DEFAULT_PRODUCT_SURFACE: &str = "CUSTOM";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateWorkflowJsonRequest<'a> {
    name: &'a str,
    slug: &'a str,
    product_surface: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct WorkflowJson {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    slug: Option<String>,
}

impl From<WorkflowJson> for Workflow {
    fn from(value: WorkflowJson) -> Self {
        Self {
            id: value.id.unwrap_or_default(),
            name: value.name.unwrap_or_default(),
            slug: value.slug,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct WorkflowListJsonResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    data: Vec<WorkflowJson>,
}

pub fn encode_create_workflow_json(
    name: &str,
    slug: &str,
    product_surface: &str,
) -> Result<String, TransportError> {
    let body = CreateWorkflowJsonRequest {
        name,
        slug,
        product_surface,
    };
    Ok(serde_json::to_string(&body)?)
}

pub fn decode_workflow_json_response(json: &str) -> Result<Workflow, TransportError> {
    let parsed: WorkflowJson = serde_json::from_str(json)?;
    Ok(parsed.into())
}

pub fn decode_workflow_list_json_response(json: &str) -> Result<Vec<Workflow>, TransportError> {
    let parsed: WorkflowListJsonResponse = serde_json::from_str(json)?;
    Ok(parsed.data.into_iter().map(Workflow::from).collect())
}
