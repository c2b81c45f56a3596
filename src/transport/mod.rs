//! Transport layer: wire-format details (camelCase JSON bodies, lenient decoding).

mod customers;
mod error_body;
mod events;
mod health;
mod lenient;
mod number;
mod runs;
mod usage;
mod workflows;

use crate::domain::Metadata;

pub use customers::{
    decode_balance_json_response, decode_customer_json_response,
    decode_customer_list_json_response, encode_create_customer_json,
};
pub use error_body::{ApiErrorBody, decode_error_json_response};
pub use events::{
    decode_batch_events_json_response, decode_event_json_response, encode_batch_events_json,
    encode_emit_event_json,
};
pub use health::decode_health_json_response;
pub use runs::{
    decode_end_run_json_response, decode_run_json_response, encode_end_run_json,
    encode_start_run_json,
};
pub use usage::{decode_track_usage_json_response, encode_track_usage_json};
pub use workflows::{
    DEFAULT_PRODUCT_SURFACE, decode_workflow_json_response, decode_workflow_list_json_response,
    encode_create_workflow_json,
};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// Signatures follow serde's `skip_serializing_if`, which passes a reference to the field.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

fn is_empty_metadata(metadata: &&Metadata) -> bool {
    metadata.is_empty()
}
