use std::time::Duration;

use crate::domain::value::{CustomerStatus, Metadata, RunStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub external_customer_id: Option<String>,
    pub onchain_address: Option<String>,
    pub status: Option<CustomerStatus>,
    pub is_internal: bool,
    pub metadata: Metadata,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerList {
    pub customers: Vec<Customer>,
    /// Server-reported count.
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub customer_id: String,
    /// USDC balance as sent by the server (decimal string).
    pub balance_usdc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingResponse {
    /// `true` only when the reported status is `"healthy"`.
    pub ok: bool,
    pub status: String,
    pub latency: Duration,
    /// Server timestamp in epoch milliseconds (local clock when absent).
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackUsageResponse {
    pub success: bool,
    pub usage_event_id: Option<String>,
    pub customer_id: Option<String>,
    pub usage_type: Option<String>,
    pub quantity: f64,
    pub is_internal: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub id: String,
    pub customer_id: Option<String>,
    pub workflow_id: Option<String>,
    pub workflow_name: Option<String>,
    pub status: RunStatus,
    pub correlation_id: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndRunResponse {
    pub id: String,
    pub status: RunStatus,
    pub ended_at: Option<String>,
    pub duration_ms: Option<u64>,
    pub event_count: u64,
    pub total_cost_units: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub run_id: Option<String>,
    pub event_type: Option<String>,
    pub quantity: f64,
    pub cost_units: f64,
    /// The server already had an event with this idempotency key.
    pub is_duplicate: bool,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventCounts {
    pub created: u64,
    pub duplicates: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRun {
    pub id: String,
    pub workflow_id: String,
    pub workflow_name: String,
    pub status: RunStatus,
    /// Duration reported by the server when the run ended.
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRunResponse {
    pub run: RecordedRun,
    pub events: EventCounts,
    pub total_cost_units: Option<String>,
    /// One-line summary, e.g. `[OK] Training Run: 3 events recorded (120ms)`.
    pub summary: String,
}
