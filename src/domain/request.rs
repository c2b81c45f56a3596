use crate::domain::validation::ValidationError;
use crate::domain::value::{Metadata, RunStatus, WorkflowRef};

pub const LIST_CUSTOMERS_DEFAULT_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
/// `POST /customers` request.
///
/// Invariant: at least one of the external id or the on-chain address is set.
pub struct CreateCustomer {
    external_customer_id: Option<String>,
    onchain_address: Option<String>,
    metadata: Metadata,
}

impl CreateCustomer {
    pub fn new(
        external_customer_id: Option<String>,
        onchain_address: Option<String>,
    ) -> Result<Self, ValidationError> {
        let external_customer_id = external_customer_id.filter(|it| !it.is_empty());
        let onchain_address = onchain_address.filter(|it| !it.is_empty());
        if external_customer_id.is_none() && onchain_address.is_none() {
            return Err(ValidationError::MissingCustomerIdentity);
        }
        Ok(Self {
            external_customer_id,
            onchain_address,
            metadata: Metadata::new(),
        })
    }

    /// Customer identified by your own user id.
    pub fn with_external_id(
        external_customer_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(Some(external_customer_id.into()), None)
    }

    /// Customer identified by a wallet address.
    pub fn with_onchain_address(
        onchain_address: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(None, Some(onchain_address.into()))
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn external_customer_id(&self) -> Option<&str> {
        self.external_customer_id.as_deref()
    }

    pub fn onchain_address(&self) -> Option<&str> {
        self.onchain_address.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Filters for `GET /customers`.
pub struct ListCustomersOptions {
    /// Page size, 1-100 on the server side.
    pub limit: u32,
    /// Optional status filter (`ACTIVE`, `LOW_BALANCE`, `PAUSED`).
    pub status: Option<String>,
}

impl Default for ListCustomersOptions {
    fn default() -> Self {
        Self {
            limit: LIST_CUSTOMERS_DEFAULT_LIMIT,
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// `POST /usage/internal` request: usage recorded without billing.
pub struct TrackUsage {
    pub customer_id: String,
    /// Usage dimension, e.g. `"tokens"` or `"api_calls"`.
    pub meter: String,
    pub quantity: f64,
    /// Derived from customer, meter and quantity when absent.
    pub idempotency_key: Option<String>,
    pub units: Option<String>,
    pub description: Option<String>,
    pub metadata: Metadata,
}

impl TrackUsage {
    pub fn new(customer_id: impl Into<String>, meter: impl Into<String>, quantity: f64) -> Self {
        Self {
            customer_id: customer_id.into(),
            meter: meter.into(),
            quantity,
            idempotency_key: None,
            units: None,
            description: None,
            metadata: Metadata::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// `POST /runs` request.
pub struct StartRun {
    pub customer_id: String,
    pub workflow_id: String,
    pub external_run_id: Option<String>,
    pub correlation_id: Option<String>,
    pub parent_run_id: Option<String>,
    pub metadata: Metadata,
}

impl StartRun {
    pub fn new(customer_id: impl Into<String>, workflow_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            workflow_id: workflow_id.into(),
            external_run_id: None,
            correlation_id: None,
            parent_run_id: None,
            metadata: Metadata::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// `PATCH /runs/{id}` request.
pub struct EndRun {
    pub status: RunStatus,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
    pub metadata: Metadata,
}

impl EndRun {
    pub fn new(status: RunStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// `POST /run-events` request, and one item of `POST /run-events/batch`.
///
/// Zero `quantity` / `cost_units` are treated as unset and left out of the payload.
pub struct EmitEvent {
    pub run_id: String,
    /// Event type tag, e.g. `"training.epoch"`.
    pub event_type: String,
    pub quantity: f64,
    pub units: Option<String>,
    pub description: Option<String>,
    pub cost_units: f64,
    pub idempotency_key: Option<String>,
    pub metadata: Metadata,
}

impl EmitEvent {
    pub fn new(run_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            event_type: event_type.into(),
            quantity: 0.0,
            units: None,
            description: None,
            cost_units: 0.0,
            idempotency_key: None,
            metadata: Metadata::new(),
        }
    }

    pub fn quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn cost_units(mut self, cost_units: f64) -> Self {
        self.cost_units = cost_units;
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// One event of a [`RecordRun`]; the run id and idempotency key are filled in by the client.
pub struct RecordRunEvent {
    pub event_type: String,
    pub quantity: f64,
    pub units: Option<String>,
    pub description: Option<String>,
    pub cost_units: f64,
    pub metadata: Metadata,
}

impl RecordRunEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Self::default()
        }
    }

    pub fn quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn cost_units(mut self, cost_units: f64) -> Self {
        self.cost_units = cost_units;
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub(crate) fn into_emit_event(self, run_id: &str, idempotency_key: String) -> EmitEvent {
        EmitEvent {
            run_id: run_id.to_owned(),
            event_type: self.event_type,
            quantity: self.quantity,
            units: self.units,
            description: self.description,
            cost_units: self.cost_units,
            idempotency_key: Some(idempotency_key),
            metadata: self.metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Input of [`DripClient::record_run`](crate::DripClient::record_run).
pub struct RecordRun {
    pub customer_id: String,
    /// Workflow slug or `wf_...` id.
    pub workflow: WorkflowRef,
    /// Terminal status the run ends with.
    pub status: RunStatus,
    pub events: Vec<RecordRunEvent>,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
    /// Your own id for the run; also seeds the event idempotency keys.
    pub external_run_id: Option<String>,
    pub correlation_id: Option<String>,
    pub metadata: Metadata,
}

impl RecordRun {
    pub fn new(customer_id: impl Into<String>, workflow: impl Into<WorkflowRef>) -> Self {
        Self {
            customer_id: customer_id.into(),
            workflow: workflow.into(),
            status: RunStatus::Completed,
            events: Vec::new(),
            error_message: None,
            error_code: None,
            external_run_id: None,
            correlation_id: None,
            metadata: Metadata::new(),
        }
    }

    pub fn status(mut self, status: RunStatus) -> Self {
        self.status = status;
        self
    }

    pub fn event(mut self, event: RecordRunEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn external_run_id(mut self, external_run_id: impl Into<String>) -> Self {
        self.external_run_id = Some(external_run_id.into());
        self
    }

    pub fn correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Metadata attached to the run itself.
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn error(mut self, message: impl Into<String>, code: Option<String>) -> Self {
        self.error_message = Some(message.into());
        self.error_code = code;
        self
    }
}
