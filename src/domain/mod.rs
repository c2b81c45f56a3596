//! Domain layer: strong types with validation and invariants (no I/O).

mod idempotency;
mod request;
mod response;
mod validation;
mod value;

pub use idempotency::{external_event_key, idempotency_key, run_event_key};
pub use request::{
    CreateCustomer, EmitEvent, EndRun, LIST_CUSTOMERS_DEFAULT_LIMIT, ListCustomersOptions,
    RecordRun, RecordRunEvent, StartRun, TrackUsage,
};
pub use response::{
    Balance, Customer, CustomerList, EndRunResponse, Event, EventCounts, PingResponse,
    RecordRunResponse, RecordedRun, Run, TrackUsageResponse, Workflow,
};
pub use validation::ValidationError;
pub use value::{ApiKey, CustomerStatus, KeyType, Metadata, RunStatus, WorkflowRef};
