//! Typed Rust client for the Drip billing and usage API.
//!
//! The crate is split in three layers: a domain layer of strong request/response
//! types, a transport layer for wire-format details (camelCase JSON, lenient
//! numbers), and a small client layer orchestrating requests, including the
//! one-call [`DripClient::record_run`].
//!
//! ```rust,no_run
//! use drip::{DripClient, RecordRun, RecordRunEvent, TrackUsage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), drip::DripError> {
//!     // Reads DRIP_API_KEY (and optionally DRIP_BASE_URL).
//!     let client = DripClient::from_env()?;
//!
//!     client
//!         .track_usage(TrackUsage::new("cus_123", "api_calls", 1.0))
//!         .await?;
//!
//!     let response = client
//!         .record_run(
//!             RecordRun::new("cus_123", "training-run")
//!                 .event(RecordRunEvent::new("tokens").quantity(1500.0)),
//!         )
//!         .await?;
//!     println!("{}", response.summary);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{DripClient, DripClientBuilder, DripError};
pub use domain::{
    ApiKey, Balance, CreateCustomer, Customer, CustomerList, CustomerStatus, EmitEvent, EndRun,
    EndRunResponse, Event, EventCounts, KeyType, ListCustomersOptions, Metadata, PingResponse,
    RecordRun, RecordRunEvent, RecordRunResponse, RecordedRun, Run, RunStatus, StartRun,
    TrackUsage, TrackUsageResponse, ValidationError, Workflow, WorkflowRef,
};
