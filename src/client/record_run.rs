use std::time::Instant;

use super::{DripClient, DripError};
use crate::domain::{
    EmitEvent, EndRun, EventCounts, RecordRun, RecordRunResponse, RecordedRun, RunStatus,
    StartRun, WorkflowRef, external_event_key, run_event_key,
};
use crate::transport;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedWorkflow {
    id: String,
    name: String,
}

impl ResolvedWorkflow {
    fn raw(workflow: &WorkflowRef) -> Self {
        Self {
            id: workflow.as_str().to_owned(),
            name: workflow.as_str().to_owned(),
        }
    }
}

fn status_glyph(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Completed => "[OK]",
        RunStatus::Failed => "[FAIL]",
        _ => "[--]",
    }
}

fn summary_line(status: RunStatus, workflow_name: &str, created: u64, duration_ms: u64) -> String {
    format!(
        "{} {workflow_name}: {created} events recorded ({duration_ms}ms)",
        status_glyph(status)
    )
}

fn batch_events(run_id: &str, request: &mut RecordRun) -> Vec<EmitEvent> {
    let external_run_id = request.external_run_id.clone().filter(|it| !it.is_empty());
    std::mem::take(&mut request.events)
        .into_iter()
        .enumerate()
        .map(|(index, event)| {
            let key = match &external_run_id {
                Some(external) => external_event_key(external, &event.event_type, index),
                None => run_event_key(run_id, &event.event_type, index),
            };
            event.into_emit_event(run_id, key)
        })
        .collect()
}

impl DripClient {
    /// Record a complete run in one call: resolve (or create) the workflow, start a run,
    /// emit all events in one batch, end the run and build a one-line summary.
    ///
    /// Workflow lookup failures never fail the call; the raw reference is used as both
    /// workflow id and name instead. Any later failure is returned as is, and a run whose
    /// events could not be emitted is left open.
    ///
    /// ```rust,no_run
    /// use drip::{DripClient, RecordRun, RecordRunEvent};
    ///
    /// # async fn run(client: DripClient) -> Result<(), drip::DripError> {
    /// let response = client
    ///     .record_run(
    ///         RecordRun::new("cus_123", "training-run")
    ///             .event(RecordRunEvent::new("tokens").quantity(1500.0))
    ///             .event(RecordRunEvent::new("gpu_seconds").quantity(42.0)),
    ///     )
    ///     .await?;
    /// println!("{}", response.summary);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn record_run(&self, mut request: RecordRun) -> Result<RecordRunResponse, DripError> {
        let started = Instant::now();
        let workflow = self.resolve_workflow(&request.workflow).await;

        let run = self
            .start_run(StartRun {
                customer_id: request.customer_id.clone(),
                workflow_id: workflow.id.clone(),
                external_run_id: request.external_run_id.clone(),
                correlation_id: request.correlation_id.clone(),
                parent_run_id: None,
                metadata: std::mem::take(&mut request.metadata),
            })
            .await?;

        let events = batch_events(&run.id, &mut request);
        let counts = if events.is_empty() {
            EventCounts::default()
        } else {
            self.emit_events_batch(events).await?
        };

        let ended = self
            .end_run(
                &run.id,
                EndRun {
                    status: request.status,
                    error_message: request.error_message.take(),
                    error_code: request.error_code.take(),
                    ..EndRun::default()
                },
            )
            .await?;

        let duration_ms = ended.duration_ms.unwrap_or_else(|| {
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
        });
        let summary = summary_line(request.status, &workflow.name, counts.created, duration_ms);

        tracing::info!(
            run_id = %run.id,
            workflow_id = %workflow.id,
            created = counts.created,
            duplicates = counts.duplicates,
            "recorded run"
        );

        Ok(RecordRunResponse {
            run: RecordedRun {
                id: run.id,
                workflow_id: workflow.id,
                workflow_name: workflow.name,
                status: request.status,
                duration_ms: ended.duration_ms,
            },
            events: counts,
            total_cost_units: ended.total_cost_units,
            summary,
        })
    }

    async fn resolve_workflow(&self, workflow: &WorkflowRef) -> ResolvedWorkflow {
        if workflow.is_workflow_id() {
            return ResolvedWorkflow::raw(workflow);
        }

        match self.find_or_create_workflow(workflow).await {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::warn!(
                    workflow = workflow.as_str(),
                    error = %err,
                    "workflow lookup failed; using the raw reference"
                );
                ResolvedWorkflow::raw(workflow)
            }
        }
    }

    async fn find_or_create_workflow(
        &self,
        workflow: &WorkflowRef,
    ) -> Result<ResolvedWorkflow, DripError> {
        let slug = workflow.as_str();
        let existing = self
            .list_workflows()
            .await?
            .into_iter()
            .find(|it| it.id == slug || it.slug.as_deref() == Some(slug));
        if let Some(found) = existing {
            return Ok(ResolvedWorkflow {
                id: found.id,
                name: found.name,
            });
        }

        let name = workflow.display_name();
        tracing::debug!(
            slug,
            name = %name,
            surface = transport::DEFAULT_PRODUCT_SURFACE,
            "creating workflow"
        );
        let created = self.create_workflow(&name, slug).await?;
        Ok(ResolvedWorkflow {
            id: created.id,
            name: created.name,
        })
    }
}
