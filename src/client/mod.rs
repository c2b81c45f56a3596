//! Client layer: orchestrates transport calls and maps transport ↔ domain.

mod error;
#[cfg(test)]
mod fake;
mod record_run;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use url::Url;

use crate::domain::{
    ApiKey, Balance, CreateCustomer, Customer, CustomerList, EmitEvent, EndRun, EndRunResponse,
    Event, EventCounts, KeyType, ListCustomersOptions, PingResponse, Run, StartRun, TrackUsage,
    TrackUsageResponse, Workflow, idempotency_key, run_event_key,
};
use crate::transport::{self, TransportError};

pub use error::DripError;

const DEFAULT_BASE_URL: &str = "https://drip-app-hlunj.ondigitalocean.app/v1";
const BASE_URL_ENV: &str = "DRIP_BASE_URL";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = concat!("drip-rust/", env!("CARGO_PKG_VERSION"));
const NO_CONTENT_BODY: &str = r#"{"success":true}"#;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl HttpMethod {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
        }
    }
}

#[derive(Debug, Clone)]
struct HttpRequest {
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

#[derive(Debug, thiserror::Error)]
enum HttpError {
    #[error("request timed out: {0}")]
    Timeout(#[source] Box<dyn StdError + Send + Sync>),
    #[error("network error: {0}")]
    Network(#[source] Box<dyn StdError + Send + Sync>),
}

impl From<HttpError> for DripError {
    fn from(value: HttpError) -> Self {
        match value {
            HttpError::Timeout(source) => Self::Timeout(source),
            HttpError::Network(source) => Self::Network(source),
        }
    }
}

trait HttpTransport: Send + Sync {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, HttpError>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    fn classify(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(Box::new(err))
        } else {
            HttpError::Network(Box::new(err))
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, HttpError>> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
                HttpMethod::Patch => self.client.patch(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(Self::classify)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(Self::classify)?;
            Ok(HttpResponse { status, body })
        })
    }
}

/// Resolve one setting: the explicit value wins, then the environment variable.
///
/// Blank values count as absent at both levels.
fn resolve_setting(
    explicit: Option<String>,
    env_var: &str,
    env: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    explicit
        .filter(|it| !it.trim().is_empty())
        .or_else(|| env(env_var).filter(|it| !it.trim().is_empty()))
}

fn parse_base_url(raw: &str) -> Result<Url, DripError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|err| DripError::InvalidBaseUrl {
        url: raw.to_owned(),
        source: Some(err),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(DripError::InvalidBaseUrl {
            url: raw.to_owned(),
            source: None,
        });
    }
    Ok(url)
}

fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

#[derive(Debug, Clone)]
struct ResolvedConfig {
    api_key: ApiKey,
    base_url: Url,
    timeout: Duration,
}

#[derive(Debug, Clone, Default)]
/// Builder for [`DripClient`].
///
/// Every setting is optional. Unset values are resolved once, in [`DripClientBuilder::build`]:
/// the API key from `DRIP_API_KEY`, the base URL from `DRIP_BASE_URL` and then the
/// production endpoint, the timeout from the 30 second default.
pub struct DripClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl DripClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key (`sk_...` or `pk_...`). Surrounding whitespace is ignored.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the API base URL, including its version segment (e.g. `https://host/v1`).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the per-request timeout. A zero duration keeps the default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`DripClient`], reading unset values from the process environment.
    ///
    /// Errors:
    /// - [`DripError::MissingCredential`] when no API key is configured or set in the environment,
    /// - [`DripError::InvalidBaseUrl`] when the base URL is not an absolute http(s) URL.
    pub fn build(self) -> Result<DripClient, DripError> {
        self.build_with_env(|name| std::env::var(name).ok())
    }

    fn build_with_env(self, env: impl Fn(&str) -> Option<String>) -> Result<DripClient, DripError> {
        let user_agent = self
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());
        let config = self.resolve(env)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|err| DripError::Network(Box::new(err)))?;

        Ok(DripClient::from_parts(
            config,
            Arc::new(ReqwestTransport { client }),
        ))
    }

    fn resolve(self, env: impl Fn(&str) -> Option<String>) -> Result<ResolvedConfig, DripError> {
        let api_key = resolve_setting(self.api_key, ApiKey::ENV, &env)
            .and_then(ApiKey::new)
            .ok_or(DripError::MissingCredential)?;
        let base_url = resolve_setting(self.base_url, BASE_URL_ENV, &env)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let timeout = self
            .timeout
            .filter(|it| !it.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(ResolvedConfig {
            api_key,
            base_url: parse_base_url(&base_url)?,
            timeout,
        })
    }
}

#[derive(Clone)]
/// High-level Drip API client.
///
/// Configuration is resolved once at construction and never changes afterwards, so a
/// client can be cloned and shared across tasks. Every method performs its HTTP calls
/// sequentially and never retries.
pub struct DripClient {
    api_key: ApiKey,
    base_url: Url,
    timeout: Duration,
    http: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for DripClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DripClient")
            .field("api_key", &self.api_key)
            .field("base_url", &self.base_url())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl DripClient {
    /// Create a client from the environment (`DRIP_API_KEY`, `DRIP_BASE_URL`).
    ///
    /// For more customization, use [`DripClient::builder`].
    pub fn from_env() -> Result<Self, DripError> {
        DripClientBuilder::new().build()
    }

    /// Create a client with an explicit API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self, DripError> {
        DripClientBuilder::new().api_key(api_key).build()
    }

    /// Start building a client with custom settings.
    pub fn builder() -> DripClientBuilder {
        DripClientBuilder::new()
    }

    fn from_parts(config: ResolvedConfig, http: Arc<dyn HttpTransport>) -> Self {
        Self {
            api_key: config.api_key,
            base_url: config.base_url,
            timeout: config.timeout,
            http,
        }
    }

    /// The detected key type (secret, public, unknown).
    pub fn key_type(&self) -> KeyType {
        self.api_key.key_type()
    }

    /// The resolved base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `GET /health` lives at the API root, next to the versioned prefix.
    fn health_endpoint(&self) -> Url {
        let mut url = self.base_url.clone();
        let ends_with_version = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .is_some_and(is_version_segment);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            if ends_with_version {
                path.pop();
            }
            path.push("health");
        }
        url
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            (
                "Authorization".to_owned(),
                format!("Bearer {}", self.api_key.as_str()),
            ),
            ("Content-Type".to_owned(), "application/json".to_owned()),
        ]
    }

    async fn execute(
        &self,
        method: HttpMethod,
        url: Url,
        body: Option<String>,
    ) -> Result<HttpResponse, DripError> {
        tracing::debug!(method = method.as_str(), url = %url, "sending Drip API request");
        let request = HttpRequest {
            method,
            url: url.into(),
            headers: self.headers(),
            body,
        };

        let response = self.http.send(request).await.inspect_err(|err| {
            tracing::debug!(error = %err, "Drip API request failed");
        })?;
        tracing::debug!(status = response.status, "received Drip API response");

        if response.status == 204 {
            return Ok(HttpResponse {
                status: response.status,
                body: NO_CONTENT_BODY.to_owned(),
            });
        }

        if !(200..=299).contains(&response.status) {
            let status = response.status;
            let body = transport::decode_error_json_response(status, &response.body)
                .map_err(|source| DripError::Parse { status, source })?;
            return Err(DripError::from_status(status, body));
        }

        Ok(response)
    }

    async fn get<T>(
        &self,
        url: Url,
        decode: impl FnOnce(&str) -> Result<T, TransportError>,
    ) -> Result<T, DripError> {
        let response = self.execute(HttpMethod::Get, url, None).await?;
        decode_body(&response, decode)
    }

    async fn send_json<T>(
        &self,
        method: HttpMethod,
        url: Url,
        body: Result<String, TransportError>,
        decode: impl FnOnce(&str) -> Result<T, TransportError>,
    ) -> Result<T, DripError> {
        let body = body.map_err(DripError::Encode)?;
        let response = self.execute(method, url, Some(body)).await?;
        decode_body(&response, decode)
    }

    /// Ping the API root and measure round-trip latency.
    ///
    /// `ok` is `true` only when the server reports `"healthy"` (the default when the
    /// status field is missing).
    ///
    /// Errors:
    /// - [`DripError::Timeout`] when the health check exceeds the configured timeout,
    /// - [`DripError::Network`] on connection failures.
    pub async fn ping(&self) -> Result<PingResponse, DripError> {
        let started = Instant::now();
        let response = self
            .execute(HttpMethod::Get, self.health_endpoint(), None)
            .await?;
        let latency = started.elapsed();
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |it| i64::try_from(it.as_millis()).unwrap_or(i64::MAX));

        decode_body(&response, |json| {
            transport::decode_health_json_response(json, latency, now_ms)
        })
    }

    /// Create a customer.
    pub async fn create_customer(&self, request: CreateCustomer) -> Result<Customer, DripError> {
        self.send_json(
            HttpMethod::Post,
            self.endpoint(&["customers"]),
            transport::encode_create_customer_json(&request),
            transport::decode_customer_json_response,
        )
        .await
    }

    /// Fetch a customer by id.
    ///
    /// Errors:
    /// - [`DripError::NotFound`] when the customer does not exist.
    pub async fn get_customer(&self, customer_id: &str) -> Result<Customer, DripError> {
        self.get(
            self.endpoint(&["customers", customer_id]),
            transport::decode_customer_json_response,
        )
        .await
    }

    /// List customers, optionally filtered by status.
    pub async fn list_customers(
        &self,
        options: &ListCustomersOptions,
    ) -> Result<CustomerList, DripError> {
        let mut url = self.endpoint(&["customers"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &options.limit.to_string());
            if let Some(status) = options.status.as_deref().filter(|it| !it.is_empty()) {
                query.append_pair("status", status);
            }
        }
        self.get(url, transport::decode_customer_list_json_response)
            .await
    }

    /// Fetch a customer's USDC balance.
    ///
    /// Errors:
    /// - [`DripError::NotFound`] when the customer does not exist.
    pub async fn get_balance(&self, customer_id: &str) -> Result<Balance, DripError> {
        self.get(
            self.endpoint(&["customers", customer_id, "balance"]),
            transport::decode_balance_json_response,
        )
        .await
    }

    /// Record usage for tracking without billing.
    ///
    /// Without an explicit idempotency key, one is derived from the customer, meter and
    /// quantity, so retrying the same call is deduplicated by the server.
    pub async fn track_usage(&self, request: TrackUsage) -> Result<TrackUsageResponse, DripError> {
        let key = request
            .idempotency_key
            .clone()
            .filter(|it| !it.is_empty())
            .unwrap_or_else(|| {
                idempotency_key(
                    "track",
                    &request.customer_id,
                    &request.meter,
                    request.quantity,
                )
            });

        self.send_json(
            HttpMethod::Post,
            self.endpoint(&["usage", "internal"]),
            transport::encode_track_usage_json(&request, &key),
            |json| transport::decode_track_usage_json_response(&request, json),
        )
        .await
    }

    /// List the workflows visible to this API key.
    pub async fn list_workflows(&self) -> Result<Vec<Workflow>, DripError> {
        self.get(
            self.endpoint(&["workflows"]),
            transport::decode_workflow_list_json_response,
        )
        .await
    }

    /// Create a workflow with the generic `CUSTOM` product surface.
    pub async fn create_workflow(&self, name: &str, slug: &str) -> Result<Workflow, DripError> {
        self.send_json(
            HttpMethod::Post,
            self.endpoint(&["workflows"]),
            transport::encode_create_workflow_json(name, slug, transport::DEFAULT_PRODUCT_SURFACE),
            transport::decode_workflow_json_response,
        )
        .await
    }

    /// Start a run. Add events with [`DripClient::emit_event`], then finish it with
    /// [`DripClient::end_run`].
    pub async fn start_run(&self, request: StartRun) -> Result<Run, DripError> {
        self.send_json(
            HttpMethod::Post,
            self.endpoint(&["runs"]),
            transport::encode_start_run_json(&request),
            transport::decode_run_json_response,
        )
        .await
    }

    /// End a run with a final status.
    pub async fn end_run(
        &self,
        run_id: &str,
        request: EndRun,
    ) -> Result<EndRunResponse, DripError> {
        self.send_json(
            HttpMethod::Patch,
            self.endpoint(&["runs", run_id]),
            transport::encode_end_run_json(&request),
            transport::decode_end_run_json_response,
        )
        .await
    }

    /// Emit one event to a running run.
    ///
    /// Without an explicit idempotency key, one is derived from the run, event type and
    /// quantity.
    pub async fn emit_event(&self, request: EmitEvent) -> Result<Event, DripError> {
        let key = request
            .idempotency_key
            .clone()
            .filter(|it| !it.is_empty())
            .unwrap_or_else(|| {
                idempotency_key("evt", &request.run_id, &request.event_type, request.quantity)
            });

        self.send_json(
            HttpMethod::Post,
            self.endpoint(&["run-events"]),
            transport::encode_emit_event_json(&request, &key),
            transport::decode_event_json_response,
        )
        .await
    }

    /// Emit several events in one call and return the server's created/duplicate counts.
    ///
    /// Events without an idempotency key get one derived from their run, type and
    /// position in `events`.
    pub async fn emit_events_batch(
        &self,
        events: Vec<EmitEvent>,
    ) -> Result<EventCounts, DripError> {
        let events: Vec<EmitEvent> = events
            .into_iter()
            .enumerate()
            .map(|(index, mut event)| {
                if event.idempotency_key.as_deref().is_none_or(str::is_empty) {
                    event.idempotency_key =
                        Some(run_event_key(&event.run_id, &event.event_type, index));
                }
                event
            })
            .collect();

        self.send_json(
            HttpMethod::Post,
            self.endpoint(&["run-events", "batch"]),
            transport::encode_batch_events_json(&events),
            transport::decode_batch_events_json_response,
        )
        .await
    }
}

fn decode_body<T>(
    response: &HttpResponse,
    decode: impl FnOnce(&str) -> Result<T, TransportError>,
) -> Result<T, DripError> {
    decode(&response.body).map_err(|source| DripError::Parse {
        status: response.status,
        source,
    })
}
