use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use url::Url;

use super::{
    BoxFuture, DripClient, HttpError, HttpRequest, HttpResponse, HttpTransport, ResolvedConfig,
};
use crate::domain::ApiKey;

enum Scripted {
    Respond(HttpResponse),
    Timeout,
    Network,
}

#[derive(Default)]
struct State {
    script: VecDeque<Scripted>,
    requests: Vec<HttpRequest>,
}

/// Replays scripted responses in order and records every request.
///
/// An exhausted script answers with a network error.
#[derive(Clone, Default)]
pub(super) struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    pub(super) fn new() -> Self {
        Self::default()
    }

    fn push(&self, scripted: Scripted) {
        self.state.lock().unwrap().script.push_back(scripted);
    }

    pub(super) fn respond(&self, status: u16, body: &str) {
        self.push(Scripted::Respond(HttpResponse {
            status,
            body: body.to_owned(),
        }));
    }

    pub(super) fn fail_timeout(&self) {
        self.push(Scripted::Timeout);
    }

    pub(super) fn fail_network(&self) {
        self.push(Scripted::Network);
    }

    pub(super) fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

impl HttpTransport for FakeTransport {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, HttpError>> {
        let next = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request);
            state.script.pop_front()
        };
        Box::pin(async move {
            match next {
                Some(Scripted::Respond(response)) => Ok(response),
                Some(Scripted::Timeout) => Err(HttpError::Timeout(Box::from("scripted timeout"))),
                Some(Scripted::Network) => Err(HttpError::Network(Box::from("scripted failure"))),
                None => Err(HttpError::Network(Box::from("no scripted response left"))),
            }
        })
    }
}

pub(super) fn make_client(api_key: &str, transport: FakeTransport) -> DripClient {
    let config = ResolvedConfig {
        api_key: ApiKey::new(api_key).unwrap(),
        base_url: Url::parse("https://api.example.invalid/v1").unwrap(),
        timeout: Duration::from_secs(1),
    };
    DripClient::from_parts(config, Arc::new(transport))
}
