//! In-process [`HttpTransport`] for tests.
//!
//! Responses are scripted per method and path. One-shot responses are
//! consumed in order; once a route's queue is empty its handler (if any)
//! answers. Unscripted requests fail with a transport error.

use crate::{ApiRequest, ApiResponse, HttpTransport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Method, StatusCode};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

type Handler = Arc<dyn Fn(&ApiRequest) -> ApiResponse + Send + Sync>;
type RouteKey = (Method, String);

enum Scripted {
    Respond {
        response: ApiResponse,
        delay: Option<Duration>,
    },
    Fail(String),
}

#[derive(Default)]
struct Script {
    queued: HashMap<RouteKey, VecDeque<Scripted>>,
    handlers: HashMap<RouteKey, Handler>,
    log: Vec<ApiRequest>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

fn response(status: u16, body: &serde_json::Value) -> ApiResponse {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    ApiResponse::new(status, body.to_string())
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn enqueue(&self, method: Method, path: &str, scripted: Scripted) -> &Self {
        self.script
            .lock()
            .queued
            .entry((method, path.to_string()))
            .or_default()
            .push_back(scripted);
        self
    }

    /// Answer the next `method path` request once.
    pub fn push(&self, method: Method, path: &str, status: u16, body: serde_json::Value) -> &Self {
        self.enqueue(
            method,
            path,
            Scripted::Respond {
                response: response(status, &body),
                delay: None,
            },
        )
    }

    /// Like [`push`](Self::push), answering after `delay`.
    pub fn push_delayed(
        &self,
        method: Method,
        path: &str,
        status: u16,
        body: serde_json::Value,
        delay: Duration,
    ) -> &Self {
        self.enqueue(
            method,
            path,
            Scripted::Respond {
                response: response(status, &body),
                delay: Some(delay),
            },
        )
    }

    /// Fail the next `method path` request without a response.
    pub fn push_failure(&self, method: Method, path: &str, message: &str) -> &Self {
        self.enqueue(method, path, Scripted::Fail(message.to_string()))
    }

    /// Answer every `method path` request not covered by a queued response.
    pub fn route<F>(&self, method: Method, path: &str, handler: F) -> &Self
    where
        F: Fn(&ApiRequest) -> ApiResponse + Send + Sync + 'static,
    {
        self.script
            .lock()
            .handlers
            .insert((method, path.to_string()), Arc::new(handler));
        self
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.script.lock().log.clone()
    }

    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.script
            .lock()
            .log
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }

    /// Bearer credentials sent to `method path`, in order.
    pub fn bearers(&self, method: &Method, path: &str) -> Vec<Option<String>> {
        self.script
            .lock()
            .log
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .map(|r| r.bearer_token().map(str::to_string))
            .collect()
    }
}

/// A JSON response, for use in [`ScriptedTransport::route`] handlers.
pub fn json_response(status: u16, body: serde_json::Value) -> ApiResponse {
    response(status, &body)
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let key = (request.method.clone(), request.path.clone());
        let next = {
            let mut script = self.script.lock();
            script.log.push(request.clone());
            match script.queued.get_mut(&key).and_then(VecDeque::pop_front) {
                Some(scripted) => scripted,
                None => match script.handlers.get(&key) {
                    Some(handler) => Scripted::Respond {
                        response: handler(request),
                        delay: None,
                    },
                    None => Scripted::Fail(format!(
                        "no scripted response for {} {}",
                        request.method, request.path
                    )),
                },
            }
        };

        match next {
            Scripted::Respond { response, delay } => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(response)
            }
            Scripted::Fail(message) => Err(TransportError::new(message)),
        }
    }
}
