//! Shared test fixtures: a scripted transport and event helpers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use bytes::Bytes;
use http::header::LOCATION;
use http::{HeaderMap, StatusCode};
use tempfile::TempDir;
use url::Url;

use reqguard::prelude::*;

/// Parse a URL that is known-good in tests.
pub fn url(s: &str) -> Url {
    Url::parse(s).expect("test URL should parse")
}

/// One scripted exchange: what the transport reports for a URL.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub delay: Option<Duration>,
}

impl ScriptedResponse {
    pub fn ok(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::copy_from_slice(body.as_bytes()),
            delay: None,
        }
    }

    pub fn redirect_to(location: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            LOCATION,
            location.parse().expect("test location should parse"),
        );
        Self {
            status: StatusCode::FOUND,
            headers,
            body: Bytes::new(),
            delay: None,
        }
    }

    #[must_use]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Scripted transport: per-URL responses, a request log, and abort
/// compliance (an aborted operation reports one error followed by its
/// terminal event, like a well-behaved transport).
pub struct MockTransport {
    script: Mutex<HashMap<String, ScriptedResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn respond(&self, url: &str, response: ScriptedResponse) {
        self.script
            .lock()
            .expect("script lock")
            .insert(url.to_string(), response);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("request log lock").len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request log lock").clone()
    }
}

impl Transport for MockTransport {
    fn start(&self, request: HttpRequest) -> Operation {
        self.requests
            .lock()
            .expect("request log lock")
            .push(request.clone());

        let scripted = self
            .script
            .lock()
            .expect("script lock")
            .get(request.url().as_str())
            .cloned();
        let url = request.url().clone();
        let (controller, operation) = Operation::channel(request);

        tokio::spawn(async move {
            let delay = scripted.as_ref().and_then(|response| response.delay);
            let deliver = async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
            };

            tokio::select! {
                () = controller.aborted() => {
                    controller.send_error(HttpError::Aborted);
                    controller.finish(ResponseMeta::new(
                        StatusCode::REQUEST_TIMEOUT,
                        HeaderMap::new(),
                        url,
                    ));
                }
                () = deliver => match scripted {
                    Some(response) => {
                        let total = response.body.len() as u64;
                        controller.send_progress(total, Some(total));
                        if !response.body.is_empty() {
                            controller.send_data(response.body.clone());
                        }
                        controller.finish(ResponseMeta::new(
                            response.status,
                            response.headers,
                            url,
                        ));
                    }
                    None => {
                        controller.send_error(HttpError::transport(404, "not scripted"));
                        controller.finish(ResponseMeta::new(
                            StatusCode::NOT_FOUND,
                            HeaderMap::new(),
                            url,
                        ));
                    }
                },
            }
        });

        operation
    }
}

/// Drain an operation's event stream until the producer goes away.
pub async fn collect_all(mut operation: Operation) -> Vec<OperationEvent> {
    let mut events = Vec::new();
    while let Some(event) = operation.next_event().await {
        events.push(event);
    }
    events
}

pub fn finished_count(events: &[OperationEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, OperationEvent::Finished(_)))
        .count()
}

pub fn final_meta(events: &[OperationEvent]) -> &ResponseMeta {
    events
        .iter()
        .rev()
        .find_map(|event| match event {
            OperationEvent::Finished(meta) => Some(meta),
            _ => None,
        })
        .expect("operation should have finished")
}

pub fn body_bytes(events: &[OperationEvent]) -> Vec<u8> {
    let mut body = Vec::new();
    for event in events {
        if let OperationEvent::Data(chunk) = event {
            body.extend_from_slice(chunk);
        }
    }
    body
}

pub fn abort_error_count(events: &[OperationEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, OperationEvent::Error(HttpError::Aborted)))
        .count()
}

/// Cache directory shared by every test in the process. The process-wide
/// cache store binds to whichever directory initializes it first, so the
/// backing tempdir must live for the whole test run.
static CACHE_DIR: OnceLock<TempDir> = OnceLock::new();

pub fn process_cache_dir() -> &'static std::path::Path {
    CACHE_DIR
        .get_or_init(|| tempfile::tempdir().expect("create cache tempdir"))
        .path()
}
