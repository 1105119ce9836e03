//! Scripted transport shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::navigator::{MemoryNavigator, Navigator};
use crate::net::api::ApiClient;
use crate::net::transport::{ApiRequest, RawResponse, Transport, TransportError};

/// One canned response.
#[derive(Clone, Debug)]
pub struct Reply {
    status: u16,
    body: Vec<u8>,
    delay: Option<Duration>,
    unreachable: bool,
}

impl Reply {
    pub fn envelope(status: u16, description: &str, body: Value) -> Self {
        let envelope = json!({ "headers": { "status": status, "description": description }, "body": body });
        Self::raw(status, envelope.to_string().into_bytes())
    }

    pub fn ok(body: Value) -> Self {
        Self::envelope(200, "OK", body)
    }

    pub fn unauthorized() -> Self {
        Self::envelope(401, "Unauthorized", json!({ "error": "Unauthorized" }))
    }

    pub fn missing_refresh_token() -> Self {
        Self::envelope(400, "Refresh token is required", json!({ "error": "Refresh token is required" }))
    }

    pub fn raw(status: u16, body: Vec<u8>) -> Self {
        Self { status, body, delay: None, unreachable: false }
    }

    pub fn unreachable() -> Self {
        Self { unreachable: true, ..Self::raw(0, Vec::new()) }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Replies are queued per route; the last one for a route repeats forever.
#[derive(Default)]
pub struct MockTransport {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    sent: Mutex<Vec<ApiRequest>>,
    clears: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, route: &str, replies: impl IntoIterator<Item = Reply>) -> &Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(route.to_owned(), replies.into_iter().collect());
        self
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls(&self, route: &str) -> usize {
        self.sent().iter().filter(|r| r.route() == route).count()
    }

    pub fn routes(&self) -> Vec<String> {
        self.sent().iter().map(|r| r.route().to_owned()).collect()
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        let reply = {
            let mut scripts = self.scripts.lock().unwrap();
            let queue = scripts.get_mut(request.route());
            match queue {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        let reply = reply.unwrap_or_else(|| Reply::envelope(404, "Not Found", json!({ "error": "no script" })));
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        if reply.unreachable {
            return Err(TransportError::Request("connection refused".to_owned()));
        }
        Ok(RawResponse { status: reply.status, body: reply.body })
    }

    fn clear_credentials(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::new("http://gateway.test").unwrap()
}

/// A client over `transport` whose visitor starts at `path`.
pub fn client_at(transport: &Arc<MockTransport>, path: &str) -> (ApiClient, Arc<MemoryNavigator>) {
    let navigator = Arc::new(MemoryNavigator::new(path));
    let client = ApiClient::new(
        config(),
        Arc::clone(transport) as Arc<dyn Transport>,
        Arc::clone(&navigator) as Arc<dyn Navigator>,
    );
    (client, navigator)
}

pub fn session_user() -> Value {
    json!({ "id": "u1", "name": "Ada", "email": "ada@example.com" })
}
