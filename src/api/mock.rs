//! In-process transport for tests
//!
//! Routes every request through a closure and records what was sent.

use std::cell::RefCell;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::AppResult;

type Handler = Box<dyn Fn(&ApiRequest) -> AppResult<ApiResponse>>;

pub struct MockTransport {
    handler: Handler,
    requests: RefCell<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&ApiRequest) -> AppResult<ApiResponse> + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    /// Number of requests sent to `path` (query string ignored)
    pub fn count(&self, path: &str) -> usize {
        self.requests.borrow().iter().filter(|r| r.path == path).count()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, _url: &str, request: &ApiRequest, _timeout: Duration) -> AppResult<ApiResponse> {
        self.requests.borrow_mut().push(request.clone());
        // Suspend once so concurrent callers really overlap
        tokio::task::yield_now().await;
        (self.handler)(request)
    }
}

pub fn json_reply(status: u16, body: Value) -> AppResult<ApiResponse> {
    Ok(ApiResponse { status, body: body.to_string() })
}
