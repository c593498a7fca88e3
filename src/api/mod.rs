//! REST API Client
//!
//! Verb helpers over a pluggable `Transport`. Every request carries the
//! persisted access token; a 401 triggers exactly one refresh-and-retry.

pub mod auth;
pub mod products;
pub mod suppliers;
mod transport;

#[cfg(test)]
pub mod mock;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::models::{RefreshRequest, RefreshResponse};
use crate::session::SessionStore;

pub use transport::ReqwestTransport;

/// Characters left unescaped in query values
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// One outgoing request, independent of the HTTP library
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Filled in by `ApiClient` right before sending
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> AppResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Path plus encoded query string
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, QUERY_VALUE),
                    utf8_percent_encode(v, QUERY_VALUE)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body; an empty body decodes as JSON `null`
    pub fn json<T: DeserializeOwned>(&self) -> AppResult<T> {
        let text = if self.body.trim().is_empty() { "null" } else { self.body.as_str() };
        serde_json::from_str(text).map_err(AppError::from)
    }
}

/// The actual HTTP exchange
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, url: &str, request: &ApiRequest, timeout: Duration) -> AppResult<ApiResponse>;
}

/// Lifecycle of one logical request. Terminal after a single retry.
#[derive(Debug)]
enum RequestState {
    NotSent,
    Sent(ApiResponse),
    AuthFailed(ApiResponse),
    RetriedOnce(ApiResponse),
}

struct Inner {
    config: AppConfig,
    transport: Rc<dyn Transport>,
    session: SessionStore,
    on_expired: RefCell<Option<Rc<dyn Fn()>>>,
}

/// Cheap to clone; clones share transport and session
#[derive(Clone)]
pub struct ApiClient {
    inner: Rc<Inner>,
}

impl ApiClient {
    pub fn new(config: AppConfig, transport: Rc<dyn Transport>, session: SessionStore) -> Self {
        Self {
            inner: Rc::new(Inner {
                config,
                transport,
                session,
                on_expired: RefCell::new(None),
            }),
        }
    }

    /// Called after the session was cleared because it could not be refreshed
    pub fn on_session_expired(&self, hook: impl Fn() + 'static) {
        *self.inner.on_expired.borrow_mut() = Some(Rc::new(hook));
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Send a request, refreshing the access token once on 401
    pub async fn execute(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let mut state = RequestState::NotSent;
        loop {
            state = match state {
                RequestState::NotSent => RequestState::Sent(self.dispatch(&request).await?),
                RequestState::Sent(response) if response.status == 401 => {
                    log::debug!("{} {} -> 401, attempting token refresh", request.method.as_str(), request.path);
                    RequestState::AuthFailed(response)
                }
                RequestState::Sent(response) | RequestState::RetriedOnce(response) => {
                    return self.finish(&request, response);
                }
                RequestState::AuthFailed(original) => match self.refresh_access_token().await {
                    Ok(_) => RequestState::RetriedOnce(self.dispatch(&request).await?),
                    Err(e) => {
                        log::warn!("Token refresh failed: {}", e);
                        self.expire_session();
                        return self.finish(&request, original);
                    }
                },
            };
        }
    }

    async fn dispatch(&self, request: &ApiRequest) -> AppResult<ApiResponse> {
        let mut outgoing = request.clone();
        outgoing.bearer = self.inner.session.persisted_access_token();
        let url = self.inner.config.url_for(&outgoing.target());
        log::debug!("{} {}", outgoing.method.as_str(), url);
        self.inner
            .transport
            .send(&url, &outgoing, self.inner.config.request_timeout)
            .await
            .map_err(|e| {
                log::error!("API error on {} {}: {}", outgoing.method.as_str(), outgoing.path, e);
                e
            })
    }

    fn finish(&self, request: &ApiRequest, response: ApiResponse) -> AppResult<ApiResponse> {
        if response.is_success() {
            return Ok(response);
        }
        let err = AppError::from_response(response.status, &response.body);
        log::error!("API error on {} {}: {}", request.method.as_str(), request.path, err);
        Err(err)
    }

    /// Exchange the persisted refresh token for a new access token.
    /// Goes straight to the transport so it can never recurse into a refresh.
    async fn refresh_access_token(&self) -> AppResult<String> {
        let refresh = self
            .inner
            .session
            .persisted_refresh_token()
            .ok_or(AppError::MissingRefreshToken)?;
        let request = ApiRequest::new(Method::Post, auth::REFRESH_PATH).with_json(&RefreshRequest { refresh })?;
        let url = self.inner.config.url_for(&request.target());
        let response = self
            .inner
            .transport
            .send(&url, &request, self.inner.config.request_timeout)
            .await?;
        if !response.is_success() {
            return Err(AppError::from_response(response.status, &response.body));
        }
        let refreshed: RefreshResponse = response.json()?;
        self.inner.session.set_access_token(refreshed.access.clone());
        Ok(refreshed.access)
    }

    fn expire_session(&self) {
        self.inner.session.clear();
        let hook = self.inner.on_expired.borrow().clone();
        if let Some(hook) = hook {
            hook();
        }
    }

    // ========================
    // Verb helpers
    // ========================

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        self.execute(ApiRequest::new(Method::Get, path)).await?.json()
    }

    pub async fn get_with_query<T: DeserializeOwned>(&self, path: &str, query: Vec<(String, String)>) -> AppResult<T> {
        self.execute(ApiRequest::new(Method::Get, path).with_query(query)).await?.json()
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> AppResult<T> {
        self.execute(ApiRequest::new(Method::Post, path).with_json(body)?).await?.json()
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> AppResult<T> {
        self.execute(ApiRequest::new(Method::Put, path).with_json(body)?).await?.json()
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> AppResult<T> {
        self.execute(ApiRequest::new(Method::Patch, path).with_json(body)?).await?.json()
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        self.execute(ApiRequest::new(Method::Delete, path)).await?.json()
    }
}
