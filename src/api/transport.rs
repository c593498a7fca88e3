//! reqwest-backed transport
//!
//! On wasm32 reqwest rides on `fetch`, which has no timeout of its own,
//! so the exchange is raced against a gloo timer.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::{select, Either};
use gloo_timers::future::TimeoutFuture;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::{AppError, AppResult};

#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn send(&self, url: &str, request: &ApiRequest, timeout: Duration) -> AppResult<ApiResponse> {
        let mut builder = self
            .client
            .request(to_reqwest(request.method), url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let exchange = async move {
            let response = builder
                .send()
                .await
                .map_err(|e| AppError::Network(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| AppError::Network(e.to_string()))?;
            Ok::<_, AppError>(ApiResponse { status, body })
        };

        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let timer = TimeoutFuture::new(millis);
        match select(Box::pin(exchange), Box::pin(timer)).await {
            Either::Left((result, _)) => result,
            Either::Right((_, _)) => Err(AppError::Timeout(u64::from(millis))),
        }
    }
}
