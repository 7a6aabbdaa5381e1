// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! reqwest-backed dispatcher.

use async_trait::async_trait;
use axum::http::header::CONTENT_TYPE;
use reqwest::Client;

use super::{DispatchError, Dispatcher, DownstreamResponse, OutboundRequest};

/// Sends each outbound request as a single HTTP POST.
///
/// No client-level timeout is configured; the gateway handler imposes its
/// own deadline around the whole call.
#[derive(Clone)]
pub struct HttpDispatcher {
    client: Client,
}

impl HttpDispatcher {
    pub fn new() -> Result<Self, DispatchError> {
        let client = Client::builder()
            .build()
            .map_err(|e| DispatchError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, request: OutboundRequest) -> Result<DownstreamResponse, DispatchError> {
        let OutboundRequest {
            service,
            url,
            headers,
            body,
        } = request;

        let failed = |e: reqwest::Error| DispatchError::Request {
            service: service.clone(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(failed)?;

        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(failed)?;

        tracing::debug!(service = %service, status = status.as_u16(), "downstream responded");

        Ok(DownstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
