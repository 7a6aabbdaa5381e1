// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Forwarding of client requests to downstream services.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName},
    response::{IntoResponse, Response},
};

use crate::auth::ResolvedIdentity;
use crate::downstream::{propagate_identity, OutboundRequest};
use crate::error::ApiError;
use crate::state::AppState;

/// Client headers relayed downstream. Everything else is dropped.
const FORWARDED_HEADERS: [HeaderName; 3] = [
    header::CONTENT_TYPE,
    header::ACCEPT,
    HeaderName::from_static("x-request-id"),
];

/// Pass the request body through to a named downstream service.
///
/// The caller's verified identity, if any, is attached by the propagator.
/// Anonymous callers are forwarded without identity headers.
#[utoipa::path(
    post,
    path = "/graphql/{service}",
    tag = "Gateway",
    params(
        ("service" = String, Path, description = "Downstream service name")
    ),
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Downstream response, relayed as-is"),
        (status = 404, description = "Unknown downstream service"),
        (status = 502, description = "Downstream service unavailable"),
        (status = 504, description = "Downstream service timed out")
    )
)]
pub async fn forward(
    State(state): State<AppState>,
    identity: ResolvedIdentity,
    Path(service): Path<String>,
    inbound: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let url = state
        .services
        .get(&service)
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("Unknown service '{service}'")))?;

    let mut headers = HeaderMap::new();
    for name in FORWARDED_HEADERS {
        if let Some(value) = inbound.get(&name) {
            headers.insert(name, value.clone());
        }
    }
    propagate_identity(&identity, &mut headers);

    tracing::debug!(
        service = %service,
        principal_id = identity.principal().map(|p| p.principal_id.as_str()),
        "forwarding request"
    );

    let request = OutboundRequest {
        service: service.clone(),
        url,
        headers,
        body,
    };
    let response = tokio::time::timeout(state.downstream_timeout, state.dispatcher.dispatch(request))
        .await
        .map_err(|_| {
            tracing::warn!(service = %service, "downstream request timed out");
            ApiError::gateway_timeout(format!("Service '{service}' timed out"))
        })??;

    let mut relayed = (response.status, response.body).into_response();
    if let Some(content_type) = response.content_type {
        relayed
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type);
    }
    Ok(relayed)
}
