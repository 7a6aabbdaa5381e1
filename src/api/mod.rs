// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    api::health::{HealthResponse, ReadyResponse},
    auth::{middleware::resolve_identity, AccountKind, TokenKind},
    models::{LoginRequest, LoginResponse, LogoutResponse, RefreshResponse, SessionInfoResponse},
    state::AppState,
};

pub mod gateway;
pub mod health;
pub mod session;

pub fn router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/session", post(session::login))
        .route("/session/refresh", post(session::refresh))
        .route("/session/logout", post(session::logout))
        .route("/session/me", get(session::me));

    let gateway_routes = Router::new()
        .route("/graphql/{service}", post(gateway::forward))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ));

    let health_routes = Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .merge(session_routes)
        .merge(gateway_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// CORS for the single configured browser origin, with credentials so the
/// session cookies travel.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let origin = HeaderValue::from_str(origin)?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        session::login,
        session::refresh,
        session::logout,
        session::me,
        gateway::forward,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            RefreshResponse,
            LogoutResponse,
            SessionInfoResponse,
            TokenKind,
            AccountKind,
            HealthResponse,
            ReadyResponse
        )
    ),
    tags(
        (name = "Session", description = "Login, refresh and logout"),
        (name = "Gateway", description = "Forwarding to downstream services"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
