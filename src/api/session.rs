// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints: login, refresh, logout and current identity.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::cookies::{clear_session, refresh_token, write_access_token, write_session};
use crate::auth::{Auth, AuthError, RefreshFlow};
use crate::models::{
    LoginRequest, LoginResponse, LogoutResponse, RefreshResponse, SessionInfoResponse,
};
use crate::state::AppState;

/// Exchange email and password for a token pair.
///
/// Sets the `token` and `refreshToken` cookies and returns the access token
/// in the body.
#[utoipa::path(
    post,
    path = "/session",
    tag = "Session",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookies set", body = LoginResponse),
        (status = 400, description = "Unknown email or wrong password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthError> {
    let principal = match state
        .credentials
        .verify(&request.email, &request.password)
        .await
    {
        Ok(principal) => principal,
        Err(err) => {
            tracing::info!(reason = err.error_code(), "login rejected");
            return Err(err);
        }
    };

    let pair = state
        .tokens
        .issue_pair(&principal.id, principal.account_kind)?;
    tracing::info!(principal_id = %principal.id, "login succeeded");

    let jar = write_session(jar, &pair, &state.cookies);
    Ok((
        jar,
        Json(LoginResponse {
            token: pair.access.token,
            message: "Login successful".to_string(),
        }),
    ))
}

/// Trade the refresh cookie for a new access token.
///
/// Only the `token` cookie is rewritten; the refresh token is not rotated.
#[utoipa::path(
    post,
    path = "/session/refresh",
    tag = "Session",
    responses(
        (status = 200, description = "New access token issued", body = RefreshResponse),
        (status = 401, description = "Refresh token missing, invalid or expired")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<RefreshResponse>), AuthError> {
    let presented = refresh_token(&jar);
    let refreshed = RefreshFlow::new(&state.tokens)
        .submit(presented.as_deref())
        .into_state()
        .into_result()?;

    let jar = write_access_token(jar, &refreshed.access, &state.cookies);
    Ok((
        jar,
        Json(RefreshResponse {
            token: refreshed.access.token,
            success: true,
        }),
    ))
}

/// Expire both session cookies.
#[utoipa::path(
    post,
    path = "/session/logout",
    tag = "Session",
    responses(
        (status = 200, description = "Session cookies cleared", body = LogoutResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    (
        clear_session(jar, &state.cookies),
        Json(LogoutResponse {
            success: true,
            message: "Logged out".to_string(),
        }),
    )
}

/// Identity carried by the presented token.
#[utoipa::path(
    get,
    path = "/session/me",
    tag = "Session",
    responses(
        (status = 200, description = "Current identity", body = SessionInfoResponse),
        (status = 401, description = "No valid token presented")
    )
)]
pub async fn me(Auth(principal): Auth) -> Json<SessionInfoResponse> {
    Json(principal.into())
}
