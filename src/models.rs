// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the session endpoints, plus the
//! [`Principal`] record returned by the credential store.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{AccountKind, AuthenticatedPrincipal, TokenKind};

// =============================================================================
// Principal
// =============================================================================

/// An account that can log in.
///
/// Owned by the credential store; the gateway only reads the fields it
/// needs to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Stable opaque identifier
    pub id: String,
    /// Lowercase email
    pub email: String,
    /// Argon2 PHC hash; machine accounts may have none
    pub password_hash: Option<String>,
    pub account_kind: Option<AccountKind>,
}

// =============================================================================
// Session Endpoints
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Access token (also set as the `token` cookie)
    pub token: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    /// New access token (also set as the `token` cookie)
    pub token: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

/// Response for GET /session/me
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionInfoResponse {
    pub principal_id: String,
    /// Kind of the token that established the identity
    pub token_kind: TokenKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_kind: Option<AccountKind>,
    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl From<AuthenticatedPrincipal> for SessionInfoResponse {
    fn from(principal: AuthenticatedPrincipal) -> Self {
        Self {
            principal_id: principal.principal_id,
            token_kind: principal.token_kind,
            account_kind: principal.account_kind,
            expires_at: principal.expires_at,
        }
    }
}
