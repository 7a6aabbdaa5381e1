// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and authenticated principal representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::account::AccountKind;

/// Which of the two token families a token belongs to.
///
/// Carried explicitly in the claim set. Which secret happened to verify a
/// token says nothing about its kind once the dual-secret fallback is in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims signed into every gateway token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - the principal's stable identifier
    pub sub: String,

    /// Token family
    pub kind: TokenKind,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expiration (Unix seconds)
    pub exp: i64,

    /// Unique token id
    pub jti: String,

    /// Account kind hint, forwarded downstream untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acct: Option<AccountKind>,
}

/// Identity established from a verified token.
///
/// This is the type handlers and the propagator work with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedPrincipal {
    /// Canonical principal id (`sub` claim)
    pub principal_id: String,

    /// Kind of the token the identity came from
    pub token_kind: TokenKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_kind: Option<AccountKind>,

    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl AuthenticatedPrincipal {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            principal_id: claims.sub,
            token_kind: claims.kind,
            account_kind: claims.acct,
            expires_at: claims.exp,
        }
    }
}
