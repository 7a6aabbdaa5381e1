// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Why a presented token was refused.
///
/// Only used for logging; clients always see `invalid_token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// Not a decodable token, or required claims are missing
    Malformed,
    /// Signature does not verify under the secret tried
    BadSignature,
    /// `exp` has passed
    Expired,
    /// Verified, but the `kind` claim is not the one the operation needs
    WrongKind,
}

impl TokenRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRejection::Malformed => "malformed",
            TokenRejection::BadSignature => "bad_signature",
            TokenRejection::Expired => "expired",
            TokenRejection::WrongKind => "wrong_kind",
        }
    }
}

/// Authentication error type.
///
/// Every variant is terminal for the request; nothing here is retried.
#[derive(Debug)]
pub enum AuthError {
    /// No principal is registered under the submitted email
    UserNotFound,
    /// Password does not match the stored hash
    InvalidCredentials,
    /// No token was presented where one is required
    MissingToken,
    /// Token failed verification
    InvalidToken(TokenRejection),
    /// Internal error (store unavailable, signing failure)
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    error_code: &'static str,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::UserNotFound => "user_not_found",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UserNotFound | AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AuthError::MissingToken | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> AuthErrorBody {
        let error_code = self.error_code();
        match self {
            // Unknown principals and internal failures answer with `error`,
            // everything else with `message`; clients key off the field name.
            AuthError::UserNotFound => AuthErrorBody {
                error: Some(self.to_string()),
                message: None,
                error_code,
            },
            AuthError::Internal(_) => AuthErrorBody {
                error: Some("Internal authentication error".to_string()),
                message: None,
                error_code,
            },
            _ => AuthErrorBody {
                error: None,
                message: Some(self.to_string()),
                error_code,
            },
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::UserNotFound => write!(f, "User not found"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::MissingToken => write!(f, "Token is required"),
            AuthError::InvalidToken(_) => write!(f, "Token is invalid or expired"),
            AuthError::Internal(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(ref detail) = self {
            tracing::error!(error = %detail, "authentication failed internally");
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}
