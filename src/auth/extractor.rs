// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the caller's identity.
//!
//! ```rust,ignore
//! // Anonymous callers allowed
//! async fn forward(identity: ResolvedIdentity) -> impl IntoResponse { ... }
//!
//! // Anonymous callers rejected with 401
//! async fn me(Auth(principal): Auth) -> impl IntoResponse { ... }
//! ```
//!
//! Both use the session transport read order and the dual-secret verifier.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;

use super::claims::AuthenticatedPrincipal;
use super::cookies::resolve_token;
use super::error::AuthError;
use super::tokens::TokenService;
use crate::state::AppState;

/// Identity of the caller as far as the gateway could establish it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResolvedIdentity {
    /// No token, or a token that failed verification
    #[default]
    Anonymous,
    /// The token as presented and the identity it proves
    Verified {
        token: String,
        principal: AuthenticatedPrincipal,
    },
}

impl ResolvedIdentity {
    /// Resolve from request headers (cookies, then bearer).
    pub fn resolve(headers: &HeaderMap, tokens: &TokenService) -> Self {
        match try_resolve(headers, tokens) {
            Ok((token, principal)) => ResolvedIdentity::Verified { token, principal },
            Err(AuthError::MissingToken) => ResolvedIdentity::Anonymous,
            Err(err) => {
                tracing::debug!(reason = err.error_code(), "presented token rejected, treating as anonymous");
                ResolvedIdentity::Anonymous
            }
        }
    }

    pub fn principal(&self) -> Option<&AuthenticatedPrincipal> {
        match self {
            ResolvedIdentity::Verified { principal, .. } => Some(principal),
            ResolvedIdentity::Anonymous => None,
        }
    }
}

fn try_resolve(
    headers: &HeaderMap,
    tokens: &TokenService,
) -> Result<(String, AuthenticatedPrincipal), AuthError> {
    let jar = CookieJar::from_headers(headers);
    let found = resolve_token(&jar, headers).ok_or(AuthError::MissingToken)?;
    let principal = tokens.verify(&found.value)?;
    tracing::trace!(source = ?found.source, principal_id = %principal.principal_id, "identity resolved");
    Ok((found.value, principal))
}

impl FromRequestParts<AppState> for ResolvedIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // The identity middleware may already have done the work.
        if let Some(identity) = parts.extensions.get::<ResolvedIdentity>().cloned() {
            return Ok(identity);
        }
        Ok(ResolvedIdentity::resolve(&parts.headers, &state.tokens))
    }
}

/// Extractor that requires a verified identity.
pub struct Auth(pub AuthenticatedPrincipal);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(ResolvedIdentity::Verified { principal, .. }) =
            parts.extensions.get::<ResolvedIdentity>()
        {
            return Ok(Auth(principal.clone()));
        }

        let (_, principal) = try_resolve(&parts.headers, &state.tokens)?;
        Ok(Auth(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::error::TokenRejection;
    use crate::auth::TokenKind;
    use crate::test_support::test_state;
    use axum::http::Request;

    fn parts(cookie: Option<&str>, bearer: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(cookie) = cookie {
            builder = builder.header("Cookie", cookie);
        }
        if let Some(token) = bearer {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn anonymous_without_token() {
        let (state, _) = test_state().await;
        let mut parts = parts(None, None);
        let identity = ResolvedIdentity::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(identity, ResolvedIdentity::Anonymous);
    }

    #[tokio::test]
    async fn bearer_token_resolves() {
        let (state, _) = test_state().await;
        let issued = state.tokens.issue_access_token("abc", None).unwrap();
        let mut parts = parts(None, Some(issued.token.as_str()));

        let identity = ResolvedIdentity::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(identity.principal().unwrap().principal_id, "abc");
    }

    #[tokio::test]
    async fn refresh_cookie_resolves_through_fallback() {
        let (state, _) = test_state().await;
        let refresh = state.tokens.issue_refresh_token("abc", None).unwrap();
        let cookie = format!("refreshToken={}", refresh.token);
        let mut parts = parts(Some(cookie.as_str()), None);

        let identity = ResolvedIdentity::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        let principal = identity.principal().unwrap();
        assert_eq!(principal.principal_id, "abc");
        assert_eq!(principal.token_kind, TokenKind::Refresh);
    }

    #[tokio::test]
    async fn invalid_token_is_anonymous() {
        let (state, _) = test_state().await;
        let mut parts = parts(Some("token=garbage"), None);
        let identity = ResolvedIdentity::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(identity, ResolvedIdentity::Anonymous);
    }

    #[tokio::test]
    async fn extensions_are_preferred() {
        let (state, _) = test_state().await;
        let mut parts = parts(None, None);
        let principal = AuthenticatedPrincipal {
            principal_id: "from_middleware".to_string(),
            token_kind: TokenKind::Access,
            account_kind: None,
            expires_at: 0,
        };
        parts.extensions.insert(ResolvedIdentity::Verified {
            token: "t".to_string(),
            principal,
        });

        let Auth(principal) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(principal.principal_id, "from_middleware");
    }

    #[tokio::test]
    async fn auth_requires_token() {
        let (state, _) = test_state().await;
        let mut parts = parts(None, None);
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn auth_rejects_invalid_token() {
        let (state, _) = test_state().await;
        let mut parts = parts(None, Some("garbage"));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(
            result,
            Err(AuthError::InvalidToken(TokenRejection::Malformed))
        ));
    }
}
