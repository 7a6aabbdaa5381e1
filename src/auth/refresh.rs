// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access-token refresh.
//!
//! ```text
//!                   ┌──────────► Refreshed (new access token)
//! AwaitingRefresh ──┤
//!                   └──────────► Rejected (401)
//! ```
//!
//! The refresh token is checked against the refresh secret only and must
//! carry `kind = refresh`; the dual-secret fallback is never used here. The
//! refresh token is not rotated and stays valid until its own expiry.

use super::claims::{AuthenticatedPrincipal, TokenKind};
use super::error::AuthError;
use super::tokens::{IssuedToken, TokenService};

/// Result of a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshedAccess {
    pub principal: AuthenticatedPrincipal,
    pub access: IssuedToken,
}

#[derive(Debug)]
pub enum RefreshState {
    AwaitingRefresh,
    Refreshed(RefreshedAccess),
    Rejected(AuthError),
}

impl RefreshState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RefreshState::AwaitingRefresh)
    }

    pub fn into_result(self) -> Result<RefreshedAccess, AuthError> {
        match self {
            RefreshState::Refreshed(refreshed) => Ok(refreshed),
            RefreshState::Rejected(err) => Err(err),
            RefreshState::AwaitingRefresh => {
                Err(AuthError::Internal("refresh flow did not run".into()))
            }
        }
    }
}

/// One refresh attempt.
pub struct RefreshFlow<'a> {
    tokens: &'a TokenService,
    state: RefreshState,
}

impl<'a> RefreshFlow<'a> {
    pub fn new(tokens: &'a TokenService) -> Self {
        Self {
            tokens,
            state: RefreshState::AwaitingRefresh,
        }
    }

    pub fn state(&self) -> &RefreshState {
        &self.state
    }

    /// Feed the refresh token from the transport and advance.
    ///
    /// Terminal states are returned unchanged.
    pub fn submit(mut self, refresh_token: Option<&str>) -> Self {
        if self.state.is_terminal() {
            return self;
        }
        self.state = match self.try_refresh(refresh_token) {
            Ok(refreshed) => {
                tracing::info!(
                    principal_id = %refreshed.principal.principal_id,
                    "access token refreshed"
                );
                RefreshState::Refreshed(refreshed)
            }
            Err(err) => {
                tracing::info!(reason = err.error_code(), "refresh rejected");
                RefreshState::Rejected(err)
            }
        };
        self
    }

    pub fn into_state(self) -> RefreshState {
        self.state
    }

    fn try_refresh(&self, refresh_token: Option<&str>) -> Result<RefreshedAccess, AuthError> {
        let token = refresh_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let principal = self.tokens.verify_kind(TokenKind::Refresh, token)?;
        let access = self
            .tokens
            .issue_access_token(&principal.principal_id, principal.account_kind)?;

        Ok(RefreshedAccess { principal, access })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::error::TokenRejection;
    use crate::auth::tokens::test_clock::FixedClock;
    use crate::auth::tokens::{TokenLifetimes, TokenSecrets};
    use crate::auth::AccountKind;

    fn service() -> (TokenService, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(1_760_000_000));
        let secrets = TokenSecrets::new("access-secret", "refresh-secret").unwrap();
        let tokens =
            TokenService::new(&secrets, TokenLifetimes::default()).with_clock(clock.clone());
        (tokens, clock)
    }

    fn run(tokens: &TokenService, token: Option<&str>) -> RefreshState {
        RefreshFlow::new(tokens).submit(token).into_state()
    }

    #[test]
    fn starts_awaiting() {
        let (tokens, _) = service();
        let flow = RefreshFlow::new(&tokens);
        assert!(matches!(flow.state(), RefreshState::AwaitingRefresh));
        assert!(!flow.state().is_terminal());
    }

    #[test]
    fn missing_token_is_rejected() {
        let (tokens, _) = service();
        assert!(matches!(run(&tokens, None), RefreshState::Rejected(AuthError::MissingToken)));
        assert!(matches!(
            run(&tokens, Some("  ")),
            RefreshState::Rejected(AuthError::MissingToken)
        ));
    }

    #[test]
    fn valid_refresh_token_mints_access_token() {
        let (tokens, _) = service();
        let refresh = tokens
            .issue_refresh_token("abc", Some(AccountKind::Store))
            .unwrap();

        let refreshed = run(&tokens, Some(refresh.token.as_str())).into_result().unwrap();
        assert_eq!(refreshed.principal.principal_id, "abc");
        assert_eq!(refreshed.access.kind, TokenKind::Access);

        let verified = tokens
            .verify_kind(TokenKind::Access, &refreshed.access.token)
            .unwrap();
        assert_eq!(verified.principal_id, "abc");
        assert_eq!(verified.account_kind, Some(AccountKind::Store));
    }

    #[test]
    fn access_token_cannot_refresh() {
        let (tokens, _) = service();
        let access = tokens.issue_access_token("abc", None).unwrap();
        assert!(matches!(
            run(&tokens, Some(access.token.as_str())),
            RefreshState::Rejected(AuthError::InvalidToken(TokenRejection::BadSignature))
        ));
    }

    #[test]
    fn expired_refresh_token_is_rejected() {
        let (tokens, clock) = service();
        let refresh = tokens.issue_refresh_token("abc", None).unwrap();
        clock.advance(7 * 24 * 60 * 60);
        assert!(matches!(
            run(&tokens, Some(refresh.token.as_str())),
            RefreshState::Rejected(AuthError::InvalidToken(TokenRejection::Expired))
        ));
    }

    #[test]
    fn refreshing_twice_yields_distinct_tokens_with_fresh_expiry() {
        let (tokens, clock) = service();
        let refresh = tokens.issue_refresh_token("abc", None).unwrap();

        let first = run(&tokens, Some(refresh.token.as_str())).into_result().unwrap();
        clock.advance(60);
        let second = run(&tokens, Some(refresh.token.as_str())).into_result().unwrap();

        assert_ne!(first.access.token, second.access.token);
        assert_eq!(second.access.expires_at, first.access.expires_at + 60);
    }

    #[test]
    fn terminal_state_ignores_further_input() {
        let (tokens, _) = service();
        let refresh = tokens.issue_refresh_token("abc", None).unwrap();
        let flow = RefreshFlow::new(&tokens).submit(None).submit(Some(refresh.token.as_str()));
        assert!(matches!(
            flow.state(),
            RefreshState::Rejected(AuthError::MissingToken)
        ));
    }
}
