// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification.
//!
//! ## Token Families
//!
//! | Kind | Secret | Default lifetime |
//! |------|--------|------------------|
//! | access | `JWT_SECRET` | 15 minutes |
//! | refresh | `JWT_REFRESH_SECRET` | 7 days |
//!
//! Tokens are HS256 JWTs and are never persisted: verification is a pure
//! function of the token, the two secrets and the current time.
//!
//! ## Verification Policies
//!
//! - [`TokenService::verify`] accepts either family: the access secret is
//!   tried first and the refresh secret second. This lets one transport slot
//!   carry whichever token the client has.
//! - [`TokenService::verify_kind`] checks exactly one secret and asserts the
//!   `kind` claim. Operations that depend on the token family use this.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::account::AccountKind;
use super::claims::{AuthenticatedPrincipal, TokenClaims, TokenKind};
use super::error::{AuthError, TokenRejection};
use crate::config::ConfigError;

/// Source of the current Unix time in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// The two signing secrets. Always distinct.
#[derive(Clone)]
pub struct TokenSecrets {
    access: String,
    refresh: String,
}

impl TokenSecrets {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Result<Self, ConfigError> {
        let access = access.into();
        let refresh = refresh.into();
        if access.is_empty() {
            return Err(ConfigError::Missing(crate::config::JWT_SECRET_ENV));
        }
        if refresh.is_empty() {
            return Err(ConfigError::Missing(crate::config::JWT_REFRESH_SECRET_ENV));
        }
        if access == refresh {
            return Err(ConfigError::SharedSecret);
        }
        Ok(Self { access, refresh })
    }

    fn for_kind(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => self.access.as_bytes(),
            TokenKind::Refresh => self.refresh.as_bytes(),
        }
    }
}

impl std::fmt::Debug for TokenSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSecrets")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Token lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: chrono::Duration,
    pub refresh: chrono::Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: chrono::Duration::minutes(15),
            refresh: chrono::Duration::days(7),
        }
    }
}

impl TokenLifetimes {
    pub fn for_kind(&self, kind: TokenKind) -> chrono::Duration {
        match kind {
            TokenKind::Access => self.access,
            TokenKind::Refresh => self.refresh,
        }
    }
}

/// A freshly signed token together with its timing.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub kind: TokenKind,
    pub issued_at: i64,
    pub expires_at: i64,
    pub lifetime: chrono::Duration,
}

/// Access and refresh token minted together at login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Token issuer and verifier.
pub struct TokenService {
    access_keys: KeyPair,
    refresh_keys: KeyPair,
    lifetimes: TokenLifetimes,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secrets: &TokenSecrets, lifetimes: TokenLifetimes) -> Self {
        Self {
            access_keys: KeyPair::from_secret(secrets.for_kind(TokenKind::Access)),
            refresh_keys: KeyPair::from_secret(secrets.for_kind(TokenKind::Refresh)),
            lifetimes,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for `iat`/`exp` and expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access_keys,
            TokenKind::Refresh => &self.refresh_keys,
        }
    }

    /// Mint a token of the given kind for `principal_id`.
    pub fn issue(
        &self,
        kind: TokenKind,
        principal_id: &str,
        account_kind: Option<AccountKind>,
    ) -> Result<IssuedToken, AuthError> {
        let lifetime = self.lifetimes.for_kind(kind);
        let issued_at = self.clock.now();
        let expires_at = issued_at
            .checked_add(lifetime.num_seconds())
            .ok_or_else(|| AuthError::Internal(format!("{kind} token lifetime overflows")))?;

        let claims = TokenClaims {
            sub: principal_id.to_string(),
            kind,
            iat: issued_at,
            exp: expires_at,
            jti: Uuid::new_v4().to_string(),
            acct: account_kind,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys(kind).encoding,
        )
        .map_err(|e| AuthError::Internal(format!("failed to sign {kind} token: {e}")))?;

        Ok(IssuedToken {
            token,
            kind,
            issued_at,
            expires_at,
            lifetime,
        })
    }

    pub fn issue_access_token(
        &self,
        principal_id: &str,
        account_kind: Option<AccountKind>,
    ) -> Result<IssuedToken, AuthError> {
        self.issue(TokenKind::Access, principal_id, account_kind)
    }

    pub fn issue_refresh_token(
        &self,
        principal_id: &str,
        account_kind: Option<AccountKind>,
    ) -> Result<IssuedToken, AuthError> {
        self.issue(TokenKind::Refresh, principal_id, account_kind)
    }

    pub fn issue_pair(
        &self,
        principal_id: &str,
        account_kind: Option<AccountKind>,
    ) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.issue_access_token(principal_id, account_kind)?,
            refresh: self.issue_refresh_token(principal_id, account_kind)?,
        })
    }

    /// Verify a token of either kind.
    ///
    /// The access secret is tried first; on any failure the refresh secret is
    /// tried. A success here does not mean the token is an access token.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedPrincipal, AuthError> {
        match self.decode_with(TokenKind::Access, token) {
            Ok(claims) => Ok(AuthenticatedPrincipal::from_claims(claims)),
            Err(access_rejection) => {
                tracing::debug!(
                    reason = access_rejection.as_str(),
                    "access secret rejected token, trying refresh secret"
                );
                self.decode_with(TokenKind::Refresh, token)
                    .map(AuthenticatedPrincipal::from_claims)
                    .map_err(|refresh_rejection| {
                        tracing::debug!(
                            reason = refresh_rejection.as_str(),
                            "token rejected by both secrets"
                        );
                        AuthError::InvalidToken(refresh_rejection)
                    })
            }
        }
    }

    /// Verify a token against the secret of `kind` only, and require the
    /// `kind` claim to match.
    pub fn verify_kind(
        &self,
        kind: TokenKind,
        token: &str,
    ) -> Result<AuthenticatedPrincipal, AuthError> {
        let claims = self
            .decode_with(kind, token)
            .map_err(AuthError::InvalidToken)?;
        if claims.kind != kind {
            return Err(AuthError::InvalidToken(TokenRejection::WrongKind));
        }
        Ok(AuthenticatedPrincipal::from_claims(claims))
    }

    fn decode_with(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, TokenRejection> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<TokenClaims>(token, &self.keys(kind).decoding, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                _ => TokenRejection::Malformed,
            },
        )?;

        if data.claims.exp <= self.clock.now() {
            return Err(TokenRejection::Expired);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
pub(crate) mod test_clock {
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::Clock;

    /// Manually advanced clock.
    #[derive(Debug)]
    pub struct FixedClock(AtomicI64);

    impl FixedClock {
        pub fn new(now: i64) -> Self {
            Self(AtomicI64::new(now))
        }

        pub fn advance(&self, secs: i64) {
            self.0.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }
}
