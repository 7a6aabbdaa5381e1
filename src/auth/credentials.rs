// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Email/password verification against the principal store.

use std::sync::Arc;

use super::error::AuthError;
use super::password::verify_password;
use crate::models::Principal;
use crate::store::PrincipalStore;

/// Checks submitted credentials. Has no side effects beyond the store lookup.
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn PrincipalStore>,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn PrincipalStore>) -> Self {
        Self { store }
    }

    /// Return the principal registered under `email` if `password` matches.
    ///
    /// The email is compared lowercase. Hash comparison runs on the blocking
    /// pool since Argon2 is deliberately slow.
    pub async fn verify(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let email = email.to_lowercase();
        let principal = self
            .store
            .find_by_email(&email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        let Some(hash) = principal.password_hash.clone() else {
            return Err(AuthError::InvalidCredentials);
        };

        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&hash, &password))
            .await
            .map_err(|e| AuthError::Internal(format!("password check aborted: {e}")))?;

        if !matches {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::auth::AccountKind;
    use crate::store::{InMemoryPrincipalStore, StoreError, StoreResult};
    use async_trait::async_trait;

    async fn verifier() -> CredentialVerifier {
        let store = InMemoryPrincipalStore::new();
        store
            .insert(Principal {
                id: "abc".to_string(),
                email: "a@x.com".to_string(),
                password_hash: Some(hash_password("p").unwrap()),
                account_kind: Some(AccountKind::Person),
            })
            .await;
        store
            .insert(Principal {
                id: "svc".to_string(),
                email: "svc@x.com".to_string(),
                password_hash: None,
                account_kind: Some(AccountKind::Service),
            })
            .await;
        CredentialVerifier::new(Arc::new(store))
    }

    #[tokio::test]
    async fn email_match_is_case_insensitive() {
        let principal = verifier().await.verify("A@x.com", "p").await.unwrap();
        assert_eq!(principal.id, "abc");
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let result = verifier().await.verify("b@x.com", "p").await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let result = verifier().await.verify("a@x.com", "nope").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn principal_without_hash_cannot_log_in() {
        let result = verifier().await.verify("svc@x.com", "").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    struct DownStore;

    #[async_trait]
    impl PrincipalStore for DownStore {
        async fn find_by_email(&self, _email: &str) -> StoreResult<Option<Principal>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn store_failure_is_internal() {
        let result = CredentialVerifier::new(Arc::new(DownStore))
            .verify("a@x.com", "p")
            .await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }
}
