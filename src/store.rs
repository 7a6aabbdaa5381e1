// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Principal store.
//!
//! The gateway does not own account data. [`PrincipalStore`] is the seam to
//! whatever system does; [`InMemoryPrincipalStore`] backs tests and
//! single-node deployments seeded at startup.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::Principal;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("principal store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Look up a principal by an already-normalized (lowercase) email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Principal>>;
}

#[derive(Default)]
pub struct InMemoryPrincipalStore {
    by_email: RwLock<HashMap<String, Principal>>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a principal. The email is stored lowercase.
    pub async fn insert(&self, mut principal: Principal) {
        principal.email = principal.email.to_lowercase();
        self.by_email
            .write()
            .await
            .insert(principal.email.clone(), principal);
    }

    pub async fn len(&self) -> usize {
        self.by_email.read().await.len()
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Principal>> {
        Ok(self.by_email.read().await.get(email).cloned())
    }
}
