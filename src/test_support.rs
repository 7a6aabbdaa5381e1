// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderValue, StatusCode};

use crate::auth::password::hash_password;
use crate::auth::{AccountKind, TokenLifetimes, TokenSecrets, TokenService};
use crate::downstream::{
    DispatchError, Dispatcher, DownstreamResponse, OutboundRequest, ServiceRegistry,
};
use crate::models::Principal;
use crate::state::AppState;
use crate::store::InMemoryPrincipalStore;

pub const TEST_EMAIL: &str = "a@x.com";
pub const TEST_PASSWORD: &str = "p";
pub const TEST_PRINCIPAL_ID: &str = "abc";

/// Dispatcher that records every request and answers with a canned body.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub requests: Mutex<Vec<OutboundRequest>>,
    pub fail: bool,
}

impl RecordingDispatcher {
    pub fn last(&self) -> Option<OutboundRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn dispatch(&self, request: OutboundRequest) -> Result<DownstreamResponse, DispatchError> {
        let service = request.service.clone();
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(DispatchError::Request {
                service,
                reason: "connection refused".to_string(),
            });
        }
        Ok(DownstreamResponse {
            status: StatusCode::OK,
            content_type: Some(HeaderValue::from_static("application/json")),
            body: Bytes::from_static(br#"{"data":{}}"#),
        })
    }
}

pub fn test_tokens() -> TokenService {
    let secrets = TokenSecrets::new("test-access-secret", "test-refresh-secret").unwrap();
    TokenService::new(&secrets, TokenLifetimes::default())
}

/// App state with one principal (`a@x.com` / `p`) and a recording dispatcher.
pub async fn test_state() -> (AppState, Arc<RecordingDispatcher>) {
    test_state_with(RecordingDispatcher::default()).await
}

pub async fn test_state_with(
    dispatcher: RecordingDispatcher,
) -> (AppState, Arc<RecordingDispatcher>) {
    let store = InMemoryPrincipalStore::new();
    store
        .insert(Principal {
            id: TEST_PRINCIPAL_ID.to_string(),
            email: TEST_EMAIL.to_string(),
            password_hash: Some(hash_password(TEST_PASSWORD).unwrap()),
            account_kind: Some(AccountKind::Person),
        })
        .await;

    let dispatcher = Arc::new(dispatcher);
    let state = AppState::new(test_tokens(), Arc::new(store), dispatcher.clone())
        .with_services(ServiceRegistry::parse("users=http://users.test/graphql").unwrap());
    (state, dispatcher)
}
