// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Downstream Services
//!
//! The gateway forwards client requests to backend services. This module
//! holds the pieces the identity layer needs around that call:
//!
//! - [`ServiceRegistry`] - name to URL table, chosen per deployment mode
//! - [`Dispatcher`] - the seam to whatever performs the outbound call
//! - [`propagate`] - attaches verified identity to outbound headers
//! - [`client`] - reqwest-backed [`Dispatcher`]
//!
//! Query planning and fan-out are the dispatcher's business, not ours.

use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use url::Url;

use crate::config::DeploymentMode;

pub mod client;
pub mod propagate;

pub use client::HttpDispatcher;
pub use propagate::{propagate_identity, ACCOUNT_KIND_HEADER, USER_ID_HEADER};

/// Downstream services addressable by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRegistry {
    services: BTreeMap<String, Url>,
}

impl ServiceRegistry {
    /// Built-in table for each deployment mode.
    pub fn defaults_for(mode: DeploymentMode) -> Self {
        let table: &[(&str, &str)] = match mode {
            DeploymentMode::Development => &[
                ("users", "http://localhost:4001/graphql"),
                ("products", "http://localhost:4002/graphql"),
            ],
            DeploymentMode::Qa => &[
                ("users", "http://users_subgraph_qa:4101/graphql"),
                ("products", "http://products_subgraph_qa:4102/graphql"),
            ],
            DeploymentMode::Production => &[
                ("users", "http://users_subgraph_prod:4001/graphql"),
                ("products", "http://products_subgraph_prod:4002/graphql"),
            ],
        };

        let services = table
            .iter()
            .filter_map(|(name, url)| Url::parse(url).ok().map(|u| (name.to_string(), u)))
            .collect();
        Self { services }
    }

    /// Parse `name=url,name=url`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut services = BTreeMap::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, url) = entry
                .split_once('=')
                .ok_or_else(|| format!("expected name=url, got '{entry}'"))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(format!("missing service name in '{entry}'"));
            }
            let url = Url::parse(url.trim()).map_err(|e| format!("{name}: {e}"))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(format!("{name}: unsupported scheme '{}'", url.scheme()));
            }
            services.insert(name.to_string(), url);
        }
        if services.is_empty() {
            return Err("no services listed".to_string());
        }
        Ok(Self { services })
    }

    pub fn get(&self, name: &str) -> Option<&Url> {
        self.services.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }
}

/// A request the gateway is about to send downstream.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub service: String,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// What came back from downstream.
#[derive(Debug, Clone)]
pub struct DownstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request to {service} failed: {reason}")]
    Request { service: String, reason: String },
}

#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, request: OutboundRequest) -> Result<DownstreamResponse, DispatchError>;
}
