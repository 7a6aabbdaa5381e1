// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway Identity - authentication layer of the API gateway
//!
//! Verifies credentials, issues and verifies access/refresh tokens, moves
//! them between client and gateway in cookies or bearer headers, and attaches
//! the verified identity to requests forwarded to downstream services.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Credentials, tokens, session cookies and refresh
//! - `downstream` - Service registry and identity propagation
//! - `store` - Principal lookup

pub mod api;
pub mod auth;
pub mod config;
pub mod downstream;
pub mod error;
pub mod models;
pub mod state;
pub mod store;

#[cfg(test)]
mod test_support;
