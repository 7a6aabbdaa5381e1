// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity-resolving middleware for Axum.
//!
//! Resolves the caller once per request and stores the resulting
//! [`ResolvedIdentity`] in the request extensions, where the extractors in
//! `extractor.rs` pick it up. Never rejects: anonymous requests pass through.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/graphql/{service}", post(forward))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), resolve_identity));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::extractor::ResolvedIdentity;
use crate::state::AppState;

pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = ResolvedIdentity::resolve(request.headers(), &state.tokens);
    request.extensions_mut().insert(identity);
    next.run(request).await
}
