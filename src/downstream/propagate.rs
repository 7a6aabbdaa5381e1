// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity propagation to downstream services.
//!
//! Downstream services sit behind the gateway and trust it as the perimeter:
//! they read the caller from `x-user-id` instead of verifying tokens
//! themselves, so no service other than the gateway needs the secrets.
//!
//! | Header | Value | Set when |
//! |--------|-------|----------|
//! | `Authorization` | `Bearer <caller token>` | identity verified |
//! | `x-user-id` | principal id | identity verified |
//! | `x-account-kind` | account kind | identity verified and kind known |
//!
//! An anonymous request carries none of them. Downstream must read absence
//! as "unauthenticated", never as an empty identity.

use axum::http::{
    header::{HeaderName, AUTHORIZATION},
    HeaderMap, HeaderValue,
};

use crate::auth::ResolvedIdentity;

pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");
pub const ACCOUNT_KIND_HEADER: HeaderName = HeaderName::from_static("x-account-kind");

/// Write the caller's identity into outbound `headers`.
///
/// Any identity headers already present are dropped first, so a client can
/// never smuggle its own `x-user-id` through the gateway. Never fails: if
/// the identity cannot be encoded the request goes out anonymous.
pub fn propagate_identity(identity: &ResolvedIdentity, headers: &mut HeaderMap) {
    headers.remove(AUTHORIZATION);
    headers.remove(USER_ID_HEADER);
    headers.remove(ACCOUNT_KIND_HEADER);

    let ResolvedIdentity::Verified { token, principal } = identity else {
        return;
    };
    if principal.principal_id.is_empty() {
        tracing::warn!("verified token has an empty subject, forwarding as anonymous");
        return;
    }

    let (Ok(bearer), Ok(user_id)) = (
        HeaderValue::from_str(&format!("Bearer {token}")),
        HeaderValue::from_str(&principal.principal_id),
    ) else {
        tracing::warn!("identity is not a valid header value, forwarding as anonymous");
        return;
    };

    headers.insert(AUTHORIZATION, bearer);
    headers.insert(USER_ID_HEADER, user_id);
    if let Some(kind) = principal.account_kind {
        headers.insert(ACCOUNT_KIND_HEADER, HeaderValue::from_static(kind.as_str()));
    }
}
