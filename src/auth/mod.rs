// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Identity layer of the gateway: credential checks, token issuance and
//! verification, cookie/bearer transport, and refresh.
//!
//! ## Auth Flow
//!
//! 1. Client posts `{email, password}` to `/session`
//! 2. Gateway:
//!    - looks up the principal by lowercase email and checks the Argon2 hash
//!    - mints an access token (15 min) and a refresh token (7 days), each
//!      signed with its own secret
//!    - sets the `token` and `refreshToken` cookies
//! 3. Later requests carry a token in a cookie or `Authorization: Bearer`
//! 4. When the access token expires, `/session/refresh` trades the refresh
//!    cookie for a new access token
//!
//! ## Security
//!
//! - Access and refresh secrets must differ
//! - Tokens carry an explicit `kind` claim; refresh checks it
//! - Sessions are stateless: there is no revocation list

pub mod account;
pub mod claims;
pub mod cookies;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod refresh;
pub mod tokens;

pub use account::AccountKind;
pub use claims::{AuthenticatedPrincipal, TokenClaims, TokenKind};
pub use cookies::CookieSettings;
pub use credentials::CredentialVerifier;
pub use error::{AuthError, TokenRejection};
pub use extractor::{Auth, ResolvedIdentity};
pub use refresh::{RefreshFlow, RefreshState};
pub use tokens::{TokenLifetimes, TokenPair, TokenSecrets, TokenService};
