// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session transport: tokens in cookies and bearer headers.
//!
//! ## Cookies
//!
//! | Name | Carries | Max-Age |
//! |------|---------|---------|
//! | `token` | access token | access lifetime |
//! | `refreshToken` | refresh token | refresh lifetime |
//!
//! Attributes come from [`CookieSettings`], built once from the deployment
//! mode. `SameSite=Lax` is always set.
//!
//! ## Read Order
//!
//! A request's token is the first non-empty value of: the `token` cookie,
//! the `refreshToken` cookie, the `Authorization: Bearer` header. Finding a
//! token says nothing about whether it is valid.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use super::tokens::{IssuedToken, TokenPair};
use crate::config::DeploymentMode;

pub const ACCESS_COOKIE_NAME: &str = "token";
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

const COOKIE_PATH: &str = "/";

/// Cookie attributes for the current deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    /// Parent domain shared by the gateway and the web app
    pub domain: Option<String>,
}

impl CookieSettings {
    /// Development relaxes everything so local tooling can read and send the
    /// cookies over plain HTTP. Other modes lock them down and scope them to
    /// `domain`.
    pub fn for_mode(mode: DeploymentMode, domain: Option<String>) -> Self {
        if mode.is_development() {
            Self {
                http_only: false,
                secure: false,
                same_site: SameSite::Lax,
                domain: None,
            }
        } else {
            Self {
                http_only: true,
                secure: true,
                same_site: SameSite::Lax,
                domain,
            }
        }
    }

    fn build(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site)
            .path(COOKIE_PATH)
            .max_age(max_age);
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        builder.build()
    }
}

/// Where a resolved token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    AccessCookie,
    RefreshCookie,
    BearerHeader,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub value: String,
    pub source: TokenSource,
}

fn token_cookie(token: &IssuedToken, name: &'static str, settings: &CookieSettings) -> Cookie<'static> {
    settings.build(
        name,
        token.token.clone(),
        Duration::seconds(token.lifetime.num_seconds()),
    )
}

/// Set both session cookies.
pub fn write_session(jar: CookieJar, pair: &TokenPair, settings: &CookieSettings) -> CookieJar {
    jar.add(token_cookie(&pair.access, ACCESS_COOKIE_NAME, settings))
        .add(token_cookie(&pair.refresh, REFRESH_COOKIE_NAME, settings))
}

/// Overwrite only the access cookie.
pub fn write_access_token(
    jar: CookieJar,
    access: &IssuedToken,
    settings: &CookieSettings,
) -> CookieJar {
    jar.add(token_cookie(access, ACCESS_COOKIE_NAME, settings))
}

/// Expire both session cookies.
///
/// Emitted explicitly rather than through `CookieJar::remove`, which only
/// produces a removal for cookies the client sent.
pub fn clear_session(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.add(settings.build(ACCESS_COOKIE_NAME, String::new(), Duration::ZERO))
        .add(settings.build(REFRESH_COOKIE_NAME, String::new(), Duration::ZERO))
}

fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Token from `Authorization: Bearer <token>`, if present and non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// The refresh cookie's value, if present and non-empty.
pub fn refresh_token(jar: &CookieJar) -> Option<String> {
    cookie_value(jar, REFRESH_COOKIE_NAME)
}

/// Resolve the request token using the documented read order.
pub fn resolve_token(jar: &CookieJar, headers: &HeaderMap) -> Option<ResolvedToken> {
    if let Some(value) = cookie_value(jar, ACCESS_COOKIE_NAME) {
        return Some(ResolvedToken {
            value,
            source: TokenSource::AccessCookie,
        });
    }
    if let Some(value) = cookie_value(jar, REFRESH_COOKIE_NAME) {
        return Some(ResolvedToken {
            value,
            source: TokenSource::RefreshCookie,
        });
    }
    bearer_token(headers).map(|value| ResolvedToken {
        value,
        source: TokenSource::BearerHeader,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenKind;
    use axum::http::{header::COOKIE, HeaderValue};
    use axum::response::IntoResponse;

    fn issued(kind: TokenKind, value: &str, lifetime: chrono::Duration) -> IssuedToken {
        IssuedToken {
            token: value.to_string(),
            kind,
            issued_at: 0,
            expires_at: lifetime.num_seconds(),
            lifetime,
        }
    }

    fn pair() -> TokenPair {
        TokenPair {
            access: issued(TokenKind::Access, "acc", chrono::Duration::minutes(15)),
            refresh: issued(TokenKind::Refresh, "ref", chrono::Duration::days(7)),
        }
    }

    fn set_cookies(jar: CookieJar) -> Vec<String> {
        let response = jar.into_response();
        response
            .headers()
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    fn find<'a>(cookies: &'a [String], name: &str) -> &'a str {
        cookies
            .iter()
            .find(|c| c.starts_with(&format!("{name}=")))
            .map(String::as_str)
            .unwrap()
    }

    fn request_headers(cookie: Option<&str>, bearer: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        if let Some(token) = bearer {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
            );
        }
        headers
    }

    #[test]
    fn production_cookies_are_locked_down() {
        let settings = CookieSettings::for_mode(DeploymentMode::Production, Some("example.com".into()));
        let cookies = set_cookies(write_session(CookieJar::new(), &pair(), &settings));

        let access = find(&cookies, ACCESS_COOKIE_NAME);
        assert!(access.starts_with("token=acc"));
        assert!(access.contains("HttpOnly"));
        assert!(access.contains("Secure"));
        assert!(access.contains("SameSite=Lax"));
        assert!(access.contains("Domain=example.com"));
        assert!(access.contains("Max-Age=900"));

        let refresh = find(&cookies, REFRESH_COOKIE_NAME);
        assert!(refresh.starts_with("refreshToken=ref"));
        assert!(refresh.contains("Max-Age=604800"));
    }

    #[test]
    fn development_cookies_are_relaxed() {
        let settings = CookieSettings::for_mode(DeploymentMode::Development, Some("example.com".into()));
        assert_eq!(settings.domain, None);

        let cookies = set_cookies(write_session(CookieJar::new(), &pair(), &settings));
        let access = find(&cookies, ACCESS_COOKIE_NAME);
        assert!(!access.contains("HttpOnly"));
        assert!(!access.contains("Secure"));
        assert!(!access.contains("Domain"));
        assert!(access.contains("SameSite=Lax"));
    }

    #[test]
    fn qa_without_domain_sets_no_domain() {
        let settings = CookieSettings::for_mode(DeploymentMode::Qa, None);
        assert!(settings.secure);
        let cookies = set_cookies(write_session(CookieJar::new(), &pair(), &settings));
        assert!(!find(&cookies, ACCESS_COOKIE_NAME).contains("Domain"));
    }

    #[test]
    fn write_access_token_leaves_refresh_cookie_alone() {
        let settings = CookieSettings::for_mode(DeploymentMode::Development, None);
        let access = issued(TokenKind::Access, "new", chrono::Duration::minutes(15));
        let cookies = set_cookies(write_access_token(CookieJar::new(), &access, &settings));
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("token=new"));
    }

    #[test]
    fn clear_session_expires_both_cookies() {
        let settings = CookieSettings::for_mode(DeploymentMode::Production, Some("example.com".into()));
        let cookies = set_cookies(clear_session(CookieJar::new(), &settings));
        assert_eq!(cookies.len(), 2);
        for cookie in &cookies {
            assert!(cookie.contains("Max-Age=0"));
            assert!(cookie.contains("Domain=example.com"));
        }
    }

    #[test]
    fn access_cookie_wins() {
        let headers = request_headers(Some("token=a; refreshToken=r"), Some("b"));
        let jar = CookieJar::from_headers(&headers);
        let resolved = resolve_token(&jar, &headers).unwrap();
        assert_eq!(resolved.value, "a");
        assert_eq!(resolved.source, TokenSource::AccessCookie);
    }

    #[test]
    fn refresh_cookie_is_second() {
        let headers = request_headers(Some("token=; refreshToken=r"), Some("b"));
        let jar = CookieJar::from_headers(&headers);
        let resolved = resolve_token(&jar, &headers).unwrap();
        assert_eq!(resolved.value, "r");
        assert_eq!(resolved.source, TokenSource::RefreshCookie);
    }

    #[test]
    fn bearer_header_is_last() {
        let headers = request_headers(None, Some("b"));
        let jar = CookieJar::from_headers(&headers);
        let resolved = resolve_token(&jar, &headers).unwrap();
        assert_eq!(resolved.value, "b");
        assert_eq!(resolved.source, TokenSource::BearerHeader);
    }

    #[test]
    fn nothing_resolves_to_none() {
        let mut headers = request_headers(Some("theme=dark"), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        let jar = CookieJar::from_headers(&headers);
        assert!(resolve_token(&jar, &headers).is_none());
        assert!(refresh_token(&jar).is_none());
    }
}
