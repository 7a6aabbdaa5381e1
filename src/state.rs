// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{CookieSettings, CredentialVerifier, TokenService};
use crate::config::{DeploymentMode, GatewayConfig, DEFAULT_DOWNSTREAM_TIMEOUT};
use crate::downstream::{Dispatcher, ServiceRegistry};
use crate::store::PrincipalStore;

/// Shared, immutable per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub mode: DeploymentMode,
    pub tokens: Arc<TokenService>,
    pub credentials: CredentialVerifier,
    pub cookies: Arc<CookieSettings>,
    pub services: Arc<ServiceRegistry>,
    pub dispatcher: Arc<dyn Dispatcher>,
    pub downstream_timeout: Duration,
}

impl AppState {
    pub fn new(
        tokens: TokenService,
        principals: Arc<dyn PrincipalStore>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        let mode = DeploymentMode::default();
        Self {
            mode,
            tokens: Arc::new(tokens),
            credentials: CredentialVerifier::new(principals),
            cookies: Arc::new(CookieSettings::for_mode(mode, None)),
            services: Arc::new(ServiceRegistry::defaults_for(mode)),
            dispatcher,
            downstream_timeout: DEFAULT_DOWNSTREAM_TIMEOUT,
        }
    }

    /// Build state from loaded configuration.
    pub fn from_config(
        config: &GatewayConfig,
        principals: Arc<dyn PrincipalStore>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        let tokens = TokenService::new(&config.secrets, config.lifetimes);
        Self::new(tokens, principals, dispatcher)
            .with_mode(config.mode)
            .with_cookies(config.cookies.clone())
            .with_services(config.services.clone())
            .with_downstream_timeout(config.downstream_timeout)
    }

    pub fn with_mode(mut self, mode: DeploymentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cookies(mut self, cookies: CookieSettings) -> Self {
        self.cookies = Arc::new(cookies);
        self
    }

    pub fn with_services(mut self, services: ServiceRegistry) -> Self {
        self.services = Arc::new(services);
        self
    }

    pub fn with_downstream_timeout(mut self, timeout: Duration) -> Self {
        self.downstream_timeout = timeout;
        self
    }
}
