// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, sync::Arc, time::Duration};

use axum_server::Handle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gateway_identity::{
    api::{cors_layer, router},
    auth::{password::hash_password, AccountKind},
    config::{
        GatewayConfig, LogFormat, DEFAULT_LOG_FILTER, SEED_PRINCIPAL_EMAIL_ENV,
        SEED_PRINCIPAL_KIND_ENV, SEED_PRINCIPAL_PASSWORD_ENV,
    },
    downstream::HttpDispatcher,
    models::Principal,
    state::AppState,
    store::InMemoryPrincipalStore,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Insert the optional bootstrap principal from the environment.
async fn seed_principal(store: &InMemoryPrincipalStore) {
    let (Ok(email), Ok(password)) = (
        env::var(SEED_PRINCIPAL_EMAIL_ENV),
        env::var(SEED_PRINCIPAL_PASSWORD_ENV),
    ) else {
        return;
    };

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "failed to hash seed principal password");
            return;
        }
    };
    let account_kind = env::var(SEED_PRINCIPAL_KIND_ENV)
        .ok()
        .and_then(|kind| AccountKind::from_str(&kind));

    store
        .insert(Principal {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            password_hash: Some(password_hash),
            account_kind,
        })
        .await;
    tracing::info!("seed principal registered");
}

async fn shutdown_signal(handle: Handle<std::net::SocketAddr>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

#[tokio::main]
async fn main() {
    let config = GatewayConfig::from_env();
    // A broken config still gets its error logged, in the default format.
    init_tracing(config.as_ref().map(|c| c.log_format).unwrap_or_default());

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    if !config.mode.is_development() && config.cookies.domain.is_none() {
        tracing::warn!(
            mode = %config.mode,
            "COOKIE_DOMAIN is not set; session cookies will be host-only"
        );
    }

    let store = InMemoryPrincipalStore::new();
    seed_principal(&store).await;

    let dispatcher = match HttpDispatcher::new() {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            tracing::error!(error = %e, "failed to build downstream client");
            std::process::exit(1);
        }
    };

    let cors = match cors_layer(&config.cors_origin) {
        Ok(cors) => cors,
        Err(e) => {
            tracing::error!(error = %e, origin = %config.cors_origin, "invalid CORS origin");
            std::process::exit(1);
        }
    };

    let state = AppState::from_config(&config, Arc::new(store), Arc::new(dispatcher));
    let app = router(state).layer(cors);

    let addr = config.bind_addr;
    tracing::info!(
        %addr,
        mode = %config.mode,
        services = ?config.services.names().collect::<Vec<_>>(),
        "gateway identity listening (docs at /docs)"
    );

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    if let Err(e) = axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
    {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}
