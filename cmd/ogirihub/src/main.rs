//! # OgiriHub Binary
//!
//! The entry point that assembles the service: configuration, tracing, the
//! in-process store and session provider, the expiry sweeper, and the HTTP
//! surface.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use api_adapters::metrics::Metrics;
use api_adapters::{router, AppState};
use auth_adapters::{NewUser, SessionAuth};
use configs::AppConfig;
use secrecy::ExposeSecret;
use services::{ExpirySweeper, OgiriService, SystemClock, ThreadService};
use storage_adapters::MemoryStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = AppConfig::load().context("loading configuration")?;

    // Adapters
    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(SessionAuth::new());
    auth.register(NewUser {
        email: cfg.admin.email.clone(),
        password: cfg.admin.password.expose_secret().to_owned(),
        display_name: cfg.admin.display_name.clone(),
        photo_url: None,
    })
    .context("registering admin account")?;

    // Services
    let clock = Arc::new(SystemClock);
    let threads = Arc::new(ThreadService::new(store.clone(), clock.clone()));
    let ogiri = Arc::new(OgiriService::new(store.clone(), store.clone(), clock));

    // Authoritative expiry driver
    let sweeper = ExpirySweeper::new(
        ogiri.clone(),
        store.clone(),
        Duration::from_secs(cfg.sweeper.interval_secs),
    );
    let sweeper_task = tokio::spawn(sweeper.run());

    let state = AppState {
        auth,
        threads,
        ogiri,
        metrics: Arc::new(Metrics::new()),
    };

    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "ogirihub listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await
        .context("serving HTTP")?;

    sweeper_task.abort();
    Ok(())
}
