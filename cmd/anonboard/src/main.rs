//! # anonboard
//!
//! The entry point: assembles the store, hasher and services selected by
//! configuration and serves them over HTTP.

mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use api_adapters::web::{create_router, AppState, RouterConfig};
use auth_adapters::Argon2PasswordHasher;
use configs::{DatabaseBackend, Settings};
use domains::{ListingLimits, ThreadRepository};
use services::{ReplyService, ThreadService};
use storage_adapters::InMemoryThreadRepository;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = configs::load_dotenv();
    let settings = Settings::load().context("loading configuration")?;
    telemetry::init(&settings.log);
    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    // 1. Store (migrations run before the listener binds)
    let repo = build_repository(&settings).await?;

    // 2. Delete-password hasher
    let hasher = Arc::new(Argon2PasswordHasher::new(
        settings.password.memory_kib,
        settings.password.iterations,
        settings.password.parallelism,
    )?);

    // 3. Services and router
    let limits = ListingLimits {
        thread_limit: settings.board.thread_limit,
        reply_preview: settings.board.reply_preview,
        deleted_placeholder: settings.board.deleted_placeholder.clone(),
    };
    let replies = ReplyService::new(repo.clone(), hasher.clone(), &limits);
    let threads = ThreadService::new(repo, hasher, limits);

    let router_config = RouterConfig {
        views_dir: PathBuf::from(&settings.web.views_dir),
        public_dir: PathBuf::from(&settings.web.public_dir),
        cors_any_origin: settings.web.cors_any_origin,
    };
    let app = create_router(AppState::new(threads, replies), &router_config);

    let addr = settings.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("anonboard listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn build_repository(settings: &Settings) -> anyhow::Result<Arc<dyn ThreadRepository>> {
    match settings.database.backend {
        DatabaseBackend::Memory => {
            tracing::warn!("using the in-memory store; threads are lost on restart");
            Ok(Arc::new(InMemoryThreadRepository::new()))
        }
        #[cfg(feature = "db-postgres")]
        DatabaseBackend::Postgres => {
            use secrecy::ExposeSecret;

            let url = settings
                .database
                .url
                .as_ref()
                .context("database.url is required for the postgres backend")?;
            let repo = storage_adapters::PostgresThreadRepository::connect(
                url.expose_secret(),
                settings.database.max_connections,
            )
            .await
            .context("connecting to postgres")?;
            tracing::info!("connected to postgres, migrations applied");
            Ok(Arc::new(repo))
        }
        #[cfg(not(feature = "db-postgres"))]
        DatabaseBackend::Postgres => {
            anyhow::bail!("this build has no postgres support; enable the db-postgres feature")
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
