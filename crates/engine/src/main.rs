//! tf2bdd - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tf2bdd_engine::api;
use tf2bdd_engine::app::App;
use tf2bdd_engine::infrastructure::{
    clock::SystemClock, config::AppConfig, discord, http_fetcher::HttpDocumentFetcher,
    sqlite::SqlitePlayerRepo, steam_api::SteamWebApi,
};

/// How long in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root, then the working directory.
    load_dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tf2bdd_engine=debug,tf2bdd=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting tf2bdd");

    // Load configuration
    let config = AppConfig::from_env()?;
    config.validate()?;

    tracing::info!(path = %config.database_path, "Opening player database");
    let players = Arc::new(SqlitePlayerRepo::new(&config.database_path).await?);

    let app = Arc::new(App::new(
        &config,
        players.clone(),
        Arc::new(SteamWebApi::new(&config.steam_key)),
        Arc::new(HttpDocumentFetcher::new()),
        Arc::new(SystemClock::new()),
    )?);

    if !config.master_list_url.is_empty() {
        match app.use_cases.master_list.execute(&config.master_list_url).await {
            Ok(added) => tracing::info!(added, "Loaded master list"),
            Err(e) => tracing::warn!(error = %e, "Failed to load master list"),
        }
    }

    tracing::info!(url = %config.discord_invite_url(), "Add the bot to a server");

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    // Discord gateway
    let mut client = discord::build_client(&config.discord_bot_token, app.dispatcher.clone()).await?;
    let shard_manager = client.shard_manager.clone();
    let bot_shutdown = shutdown.clone();
    let bot = tokio::spawn(async move {
        if let Err(e) = client.start().await {
            tracing::error!(error = %e, "Discord client stopped");
            bot_shutdown.cancel();
        }
    });

    // HTTP export
    let router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = tokio::net::lookup_host(config.listen_addr())
        .await?
        .next()
        .ok_or_else(|| anyhow::anyhow!("Cannot resolve listen address {}", config.listen_addr()))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    tracing::info!(url = %config.update_url()?, "Serving player list");

    let server_shutdown = shutdown.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(server_shutdown.cancelled_owned())
            .await
    });

    shutdown.cancelled().await;
    tracing::info!("Shutting down");

    discord::shutdown(shard_manager).await;
    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "HTTP server failed"),
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server task panicked"),
        Err(_) => tracing::warn!("HTTP server did not stop in time"),
    }
    if tokio::time::timeout(SHUTDOWN_GRACE, bot).await.is_err() {
        tracing::warn!("Discord client did not stop in time");
    }

    players.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Cancel `token` on Ctrl-C or SIGTERM.
async fn watch_signals(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = token.cancelled() => return,
    }
    token.cancel();
}

fn load_dotenv() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for dir in [repo_root, std::path::PathBuf::from(".")] {
        for filename in [".env.local", ".env"] {
            let path = dir.join(filename);
            if path.exists() {
                let _ = dotenvy::from_path(path);
            }
        }
    }
}
