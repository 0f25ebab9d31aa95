use clap::Parser;
use dotenvy::dotenv;
use rust_filestore_bot::api::poller::UpdatePoller;
use rust_filestore_bot::config::BotConfig;
use rust_filestore_bot::infrastructure::{database, transport};
use rust_filestore_bot::services::scheduler::AutoDeleteScheduler;
use rust_filestore_bot::{AppState, create_health_router};
use std::net::SocketAddr;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Service to run (bot, health, all)
    #[arg(short, long, default_value = "all")]
    mode: String,

    /// Port for the health endpoint (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Environment & logging
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_filestore_bot=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting file store bot [Mode: {}]...", args.mode);

    let mut config = BotConfig::from_env();
    if let Some(port) = args.port {
        config.health_check_port = port;
    }

    // 2. Health endpoint on its own thread and runtime
    let _health_thread = if args.mode == "health" || args.mode == "all" {
        Some(spawn_health_server(config.health_check_port)?)
    } else {
        None
    };

    if args.mode == "health" {
        shutdown_signal().await;
        info!("👋 Health server exiting.");
        return Ok(());
    }

    // 3. Bot infrastructure
    config.validate()?;
    info!(
        "🛡️  Config: Admins={}, Auto-delete={}s, Max Size={}MB",
        config.admin_ids.len(),
        config.auto_delete_secs,
        config.max_file_size / 1024 / 1024
    );

    let db = database::setup_database(&config).await?;
    let telegram = transport::setup_transport(&config)?;

    // 4. Shutdown channel shared by the background loops
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let (scheduler, scheduler_handle) =
        AutoDeleteScheduler::spawn(telegram.clone(), shutdown_rx.clone());

    let state = AppState::new(db, config, telegram.clone(), scheduler);
    let poller = UpdatePoller::new(telegram, state, shutdown_rx);
    let poller_handle = tokio::spawn(poller.run());
    info!("🤖 Bot is running...");

    // 5. Wait for shutdown
    shutdown_signal().await;
    let _ = shutdown_tx.send(true);

    info!("🛑 Shutting down bot services...");
    let _ = poller_handle.await;
    let _ = scheduler_handle.await;

    info!("👋 Bot exited cleanly.");
    Ok(())
}

/// Serves `/healthz` from a dedicated OS thread with a private runtime.
fn spawn_health_server(port: u16) -> anyhow::Result<std::thread::JoinHandle<()>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = std::net::TcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;

    let handle = std::thread::Builder::new()
        .name("health-server".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!("❌ Health runtime failed to start: {}", e);
                    return;
                }
            };

            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(listener) {
                    Ok(l) => l,
                    Err(e) => {
                        error!("❌ Health listener error: {}", e);
                        return;
                    }
                };

                let app = create_health_router().layer(TraceLayer::new_for_http());
                info!("✅ Health check listening on: http://0.0.0.0:{}/healthz", port);

                if let Err(e) = axum::serve(listener, app).await {
                    error!("❌ Health server error: {}", e);
                }
            });
        })?;

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, initiating graceful shutdown...");
        },
    }
}
