//! metrix collector
//!
//! - Ingestion: /update/ (path segments or JSON envelope)
//! - Query: /value/ and the HTML listing at /
//! - Durability: periodic snapshots, or a save after every write when
//!   `store_interval_secs` is 0; always one final save on shutdown

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use metrix_server::{config, Collector};

#[tokio::main]
async fn main() -> ExitCode {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("METRIX_CONFIG").ok())
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());

    let mut cfg = match config::load(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("metrix-server: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log.level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    cfg.apply_env(|k| std::env::var(k).ok());
    if let Err(e) = cfg.validate() {
        tracing::error!(error = %e, %path, "invalid config");
        return ExitCode::FAILURE;
    }

    let collector = Collector::start(&cfg).await;
    let app = collector.router();

    let listen = cfg.server.listen.as_str();
    let listener = match tokio::net::TcpListener::bind(listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, %listen, "failed to bind");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(%listen, "metrix-server starting");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        tracing::error!(error = %e, "server failed");
    }

    tracing::info!("shutting down, saving metrics");
    match collector.shutdown().await {
        Ok(()) => tracing::info!("metrics saved on shutdown"),
        Err(e) => tracing::error!(error = %e, "failed to save metrics on shutdown"),
    }

    if served.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, starting graceful shutdown");
}
