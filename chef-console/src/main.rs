//! chef-console - Main entry point
//!
//! Waits for restaurant order notifications and prints them until Enter is
//! pressed. Also lists the menu and orders, and can enqueue a notification.

use std::sync::Arc;

use anyhow::{Context, Result};
use chef_common::config::BootstrapConfig;
use chef_common::db::{open_database, SqliteOrderQueue};
use chef_console::cli::{Args, Command};
use chef_console::{commands, logging, ChefConsole, ConsoleSink, PollerOptions, QueuePoller};
use clap::Parser;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = BootstrapConfig::resolve(args.database_url.as_deref(), args.config.as_deref())
        .context("Failed to load configuration")?;

    logging::init_tracing(&config.logging.level);

    info!(
        "Starting chef-console v{} ({:?})",
        env!("CARGO_PKG_VERSION"),
        args.command()
    );

    let pool = open_database(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    let sink = ConsoleSink;

    match args.command() {
        Command::Watch => {
            let poller = QueuePoller::new(
                Arc::new(SqliteOrderQueue::new(pool.clone())),
                pool.clone(),
                Arc::new(sink),
                PollerOptions {
                    receive_timeout: config.receive_timeout,
                    fault_policy: config.fault_policy,
                },
            );

            let stdin_line = spawn_enter_listener().context("Failed to start stdin listener")?;
            ChefConsole::new(poller)
                .run(stop_signal(stdin_line))
                .await
                .context("Order poller failed")?;
        }
        Command::Menu => {
            let count = commands::print_menu(&pool, &sink).await.context("Failed to read menu")?;
            info!("Listed {} menu items", count);
        }
        Command::Orders => {
            let count = commands::print_orders(&pool, &sink)
                .await
                .context("Failed to read orders")?;
            info!("Listed {} orders", count);
        }
        Command::Send { text } => {
            let message_id = commands::send_order(&pool, &text)
                .await
                .context("Failed to enqueue order notification")?;
            info!("Enqueued order notification {}", message_id);
        }
    }

    pool.close().await;
    Ok(())
}

/// Read one line from stdin on a dedicated thread
///
/// The thread is detached; a pending read never holds up process exit.
fn spawn_enter_listener() -> std::io::Result<oneshot::Receiver<()>> {
    let (tx, rx) = oneshot::channel();

    std::thread::Builder::new()
        .name("stdin-listener".to_string())
        .spawn(move || {
            let mut line = String::new();
            if let Err(e) = std::io::stdin().read_line(&mut line) {
                warn!("Failed to read stdin: {}", e);
            }
            let _ = tx.send(());
        })?;

    Ok(rx)
}

/// Stop signal: Enter (or stdin EOF), Ctrl+C, or SIGTERM
async fn stop_signal(stdin_line: oneshot::Receiver<()>) {
    let enter = async {
        // A dropped sender also means stdin is done
        let _ = stdin_line.await;
    };

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = enter => {
            info!("Enter pressed, shutting down");
        },
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
