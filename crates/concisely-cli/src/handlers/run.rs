//! `concisely run`: poll Telegram until interrupted.

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::bootstrap::bootstrap;
use crate::config::Settings;
use crate::error::CliError;

pub async fn execute(settings: &Settings) -> Result<(), CliError> {
    info!("Starting concisely");
    let ctx = bootstrap(settings).await?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    match shutdown_signal() {
        Ok(signal) => {
            tokio::spawn(async move {
                let name = signal.await;
                info!("Shutdown requested ({name})");
                signal_token.cancel();
            });
        }
        Err(e) => error!("Failed to listen for shutdown signals: {e}"),
    }

    ctx.poller.run(shutdown).await;

    ctx.pool.close().await;
    info!("Stopped");
    Ok(())
}

/// Register signal handlers, returning a future that resolves with the
/// name of the first shutdown signal: Ctrl-C, or SIGTERM on unix (what
/// `docker stop` sends).
fn shutdown_signal() -> std::io::Result<impl Future<Output = &'static str>> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(async move {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = terminate.recv() => "SIGTERM",
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            "Ctrl-C"
        }
    })
}
