//! Relay server accept loop.

use crate::error::NetError;
use crate::session::{Lobby, SessionReport};
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

/// Accepts connections until `shutdown` resolves, running one task per session.
///
/// On shutdown the listener stops accepting, every running session sends
/// the aborted code to its peers, and the loop waits for the session tasks
/// to finish. A peer parked in the lobby is simply disconnected.
///
/// # Errors
///
/// Returns an error only when the listener's local address is unavailable;
/// individual accept and handshake failures are logged and skipped.
#[instrument(skip(listener, shutdown))]
pub async fn serve<F>(
    listener: TcpListener,
    turn_timeout: Option<Duration>,
    shutdown: F,
) -> Result<Vec<SessionReport>, NetError>
where
    F: Future<Output = ()>,
{
    let local_addr = listener.local_addr()?;
    info!(%local_addr, "Relay server listening");

    let (stop_tx, stop_rx) = watch::channel(false);
    let mut lobby = Lobby::new()
        .with_turn_timeout(turn_timeout)
        .with_shutdown(stop_rx);
    let mut sessions = JoinSet::new();
    let mut reports = Vec::new();

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("Shutdown requested, no longer accepting connections");
                break;
            }

            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        warn!(error = %err, "Accept failed");
                        continue;
                    }
                };
                if let Err(err) = stream.set_nodelay(true) {
                    debug!(error = %err, %peer, "Failed to disable Nagle");
                }
                debug!(%peer, "Connection accepted");

                match lobby.admit(stream).await {
                    Ok(Some(coordinator)) => {
                        info!(session_id = coordinator.id(), "Spawning session");
                        sessions.spawn(coordinator.run());
                    }
                    Ok(None) => {}
                    Err(err) => warn!(error = %err, %peer, "Handshake failed"),
                }
            }

            Some(joined) = sessions.join_next() => {
                record(joined, &mut reports);
            }
        }
    }

    // Receivers live in the lobby and in every session.
    let _ = stop_tx.send(true);
    drop(lobby);

    while let Some(joined) = sessions.join_next().await {
        record(joined, &mut reports);
    }

    info!(sessions = reports.len(), "Relay server stopped");
    Ok(reports)
}

fn record(joined: Result<SessionReport, tokio::task::JoinError>, reports: &mut Vec<SessionReport>) {
    match joined {
        Ok(report) => {
            info!(session_id = report.id, end = %report.end, moves = report.moves, "Session ended");
            reports.push(report);
        }
        Err(err) => error!(error = %err, "Session task failed"),
    }
}
