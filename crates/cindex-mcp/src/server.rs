//! Server orchestration: builds the MCP service over stdio and runs it
//! until EOF on stdin or a shutdown signal, keeping the logging guards
//! alive for the duration of the process.

use std::sync::Arc;

use agenterra_rmcp::ServiceExt;
use tokio::sync::Notify;
use tracing_appender::non_blocking::WorkerGuard;

use crate::handlers::McpServer;
use crate::signal::spawn_signal_listener;
use crate::state::AppState;

/// # Errors
/// Returns an error if the stdio transport fails to start or the service
/// exits with an error.
pub async fn start(
    state: AppState,
    _file_guard: WorkerGuard,
    _stderr_guard: WorkerGuard,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Arc::new(Notify::new());
    spawn_signal_listener(shutdown.clone());

    let server = McpServer::new(state);
    let service = server.serve(agenterra_rmcp::transport::stdio()).await?;

    tokio::select! {
        result = service.waiting() => {
            result?;
        }
        () = shutdown.notified() => {
            tracing::info!("shutting down on signal");
        }
    }

    Ok(())
}
