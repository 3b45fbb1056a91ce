//! CLI commands.

pub mod chat;
pub mod generate;
pub mod info;
pub mod model;
pub mod status;

use std::future::Future;

use promptcraft_ai::{PromptCraftConfig, ServiceReadinessController};
use tracing::{debug, info};

/// Build a controller against the real process table.
pub(crate) fn controller(config: PromptCraftConfig) -> miette::Result<ServiceReadinessController> {
    ServiceReadinessController::new(config)
        .map_err(|e| miette::miette!("Failed to create Ollama client: {}", e))
}

/// Start the service if needed and wait for it, with user-facing progress.
pub(crate) async fn start_service(controller: &ServiceReadinessController) -> miette::Result<()> {
    if !controller.is_service_reachable().await {
        println!("Starting Ollama server...");
    }
    controller
        .ensure_service_running()
        .await
        .map_err(|e| miette::miette!("{}", e))
}

/// Run `work` until it finishes or the user presses Ctrl-C.
///
/// On Ctrl-C `work` is dropped, and with it any controller it holds, which
/// stops a service that controller started.
pub(crate) async fn until_interrupted<T, F>(work: F) -> miette::Result<T>
where
    F: Future<Output = miette::Result<T>>,
{
    tokio::select! {
        result = work => result,
        _ = interrupted() => {
            info!("Interrupted; shutting down");
            Err(miette::miette!("Interrupted"))
        }
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
pub(crate) async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        debug!("Ctrl-C handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_until_interrupted_passes_result_through() {
        let result = until_interrupted(async { Ok::<_, miette::Report>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_until_interrupted_stops_on_sigint() {
        tokio::spawn(async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            unsafe {
                libc::raise(libc::SIGINT);
            }
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            until_interrupted(std::future::pending::<miette::Result<()>>()),
        )
        .await
        .expect("Ctrl-C ends the wait");

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Interrupted"));
    }
}
