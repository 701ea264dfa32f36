use std::time::Duration;

/// Resolves once the process is asked to stop, then logs how long open
/// connections get to drain. Local ctrl-c and the orchestrator's SIGTERM
/// are treated the same.
pub async fn shutdown_signal(drain_timeout: Duration) {
    let signal = stop_request().await;
    tracing::info!(
        signal,
        drain_timeout_secs = drain_timeout.as_secs(),
        "stop requested, draining open connections"
    );
}

#[cfg(unix)]
async fn stop_request() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn stop_request() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "SIGINT"
}
