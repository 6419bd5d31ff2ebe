use anyhow::Result;
use std::time::Duration;

/// Blocking file operations still running at exit are abandoned after this.
const RUNTIME_SHUTDOWN: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shell_bridge=info".into()),
        )
        .init();

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(shell_bridge::run());
    rt.shutdown_timeout(RUNTIME_SHUTDOWN);
    result
}
