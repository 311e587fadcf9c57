use std::sync::Arc;

use serde_json::Value;
use tokio::io::BufReader;
use tracing::{info, warn};

use render_autoscale::{batch, logging, AdaptiveWorkerPool, Config, HttpProcessor, PoolMetrics};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), BoxError> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize logging
    logging::init(&config.logging);

    info!(
        version = %render_autoscale::version(),
        "Starting render_autoscale..."
    );
    config.log_summary();

    // Workers are async tasks waiting on the network, one thread is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let summary = runtime.block_on(async_main(config))?;
    if !summary.is_success() {
        std::process::exit(summary.exit_code());
    }

    Ok(())
}

/// Feed stdin into the pool and print results as they complete.
async fn async_main(config: Config) -> Result<batch::BatchSummary, BoxError> {
    let metrics = Arc::new(PoolMetrics::new()?);

    let processor = HttpProcessor::<Value, Value>::from_config(&config.client)?;
    info!(endpoint = %processor.endpoint(), "Render endpoint ready");

    let pool = AdaptiveWorkerPool::new(processor, config.autoscale.pool_config())?
        .with_metrics(Arc::clone(&metrics));

    let summary = batch::run(
        &pool,
        BufReader::new(tokio::io::stdin()),
        &mut tokio::io::stdout(),
        tokio::signal::ctrl_c(),
    )
    .await?;

    let stats = pool.stats();
    info!(
        submitted = summary.submitted,
        succeeded = summary.succeeded,
        failed = summary.failed,
        rejected_lines = summary.rejected,
        panicked = stats.panicked,
        workers_spawned = stats.workers_spawned,
        "Batch finished"
    );

    if let Some(ref path) = config.metrics_file {
        match metrics.write_to(path).await {
            Ok(()) => info!("Metrics written to {}", path.display()),
            Err(e) => warn!("Failed to write metrics to {}: {}", path.display(), e),
        }
    }

    Ok(summary)
}
