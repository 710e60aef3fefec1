use std::sync::Arc;

use arxiv_digest::config::DigestConfig;
use arxiv_digest::pipeline::{DigestPipeline, LogProgress};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = DigestConfig::from_env()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.llm.model,
        categories = %config.categories.join(","),
        keywords = %config.keywords.join(","),
        delivery = config.delivery.label(),
        smoke_test = config.smoke_test,
        "arxiv-digest starting"
    );

    let pipeline = DigestPipeline::from_config(&config)?.with_progress(Arc::new(LogProgress));

    let today = chrono::Local::now().date_naive();
    let report = pipeline.run_once(today).await;

    tracing::info!(
        fetched = report.fetched,
        filtered = report.filtered,
        unique = report.unique,
        summarized = report.summarized,
        delivered = report.delivered,
        "Run complete"
    );

    Ok(())
}
