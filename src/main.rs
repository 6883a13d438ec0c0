use anyhow::Context;
use attrition_pipeline::{
    config::{Config, ObservabilityConfig},
    services::CloudLanguageClient,
    text::LanguageStrategy,
    AttritionPipeline, SentimentPipeline,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&observability.log_filter));
    let registry = tracing_subscriber::registry().with(filter);

    if observability.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    init_tracing(&config.observability);

    tracing::info!("Starting attrition-pipeline v{}", env!("CARGO_PKG_VERSION"));

    if config.data.tabular_path.is_none() && config.data.text_path.is_none() {
        tracing::warn!("Neither data.tabular_path nor data.text_path is configured, nothing to do");
        return Ok(());
    }

    if let Some(path) = config.data.tabular_path.clone() {
        // model fitting is CPU bound
        let pipeline = AttritionPipeline::new(config.clone());
        let report = tokio::task::spawn_blocking(move || pipeline.run_path(&path))
            .await
            .context("Attrition pipeline task panicked")??;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if let Some(path) = config.data.text_path.clone() {
        let needs_translation = matches!(config.text.strategy, LanguageStrategy::Translate { .. });
        let mut pipeline = SentimentPipeline::new(config.clone());

        if needs_translation || config.text.use_sentiment {
            let client = Arc::new(
                CloudLanguageClient::from_config(&config.service)
                    .context("Failed to create language service client")?,
            );
            if needs_translation {
                pipeline = pipeline.with_translation(client.clone());
            }
            if config.text.use_sentiment {
                pipeline = pipeline.with_sentiment(client);
            }
        }

        let report = pipeline.run_path(&path).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
