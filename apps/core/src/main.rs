// QueryTrack triage service entry point

use std::sync::Arc;

use anyhow::Context;
use querytrack_core::config::LogFormat;
use querytrack_core::{server, ServiceSettings, TriageConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
        LogFormat::Json => {
            let formatting_layer =
                BunyanFormattingLayer::new(server::SERVICE_NAME.into(), std::io::stdout);
            tracing_subscriber::registry()
                .with(filter)
                .with(JsonStorageLayer)
                .with(formatting_layer)
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let settings = ServiceSettings::from_env().context("invalid service settings")?;
    init_tracing(settings.log_format);

    let config = TriageConfig::from_env().context("invalid triage configuration")?;
    let tagger = server::build_tagger(config, &settings).context("cannot build triage engine")?;
    info!("Auto-tagger initialized successfully");

    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;

    server::serve(listener, Arc::new(tagger)).await?;
    Ok(())
}
