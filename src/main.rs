use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use media_converter::cli::Cli;
use media_converter::config::Config;
use media_converter::convert::{ConversionPipeline, ConversionRequest, ConversionResult};
use media_converter::engine::{ExtractionEngine, YtDlpEngine};
use media_converter::{output, ConverterError};

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout is reserved for the JSON result
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_converter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let engine = YtDlpEngine::new(&config.engine);
    if !engine.check_availability().await {
        let err = ConverterError::EngineUnavailable(config.engine.binary.clone());
        output::emit(&ConversionResult::failure(err.to_string()))?;
        std::process::exit(1);
    }

    let request = ConversionRequest::new(cli.url, cli.format, cli.conversion_id);
    tracing::info!(
        "Starting conversion of {} to {} (id {})",
        request.url,
        request.format,
        request.conversion_id
    );

    let pipeline = ConversionPipeline::new(config, Box::new(engine))?;
    let result = pipeline.run(&request).await;

    output::emit(&result)?;
    Ok(())
}
