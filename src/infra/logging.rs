//! For setting up logging.

use super::config::LoggingConfig;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace, Resource};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Flushes logs upon being dropped.
#[derive(Debug)]
pub struct LogGuard {
    _guards: Vec<WorkerGuard>,
}

/// Initializes logging.
///
/// Must be called from within a tokio runtime when OTLP export is enabled.
pub fn init_logging(config: &LoggingConfig) -> color_eyre::Result<LogGuard> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.filter.clone());
    let mut guards = Vec::new();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let (non_blocking_stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);
    let stdout = tracing_subscriber::fmt::layer().with_writer(non_blocking_stdout);
    let stdout = if config.json {
        stdout.json().with_filter(EnvFilter::new(&log_level)).boxed()
    } else {
        stdout.with_filter(EnvFilter::new(&log_level)).boxed()
    };
    layers.push(stdout);

    if let Some(directory) = &config.directory {
        let file_appender = tracing_appender::rolling::daily(directory, "catalog.log");
        let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);
        guards.push(file_guard);
        let file = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking_file)
            .json()
            .with_filter(EnvFilter::new(&log_level));
        layers.push(file.boxed());
    }

    if let Some(endpoint) = &config.otlp_endpoint {
        let app_name = env!("CARGO_PKG_NAME");
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(
                opentelemetry_otlp::new_exporter()
                    .tonic()
                    .with_endpoint(endpoint),
            )
            .with_trace_config(
                trace::config()
                    .with_resource(Resource::new(vec![KeyValue::new("service.name", app_name)])),
            )
            .install_batch(runtime::Tokio)?;
        let opentelemetry = tracing_opentelemetry::layer()
            .with_tracer(tracer)
            .with_filter(EnvFilter::new(&log_level));
        layers.push(opentelemetry.boxed());
    }

    if config.tokio_console {
        layers.push(console_subscriber::spawn().boxed());
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(LogGuard { _guards: guards })
}
