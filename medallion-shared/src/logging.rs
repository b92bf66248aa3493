use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::errors::PipelineResult;

/// Install console and file logging for one pipeline program.
///
/// The log file is truncated so each run starts with a fresh log. The console
/// switches to JSON lines when `MEDALLION_ENV=production`.
pub fn init_tracing(service_name: &str, log_file: &Path) -> PipelineResult<()> {
    if let Some(dir) = log_file.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = Arc::new(File::create(log_file)?);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{}=debug", service_name.replace('-', "_"))));

    let is_production = std::env::var("MEDALLION_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    if is_production {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .with(file_layer(file))
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(file_layer(file))
            .init();
    }

    tracing::info!(service = service_name, log_file = %log_file.display(), "tracing initialized");
    Ok(())
}

fn file_layer<S>(file: Arc<File>) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
}
