//! Camera session driver binary.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use camface_capture::CaptureConfig;
use camface_cli::{load_script, run_session, Args};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing on stderr; stdout carries the report
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("camface_capture=info,camface_cli=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let args = Args::parse();

    let metrics = if args.metrics {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Failed to install Prometheus recorder: {}", e);
                None
            }
        }
    } else {
        None
    };

    // Load configuration
    let config = CaptureConfig::from_env();
    info!("Capture config: {:?}", config);
    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    let script = match load_script(&args.script) {
        Ok(script) => script,
        Err(e) => {
            error!("Failed to load session script: {:#}", e);
            std::process::exit(1);
        }
    };

    let report = match run_session(script, &config, args.facing).await {
        Ok(report) => report,
        Err(e) => {
            error!("Camera session failed: {:#}", e);
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to serialize report: {}", e);
            std::process::exit(1);
        }
    }

    if let Some(handle) = metrics {
        println!("{}", handle.render());
    }

    info!("Camera session complete");
}
