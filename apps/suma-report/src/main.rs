//! suma-report binary entry point.

use clap::Parser;
use std::process::ExitCode;
use suma_client::{AnyTransport, RemoteApiClient};
use suma_report::cli::Cli;
use suma_report::config::Config;
use suma_report::exit;
use suma_report::logging;
use suma_report::pipeline::ReportGenerator;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let config = match Config::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(exit::CONFIG);
        }
    };
    debug!(?config, "configuration resolved");

    let transport = match AnyTransport::connect(config.transport, config.url.clone(), &config.http_settings()) {
        Ok(transport) => transport,
        Err(e) => {
            error!("cannot set up {} transport: {}", config.transport, e);
            return ExitCode::from(exit::CONFIG);
        }
    };

    let generator = ReportGenerator::new(RemoteApiClient::new(transport), &config);
    match generator.run().await {
        Ok(summary) => {
            println!(
                "Wrote {} of {} systems to {}",
                summary.rows.len(),
                summary.systems,
                summary.output_path.display()
            );
            for skipped in &summary.skipped {
                println!("  skipped {}: {}", skipped.system.hostname, skipped.reason);
            }
            ExitCode::from(summary.exit_code())
        }
        Err(e) => {
            error!("{}", e);
            if let Some(hint) = e.hint() {
                error!("{}", hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}
