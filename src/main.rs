use bils::application::engine::SplitEngine;
use bils::config::AppConfig;
use bils::infrastructure::scheduler::InProcessScheduler;
use bils::interfaces::csv::report_writer::ReportWriter;
use bils::interfaces::csv::script_reader::ScriptReader;
use bils::interfaces::script::ScriptRunner;
use bils::telemetry;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Script of actions to replay, as CSV
    script: PathBuf,

    /// JSON config file (optional). Missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, overrides the config. `RUST_LOG` overrides both.
    #[arg(long)]
    log_level: Option<String>,

    /// Print payments instead of split requests
    #[arg(long)]
    payments: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_path(path).into_diagnostic()?,
        None => AppConfig::default(),
    };
    telemetry::init(cli.log_level.as_deref().unwrap_or(&config.log_level));

    let scheduler = Arc::new(InProcessScheduler::new(true));
    let engine = SplitEngine::in_memory(scheduler, config);
    engine.request_notification_permission().await.into_diagnostic()?;

    let file = File::open(&cli.script).into_diagnostic()?;
    let mut runner = ScriptRunner::new(&engine);
    for row in ScriptReader::new(file).rows() {
        match row {
            Ok(row) => {
                if let Err(e) = runner.apply(row).await {
                    eprintln!("Error applying row: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading row: {}", e);
            }
        }
    }

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    if cli.payments {
        let payments = engine.payments().await.into_diagnostic()?;
        writer.write_payments(&payments).into_diagnostic()?;
    } else {
        let requests = engine.split_requests().await.into_diagnostic()?;
        writer.write_split_requests(&requests).into_diagnostic()?;
    }
    drop(writer);

    engine.shutdown().await.into_diagnostic()?;
    Ok(())
}
