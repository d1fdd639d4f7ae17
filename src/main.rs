//! `pipeflow`: ejecuta una definición de pipeline JSON e imprime el reporte.
//!
//! Códigos de salida: 0 completado, 1 completado con steps fallidos,
//! 2 abortado, 3 error de configuración o de definición.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pipeflow_adapters::{ErrorHandlingPatch, StepRegistry};
use pipeflow_core::RetryStrategy;
use pipeflow_rust::config::{AppConfig, CONFIG};
use pipeflow_rust::runner::{self, Outcome};
use pipeflow_rust::{errors::AppError, logging};

#[derive(Parser)]
#[command(name = "pipeflow", version, about = "Sequential pipeline runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a pipeline definition and print the execution report as JSON.
    Run(RunArgs),
    /// List the step kinds a definition can use.
    Kinds,
}

#[derive(Args)]
struct RunArgs {
    /// Path to the pipeline definition (JSON).
    definition: PathBuf,
    /// Retries per failed step.
    #[arg(long)]
    max_retries: Option<u32>,
    /// Backoff between retries: exponential, linear or fixed.
    #[arg(long)]
    strategy: Option<RetryStrategy>,
    /// Abort on the first unresolved failure.
    #[arg(long, conflicts_with = "fallback")]
    no_fallback: bool,
    /// Apply fallbacks and keep going after unresolved failures.
    #[arg(long)]
    fallback: bool,
    /// Pretty-print the report.
    #[arg(long)]
    pretty: bool,
}

impl RunArgs {
    fn overrides(&self) -> ErrorHandlingPatch {
        let fallback_enabled = match (self.fallback, self.no_fallback) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        ErrorHandlingPatch { max_retries: self.max_retries,
                             retry_strategy: self.strategy,
                             fallback_enabled }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match &*CONFIG {
        Ok(config) => config,
        Err(err) => {
            eprintln!("pipeflow: {err}");
            std::process::exit(err.exit_code());
        }
    };
    logging::init(&config.log_filter);

    let code = match cli.command {
        Command::Run(args) => cmd_run(args, config).await,
        Command::Kinds => {
            for kind in StepRegistry::default().kinds() {
                println!("{kind}");
            }
            0
        }
    };
    std::process::exit(code);
}

async fn cmd_run(args: RunArgs, config: &AppConfig) -> i32 {
    let outcome = runner::run_file(&args.definition, config.error_handling, args.overrides()).await;
    match outcome.and_then(|o| print_outcome(&o, args.pretty).map(|_| o.exit_code())) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("pipeflow: {err}");
            err.exit_code()
        }
    }
}

fn print_outcome(outcome: &Outcome, pretty: bool) -> Result<(), AppError> {
    println!("{}", runner::render_report(&outcome.report, pretty)?);
    if let Some(cause) = &outcome.abort {
        eprintln!("pipeflow: {cause}");
    }
    Ok(())
}
