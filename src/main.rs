// src/main.rs
mod app;
mod config;
mod installer;
mod kubeconfig;
mod pki;
mod token;
mod types;
mod utils;

use app::{AppError, Command};
use clap::Parser;
use config::GuardConfig;
use std::process;
use utils::logging::{ConsoleLogger, FileLogger, Logger, MultiLogger};

#[derive(Parser)]
#[command(name = "guard", version, about = "PKI and installer tooling for the Guard authentication webhook")]
pub struct Args {
    /// Print debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Also write log lines to this file
    #[arg(long, global = true)]
    pub log_file: Option<String>,

    /// JSON file overriding pki dir, namespace, addr and image tag
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

fn build_logger(args: &Args) -> Box<dyn Logger> {
    let console = Box::new(ConsoleLogger::new(args.debug));
    let Some(path) = &args.log_file else {
        return console;
    };
    match FileLogger::new(path, args.debug) {
        Ok(file) => Box::new(MultiLogger::new(vec![console, Box::new(file)])),
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path, e);
            process::exit(1);
        }
    }
}

fn load_config(path: Option<&str>) -> Result<GuardConfig, AppError> {
    match path {
        Some(path) => GuardConfig::load_from_file(path).map_err(AppError::Config),
        None => Ok(GuardConfig::default()),
    }
}

fn main() {
    let args = Args::parse();
    let mut logger = build_logger(&args);

    let result = load_config(args.config.as_deref())
        .and_then(|config| app::run(args.command, config, logger.as_mut()));

    if let Err(err) = result {
        logger.log(&err.to_string());
        process::exit(1);
    }
}
