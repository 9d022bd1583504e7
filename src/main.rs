use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use famgraph::cli::{self, Cli};
use famgraph::observability::init_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };
    init_logging(&config.logging.filter);

    let value = match cli::run(cli, &config) {
        Ok(value) => value,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("error: {err}");
            return ExitCode::from(if err.is_client_error() { 1 } else { 2 });
        }
    };

    match serde_json::to_string_pretty(&value) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}
