//! Tether CLI Binary
//!
//! Command-line client for tether.name identity verification.

use clap::Parser;
use std::io::IsTerminal;
use std::process;
use tether::cli::{render_error, Cli, CliContext};
use tether::config::EnvSnapshot;
use tether::logging::{init_logging, LoggingConfig};

fn main() {
    let cli = Cli::parse();

    let env = EnvSnapshot::capture();
    match LoggingConfig::resolve(cli.global.verbose, &env) {
        Ok(logging) => {
            if let Err(e) = init_logging(&logging, &env) {
                eprintln!("Warning: logging disabled: {}", e);
            }
        }
        Err(e) => eprintln!("Warning: logging disabled: {}", e),
    }

    let output = match CliContext::from_process(cli.global.config.clone()) {
        Ok(context) => context.execute(&cli.command, &cli.global),
        Err(e) => render_error(&cli.command, cli.global.json, &e, std::io::stderr().is_terminal()),
    };
    if !output.stdout.is_empty() {
        println!("{}", output.stdout);
    }
    if !output.stderr.is_empty() {
        eprintln!("{}", output.stderr);
    }
    process::exit(output.exit_code);
}
