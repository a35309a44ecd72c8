// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scout - a live feed synchronization engine for market opportunities.
//!
//! This is the binary entry point for the Scout daemon.

use clap::{Parser, Subcommand};

mod serve;
mod shutdown;

/// Scout - a live feed synchronization engine for market opportunities.
#[derive(Parser, Debug)]
#[command(name = "scout", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the feed synchronization engine.
    Serve,
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match scout_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            scout_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("error: failed to render configuration: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("scout: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        super::Cli::command().debug_assert();
    }
}
