//! # keystore
//!
//! Command-line client for the remote keystore service.
//!
//! ## Usage
//!
//! ```bash
//! # Create a keystore, then generate a key in it
//! keystore --keystore main --password secret keystore create
//! keystore --keystore main --password secret aes generate mykey --size 256
//!
//! # Encrypt with it
//! keystore aes encrypt aes_mykey "attack at dawn"
//!
//! # Sign, then verify against the published key
//! keystore dsa sign dsa_signer --input message.txt -o message.sig
//! keystore dsa verify dsa_signer --input message.txt --signature "$(cat message.sig)"
//! ```

#![forbid(unsafe_code)]

use clap::Parser;
use keystore_cli::commands::{self, Session, EXIT_ERROR};
use keystore_cli::config::load_config;
use keystore_cli::logging::{init_logging, verbosity_to_level, LogConfig};
use keystore_cli::Cli;

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(EXIT_ERROR);
        }
    };

    let log_config = LogConfig {
        level: verbosity_to_level(cli.verbose),
        format: config.logging.format,
    };
    if let Err(e) = init_logging(&log_config) {
        eprintln!("{e}");
        std::process::exit(EXIT_ERROR);
    }

    let result = Session::connect(&config, &cli.connection)
        .and_then(|session| commands::run(&session, cli.command))
        .and_then(|outcome| {
            commands::deliver(
                &outcome.output,
                cli.output.as_deref(),
                &mut std::io::stdout().lock(),
            )?;
            Ok(outcome)
        });

    match result {
        Ok(outcome) => {
            eprintln!("{}", outcome.notice);
            std::process::exit(outcome.exit_code);
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{}", e.notice());
            std::process::exit(e.exit_code());
        }
    }
}
