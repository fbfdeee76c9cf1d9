//! ACH Responder CLI
//!
//! Emulates a receiving bank on the ACH network: watches a drop directory
//! for uploaded ACH files and answers them with configured Returns,
//! Corrections (NOCs), and reconciliation mirrors, optionally delaying a
//! response's visibility to simulate settlement lag.
//!
//! # Usage
//!
//! ```bash
//! # Watch the configured inbound directory
//! cargo run -- config.json
//!
//! # Transform a single file and exit
//! cargo run -- config.json --input upload.ach
//! ```
//!
//! Log verbosity follows `RUST_LOG` (e.g. `RUST_LOG=ach_responder=debug` to
//! see matcher predicate traces when `matching.debug` is enabled).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (invalid configuration, unreadable input, transform failure)

use std::fs;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use ach_responder::io::Watcher;
use ach_responder::{ach, cli, Config, FileTransformer, FsFileWriter, Matcher, ResponderError};

fn main() {
    let args = cli::parse_args();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: cli::CliArgs) -> Result<(), ResponderError> {
    let config = Config::load(&args.config)?;

    let matcher = Matcher::new(config.matching.debug, Arc::from(config.responses.clone()));
    let writer = FsFileWriter::new(config.storage.root.clone());
    let transformer = FileTransformer::new(matcher, writer, config.storage.returned.clone());

    match args.input {
        Some(path) => {
            // One-shot mode: transform a single file and exit.
            let bytes = fs::read(&path)?;
            let file = ach::read(&bytes)?;
            file.validate()?;
            transformer.transform(&file)
        }
        None => {
            let inbound = config.storage.root.join(&config.storage.inbound);
            let watcher = Watcher::new(
                transformer,
                inbound,
                Duration::from_secs(args.poll_interval),
            );
            watcher.run()
        }
    }
}
