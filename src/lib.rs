//! ACH Responder Library
//! # Overview
//!
//! This library emulates the behavior of a receiving financial institution on
//! the ACH network, so software that originates ACH files can be tested
//! against realistic bank responses without a live banking relationship.
//! Declarative rules decide, per incoming payment entry, whether to mirror it
//! for reconciliation, convert it into a Return or Correction (NOC) response,
//! and whether to delay that response's visibility to simulate settlement
//! lag.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`ach`] - Fixed-width NACHA codec (records, batches, files, routing)
//! - [`types`] - Rule configuration model and error types
//! - [`config`] - Application configuration loading and validation
//! - [`cli`] - CLI argument parsing
//! - [`core`] - Response-decision and transformation engine:
//!   - [`core::matcher`] - Rule evaluation against entries and batch headers
//!   - [`core::entry_transformer`] - Building Return and NOC response entries
//!   - [`core::batch_mirror`] - Reconciliation copies of original entries
//!   - [`core::file_transformer`] - Per-file orchestration and output assembly
//! - [`io`] - Storage writes, delayed visibility, and the inbound watcher
//!
//! # Response Lifecycle
//!
//! An uploaded file is parsed, then every entry runs through the configured
//! rules. A matched Copy action mirrors the original entry into a
//! reconciliation file; a matched Return or Correction action produces a new
//! response entry, grouped into output files by settlement delay. Delayed
//! output files are future-dated on disk and stay invisible to directory
//! listings until their delay elapses — there is no scheduler, visibility is
//! a pure modification-time comparison.

// Module declarations
pub mod ach;
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod types;

pub use config::Config;
pub use core::{BatchMirror, FileTransformer, Matcher, TransformerChain};
pub use io::{FileWriter, FsFileWriter, Watcher};
pub use types::{Action, Delay, Match, Response, ResponderError};
