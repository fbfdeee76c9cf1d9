//! Core response engine module
//!
//! This module contains the response-decision and transformation components:
//! - `matcher` - rule evaluation against entries and batch headers
//! - `entry_transformer` - rewriting matched entries into bank responses
//! - `batch_mirror` - reconciliation copies of original entries
//! - `file_transformer` - per-file orchestration and output assembly

pub mod batch_mirror;
pub mod entry_transformer;
pub mod file_transformer;
pub mod matcher;

pub use batch_mirror::BatchMirror;
pub use entry_transformer::{CorrectionTransformer, EntryTransformer, ReturnTransformer, TransformerChain};
pub use file_transformer::FileTransformer;
pub use matcher::Matcher;
