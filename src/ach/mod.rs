//! Minimal NACHA fixed-width codec.
//!
//! The response engine consumes this module the way the original service
//! consumed its ACH library: parse bytes into a structured
//! [`File`]/[`Batch`]/[`EntryDetail`] model, build response records, derive
//! control totals, and serialize back to bytes.
//!
//! # Components
//!
//! - `records` - fixed-width record types (headers, entries, addenda, controls)
//! - `file` - Batch/File containers with derived control records
//! - `reader` / `writer` - byte-stream parsing and serialization
//! - `codes` - transaction, SEC, return, and change code tables
//! - `routing` - ABA routing helpers and trace-number generation

pub mod codes;
pub mod error;
pub mod file;
pub mod reader;
pub mod records;
pub mod routing;
pub mod writer;

pub use error::AchError;
pub use file::{Batch, File};
pub use reader::read;
pub use records::{
    Addenda98, Addenda99, BatchControl, BatchHeader, Category, EntryDetail, FileControl,
    FileHeader,
};
pub use writer::write;
