//! Error type for the ACH codec.

use thiserror::Error;

/// Errors raised while parsing, building, or validating ACH records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AchError {
    /// A record line was not the mandatory 94 characters.
    #[error("record line {line} has length {length}, want 94")]
    InvalidRecordLength {
        /// 1-based line number in the input
        line: usize,
        /// Observed line length
        length: usize,
    },

    /// The record type code (first character) is not one this codec handles.
    #[error("record line {line} has unknown record type '{record_type}'")]
    UnknownRecordType {
        /// 1-based line number in the input
        line: usize,
        /// The offending record type character
        record_type: char,
    },

    /// An addenda record carried an unsupported addenda type code.
    #[error("record line {line} has unsupported addenda type code '{type_code}'")]
    UnsupportedAddendaType {
        /// 1-based line number in the input
        line: usize,
        /// The addenda type code field
        type_code: String,
    },

    /// An entry detail or addenda record appeared outside a batch.
    #[error("record line {line}: {record} record outside of a batch")]
    RecordOutsideBatch {
        /// 1-based line number in the input
        line: usize,
        /// Record description ("entry detail", "addenda", "batch control")
        record: &'static str,
    },

    /// An addenda record appeared before any entry detail in its batch.
    #[error("record line {line}: addenda record without a preceding entry")]
    OrphanedAddenda {
        /// 1-based line number in the input
        line: usize,
    },

    /// A numeric field held non-numeric data.
    #[error("{record}: field {field} is not numeric: '{value}'")]
    NonNumericField {
        /// Record name
        record: &'static str,
        /// Field name
        field: &'static str,
        /// The offending value
        value: String,
    },

    /// A routing number could not be reduced to an 8-digit ABA prefix.
    #[error("invalid routing number '{routing}'")]
    InvalidRoutingNumber {
        /// The offending routing number
        routing: String,
    },

    /// A record failed format validation.
    #[error("{record}: {field}: {message}")]
    Validation {
        /// Record name
        record: &'static str,
        /// Field name
        field: &'static str,
        /// What was wrong
        message: String,
    },

    /// A batch was finalized without any entries.
    #[error("batch {batch_number} has no entries")]
    EmptyBatch {
        /// Batch number from the header
        batch_number: u32,
    },

    /// A file was finalized without any batches.
    #[error("file has no batches")]
    NoBatches,

    /// A batch is missing its control record where one is required.
    #[error("batch {batch_number} has no control record")]
    MissingBatchControl {
        /// Batch number from the header
        batch_number: u32,
    },

    /// A file is missing its control record where one is required.
    #[error("file has no control record")]
    MissingFileControl,
}

impl AchError {
    /// Create a Validation error.
    pub fn validation(record: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        AchError::Validation {
            record,
            field,
            message: message.into(),
        }
    }
}
