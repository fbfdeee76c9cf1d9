//! Batch and File containers with derived control records.
//!
//! Control records are always computed from the finalized entry set via
//! [`Batch::create`] and [`File::create`]; they are never hand-set.

use crate::ach::codes;
use crate::ach::error::AchError;
use crate::ach::records::{BatchControl, BatchHeader, EntryDetail, FileControl, FileHeader};

/// Modulus keeping entry hashes inside their 10-digit field.
const ENTRY_HASH_MODULUS: u64 = 10_000_000_000;

/// A batch header plus its ordered entries and derived control record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    header: BatchHeader,
    entries: Vec<EntryDetail>,
    control: Option<BatchControl>,
}

impl Batch {
    pub fn new(header: BatchHeader) -> Self {
        Batch {
            header,
            entries: Vec::new(),
            control: None,
        }
    }

    pub fn header(&self) -> &BatchHeader {
        &self.header
    }

    pub fn control(&self) -> Option<&BatchControl> {
        self.control.as_ref()
    }

    pub fn entries(&self) -> &[EntryDetail] {
        &self.entries
    }

    /// Mutable access to the entry list, used to sort entries before the
    /// final [`Batch::create`].
    pub fn entries_mut(&mut self) -> &mut Vec<EntryDetail> {
        &mut self.entries
    }

    pub fn add_entry(&mut self, entry: EntryDetail) {
        self.entries.push(entry);
    }

    pub(crate) fn set_control(&mut self, control: BatchControl) {
        self.control = Some(control);
    }

    /// Validate the header and entries, then derive the control record.
    pub fn create(&mut self) -> Result<(), AchError> {
        self.control = Some(self.compute_control()?);
        Ok(())
    }

    /// Compute the control record for the current entry set without storing it.
    pub fn compute_control(&self) -> Result<BatchControl, AchError> {
        self.header.validate()?;
        if self.entries.is_empty() {
            return Err(AchError::EmptyBatch {
                batch_number: self.header.batch_number,
            });
        }

        let mut entry_addenda_count = 0u32;
        let mut entry_hash = 0u64;
        let mut total_debit = 0u64;
        let mut total_credit = 0u64;
        for entry in &self.entries {
            entry.validate()?;
            entry_addenda_count += 1;
            if entry.addenda98.is_some() {
                entry_addenda_count += 1;
            }
            if entry.addenda99.is_some() {
                entry_addenda_count += 1;
            }
            let rdfi: u64 = entry.rdfi_identification.parse().map_err(|_| {
                AchError::NonNumericField {
                    record: "EntryDetail",
                    field: "rdfi_identification",
                    value: entry.rdfi_identification.clone(),
                }
            })?;
            entry_hash = (entry_hash + rdfi) % ENTRY_HASH_MODULUS;
            if codes::is_debit(entry.transaction_code) {
                total_debit += entry.amount;
            } else {
                total_credit += entry.amount;
            }
        }

        Ok(BatchControl {
            service_class_code: self.header.service_class_code,
            entry_addenda_count,
            entry_hash,
            total_debit,
            total_credit,
            company_identification: self.header.company_identification.clone(),
            message_authentication_code: String::new(),
            odfi_identification: self.header.odfi_identification.clone(),
            batch_number: self.header.batch_number,
        })
    }

    /// Count of record lines this batch serializes to (header, entries,
    /// addenda, control).
    pub(crate) fn record_count(&self) -> u32 {
        let mut count = 2; // header + control
        for entry in &self.entries {
            count += 1;
            if entry.addenda98.is_some() {
                count += 1;
            }
            if entry.addenda99.is_some() {
                count += 1;
            }
        }
        count
    }
}

/// A file header plus its ordered batches and derived control record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    pub header: FileHeader,
    batches: Vec<Batch>,
    control: Option<FileControl>,
}

impl File {
    pub fn new(header: FileHeader) -> Self {
        File {
            header,
            batches: Vec::new(),
            control: None,
        }
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub(crate) fn batches_mut(&mut self) -> &mut Vec<Batch> {
        &mut self.batches
    }

    pub fn control(&self) -> Option<&FileControl> {
        self.control.as_ref()
    }

    pub fn add_batch(&mut self, batch: Batch) {
        self.batches.push(batch);
    }

    pub(crate) fn set_control(&mut self, control: FileControl) {
        self.control = Some(control);
    }

    /// Validate the header, ensure every batch has a control record, and
    /// derive the file control record.
    pub fn create(&mut self) -> Result<(), AchError> {
        self.header.validate()?;
        if self.batches.is_empty() {
            return Err(AchError::NoBatches);
        }

        let mut entry_addenda_count = 0u32;
        let mut entry_hash = 0u64;
        let mut total_debit = 0u64;
        let mut total_credit = 0u64;
        let mut record_count = 2u32; // file header + file control
        for batch in &mut self.batches {
            if batch.control.is_none() {
                batch.create()?;
            }
            let control = batch.control.as_ref().ok_or(AchError::MissingBatchControl {
                batch_number: batch.header.batch_number,
            })?;
            entry_addenda_count += control.entry_addenda_count;
            entry_hash = (entry_hash + control.entry_hash) % ENTRY_HASH_MODULUS;
            total_debit += control.total_debit;
            total_credit += control.total_credit;
            record_count += batch.record_count();
        }

        self.control = Some(FileControl {
            batch_count: self.batches.len() as u32,
            block_count: record_count.div_ceil(10),
            entry_addenda_count,
            entry_hash,
            total_debit,
            total_credit,
        });
        Ok(())
    }

    /// Check internal consistency of a created (or parsed) file.
    pub fn validate(&self) -> Result<(), AchError> {
        self.header.validate()?;
        if self.batches.is_empty() {
            return Err(AchError::NoBatches);
        }
        let control = self.control.as_ref().ok_or(AchError::MissingFileControl)?;

        let mut entry_addenda_count = 0u32;
        for batch in &self.batches {
            let batch_control = batch.control.as_ref().ok_or(AchError::MissingBatchControl {
                batch_number: batch.header.batch_number,
            })?;
            let computed = batch.compute_control()?;
            if computed.entry_addenda_count != batch_control.entry_addenda_count
                || computed.entry_hash != batch_control.entry_hash
                || computed.total_debit != batch_control.total_debit
                || computed.total_credit != batch_control.total_credit
            {
                return Err(AchError::validation(
                    "BatchControl",
                    "totals",
                    format!(
                        "batch {} control does not match its entries",
                        batch.header.batch_number
                    ),
                ));
            }
            entry_addenda_count += batch_control.entry_addenda_count;
        }

        if control.batch_count != self.batches.len() as u32 {
            return Err(AchError::validation(
                "FileControl",
                "batch_count",
                format!(
                    "control says {} batches, file has {}",
                    control.batch_count,
                    self.batches.len()
                ),
            ));
        }
        if control.entry_addenda_count != entry_addenda_count {
            return Err(AchError::validation(
                "FileControl",
                "entry_addenda_count",
                format!(
                    "control says {} entries, batches hold {}",
                    control.entry_addenda_count, entry_addenda_count
                ),
            ));
        }
        Ok(())
    }
}
