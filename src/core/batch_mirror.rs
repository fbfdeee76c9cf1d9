//! Reconciliation mirror: preserves unmodified copies of matched entries.
//!
//! Entries are accumulated per (destination path, company identifier) key and
//! per batch number, then flushed once per key as a single ACH-formatted
//! buffer: batch header, the original entry lines, and a freshly recomputed
//! batch control. A mirror instance lives for exactly one Transform call.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::ach::file::Batch;
use crate::ach::records::{BatchControl, BatchHeader, EntryDetail};
use crate::ach::AchError;
use crate::io::writer::FileWriter;
use crate::types::rule::Copy;
use crate::types::ResponderError;

/// Accumulates original entries destined for reconciliation files.
pub struct BatchMirror<'w, W: FileWriter + ?Sized> {
    // path+companyID -> batch number -> header+entries
    batches: BTreeMap<MirrorKey, BTreeMap<u32, MirrorBatch>>,
    writer: &'w W,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct MirrorKey {
    path: PathBuf,
    company_id: String,
}

impl MirrorKey {
    /// Derive a collision-resistant output path: company identifier, a
    /// fractional-second timestamp, and a short hash of the serialized bytes.
    fn file_path(&self, data: &[u8], now: DateTime<Local>) -> PathBuf {
        let mut hash = format!("{:X}", Sha256::digest(data));
        hash.truncate(8);
        let filename = format!("{}_{}_{}.ach", self.company_id, fractional_timestamp(now), hash);
        self.path.join(filename)
    }
}

/// Timestamp at second-plus-fractional resolution, e.g. `20240115-130455.12345`.
pub(crate) fn fractional_timestamp(now: DateTime<Local>) -> String {
    format!(
        "{}.{:05}",
        now.format("%Y%m%d-%H%M%S"),
        now.timestamp_subsec_micros() / 10
    )
}

struct MirrorBatch {
    header: BatchHeader,
    entries: Vec<EntryDetail>,
}

impl MirrorBatch {
    fn write(&self, buf: &mut String) -> Result<(), AchError> {
        let sec_code = &self.header.standard_entry_class_code;
        buf.push_str(&self.header.to_record());
        buf.push('\n');
        for entry in &self.entries {
            buf.push_str(&entry.to_record(sec_code));
            buf.push('\n');
        }
        let control = calculate_control(&self.header, &self.entries)?;
        buf.push_str(&control.to_record());
        buf.push('\n');
        Ok(())
    }
}

impl<'w, W: FileWriter + ?Sized> BatchMirror<'w, W> {
    pub fn new(writer: &'w W) -> Self {
        BatchMirror {
            batches: BTreeMap::new(),
            writer,
        }
    }

    /// Record `entry` (unmodified) under the copy destination and its batch's
    /// header and number.
    pub fn save_entry(&mut self, batch: &Batch, copy: &Copy, entry: &EntryDetail) {
        let header = batch.header();
        let key = MirrorKey {
            path: copy.path.clone(),
            company_id: header.company_identification.trim().to_string(),
        };
        self.batches
            .entry(key)
            .or_default()
            .entry(header.batch_number)
            .or_insert_with(|| MirrorBatch {
                header: header.clone(),
                entries: Vec::new(),
            })
            .entries
            .push(entry.clone());
    }

    /// Serialize and write one reconciliation file per (path, company) group,
    /// batches in ascending batch-number order.
    pub fn save_files(&self) -> Result<(), ResponderError> {
        for (key, mirror) in &self.batches {
            let mut buf = String::new();
            for batch in mirror.values() {
                batch.write(&mut buf)?;
            }

            let path = key.file_path(buf.as_bytes(), Local::now());
            info!(path = %path.display(), batches = mirror.len(), "writing reconciliation file");
            self.writer.write(&path, buf.as_bytes(), None)?;
        }
        Ok(())
    }

    /// Whether any entry has been recorded.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

/// Recompute a batch control through the canonical batch-construction
/// routine, guaranteeing number-format and hashing correctness.
fn calculate_control(
    header: &BatchHeader,
    entries: &[EntryDetail],
) -> Result<BatchControl, AchError> {
    let mut batch = Batch::new(header.clone());
    for entry in entries {
        batch.add_entry(entry.clone());
    }
    batch.compute_control()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ach::codes;
    use crate::io::writer::test_support::CapturingWriter;

    fn test_batch(company_id: &str, batch_number: u32) -> Batch {
        Batch::new(BatchHeader {
            service_class_code: 200,
            company_name: "Best Co".to_string(),
            company_identification: company_id.to_string(),
            standard_entry_class_code: "PPD".to_string(),
            company_entry_description: "PAYROLL".to_string(),
            originator_status_code: "1".to_string(),
            odfi_identification: "12104288".to_string(),
            batch_number,
            ..BatchHeader::default()
        })
    }

    fn test_entry(trace: &str, amount: u64) -> EntryDetail {
        EntryDetail {
            transaction_code: codes::CHECKING_DEBIT,
            rdfi_identification: "23138010".to_string(),
            check_digit: "4".to_string(),
            dfi_account_number: "12345678".to_string(),
            amount,
            individual_name: "Jane Doe".to_string(),
            trace_number: trace.to_string(),
            ..EntryDetail::default()
        }
    }

    fn copy_to(path: &str) -> Copy {
        Copy {
            path: PathBuf::from(path),
        }
    }

    #[test]
    fn test_one_file_per_path_and_company() {
        let writer = CapturingWriter::new();
        let mut mirror = BatchMirror::new(&writer);

        let batch_a = test_batch("companyA", 1);
        let batch_b = test_batch("companyB", 2);
        mirror.save_entry(&batch_a, &copy_to("/recon"), &test_entry("121042880000001", 100));
        mirror.save_entry(&batch_a, &copy_to("/recon"), &test_entry("121042880000002", 200));
        mirror.save_entry(&batch_b, &copy_to("/recon"), &test_entry("121042880000003", 300));
        mirror.save_files().unwrap();

        let writes = writer.writes();
        assert_eq!(writes.len(), 2, "one file per (path, company) group");
        assert!(writes.iter().all(|w| w.delay.is_none()));

        let file_names: Vec<String> = writes
            .iter()
            .map(|w| w.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert!(file_names[0].starts_with("companyA_"));
        assert!(file_names[1].starts_with("companyB_"));
        assert!(file_names.iter().all(|n| n.ends_with(".ach")));
    }

    #[test]
    fn test_batches_flushed_in_batch_number_order() {
        let writer = CapturingWriter::new();
        let mut mirror = BatchMirror::new(&writer);

        // Arrival order deliberately reversed.
        let later = test_batch("companyA", 7);
        let earlier = test_batch("companyA", 2);
        mirror.save_entry(&later, &copy_to("/recon"), &test_entry("121042880000007", 700));
        mirror.save_entry(&earlier, &copy_to("/recon"), &test_entry("121042880000002", 200));
        mirror.save_files().unwrap();

        let writes = writer.writes();
        assert_eq!(writes.len(), 1);
        let contents = String::from_utf8(writes[0].contents.clone()).unwrap();
        let batch_headers: Vec<&str> = contents
            .lines()
            .filter(|l| l.starts_with('5'))
            .collect();
        assert_eq!(batch_headers.len(), 2);
        let first_number: u32 = batch_headers[0][87..94].trim_start_matches('0').parse().unwrap();
        let second_number: u32 = batch_headers[1][87..94].trim_start_matches('0').parse().unwrap();
        assert!(first_number < second_number);
    }

    #[test]
    fn test_controls_are_recomputed_from_entries() {
        let writer = CapturingWriter::new();
        let mut mirror = BatchMirror::new(&writer);

        let batch = test_batch("companyA", 1);
        mirror.save_entry(&batch, &copy_to("/recon"), &test_entry("121042880000001", 100));
        mirror.save_entry(&batch, &copy_to("/recon"), &test_entry("121042880000002", 250));
        mirror.save_files().unwrap();

        let writes = writer.writes();
        let contents = String::from_utf8(writes[0].contents.clone()).unwrap();
        let control_line = contents.lines().find(|l| l.starts_with('8')).unwrap();
        let control = BatchControl::parse(control_line).unwrap();
        assert_eq!(control.entry_addenda_count, 2);
        assert_eq!(control.total_debit, 350);
        assert_eq!(control.entry_hash, 2 * 23138010);
    }

    #[test]
    fn test_empty_mirror_writes_nothing() {
        let writer = CapturingWriter::new();
        let mirror = BatchMirror::new(&writer);
        assert!(mirror.is_empty());
        mirror.save_files().unwrap();
        assert!(writer.writes().is_empty());
    }

    #[test]
    fn test_filename_includes_content_hash() {
        let key = MirrorKey {
            path: PathBuf::from("/recon"),
            company_id: "companyA".to_string(),
        };
        let path = key.file_path(b"some bytes", Local::now());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let parts: Vec<&str> = name.trim_end_matches(".ach").splitn(3, '_').collect();
        assert_eq!(parts[0], "companyA");
        assert_eq!(parts[2].len(), 8, "short hash is 8 hex characters");
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }
}
