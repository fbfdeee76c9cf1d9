//! File transformer: orchestrates matching, morphing, and output assembly.
//!
//! One `transform` call handles one inbound file: every entry is matched
//! against the configured rules, copy matches go to the reconciliation
//! mirror, process matches are morphed into response entries and bucketed
//! into output batches keyed by (delay, NOC-ness). Output files are keyed by
//! delay so every distinct settlement lag lands in its own file. All
//! accumulators live inside the call; concurrent transforms share nothing
//! mutable.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::ach::file::{Batch, File as AchFile};
use crate::ach::records::{BatchHeader, Category, FileHeader};
use crate::ach::{codes, routing};
use crate::core::batch_mirror::{fractional_timestamp, BatchMirror};
use crate::core::entry_transformer::TransformerChain;
use crate::core::matcher::Matcher;
use crate::io::writer::FileWriter;
use crate::types::rule::Delay;
use crate::types::ResponderError;

/// Output-batch key: settlement delay plus whether the batch holds NOCs.
type BatchKey = (Option<Delay>, bool);

/// Transforms inbound files into response files and reconciliation mirrors.
pub struct FileTransformer<W> {
    matcher: Matcher,
    entry: TransformerChain,
    writer: W,
    return_path: PathBuf,
}

impl<W: FileWriter> FileTransformer<W> {
    pub fn new(matcher: Matcher, writer: W, return_path: impl Into<PathBuf>) -> Self {
        FileTransformer {
            matcher,
            entry: TransformerChain::standard(),
            writer,
            return_path: return_path.into(),
        }
    }

    /// Access to the writer, for wiring the transport layer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Transform one inbound file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An entry cannot be morphed into its response form
    /// - An output batch or file fails control computation or validation
    /// - Writing a reconciliation or response file fails
    ///
    /// Output files already written before a later failure are not rolled
    /// back; callers must tolerate partial completion.
    pub fn transform(&self, file: &AchFile) -> Result<(), ResponderError> {
        let mut rng = StdRng::from_entropy();
        self.transform_with_rng(file, &mut rng)
    }

    /// Transform with an injected randomness source (used for filenames), so
    /// the whole call is a function of its inputs plus injected randomness.
    pub fn transform_with_rng<R: Rng>(
        &self,
        file: &AchFile,
        rng: &mut R,
    ) -> Result<(), ResponderError> {
        // Response files to write, one per distinct delay duration.
        let mut out_files: BTreeMap<Option<Delay>, AchFile> = BTreeMap::new();

        // Copies of original entries for the reconciliation files (if any).
        let mut mirror = BatchMirror::new(&self.writer);

        for (i, batch) in file.batches().iter().enumerate() {
            // Response batches for this inbound batch, keyed by delay and
            // NOC-ness; initialized lazily the first time a key is needed.
            let mut out_batches: BTreeMap<BatchKey, Batch> = BTreeMap::new();

            let header = batch.header();
            for (j, entry) in batch.entries().iter().enumerate() {
                let (copy_action, process_action) = self.matcher.find_action(header, entry);
                if let Some(copy) = copy_action.and_then(|action| action.copy.as_ref()) {
                    mirror.save_entry(batch, copy, entry);
                }
                let Some(action) = process_action else {
                    continue;
                };

                let morphed = self
                    .entry
                    .morph_entry(&file.header, header, entry, action)
                    .map_err(|source| ResponderError::MorphEntry {
                        batch: i,
                        entry: j,
                        source,
                    })?;
                debug!(
                    original_trace = %entry.trace_number,
                    response_trace = %morphed.trace_number,
                    category = ?morphed.category,
                    delay = ?action.delay,
                    "morphed entry"
                );

                let is_noc = morphed.category == Category::Noc;
                out_batches
                    .entry((action.delay, is_noc))
                    .or_insert_with(|| response_batch(&file.header, header, is_noc))
                    .add_entry(morphed);
            }

            // Finalize this inbound batch's response buckets.
            for ((delay, _is_noc), mut out_batch) in out_batches {
                if out_batch.entries().is_empty() {
                    continue;
                }
                // Entries arrive in file order; sort by trace number so
                // repeated transforms of the same input are reproducible.
                out_batch
                    .entries_mut()
                    .sort_by(|a, b| a.trace_number.cmp(&b.trace_number));
                out_batch
                    .create()
                    .map_err(|source| ResponderError::BatchCreate { batch: i, source })?;

                let out = out_file(&mut out_files, delay, &file.header)?;
                out.add_batch(out_batch);
            }
        }

        // Write the reconciliation files before the response files.
        mirror.save_files()?;

        for (delay, mut out) in out_files {
            if out.batches().is_empty() {
                continue;
            }
            out.create()?;
            out.validate()?;
            let path = self.return_path.join(generate_filename(&out, rng));
            self.writer.write_file(&path, &out, delay)?;
        }
        Ok(())
    }
}

/// Get or lazily create the output file for `delay`.
fn out_file<'m>(
    out_files: &'m mut BTreeMap<Option<Delay>, AchFile>,
    delay: Option<Delay>,
    inbound: &FileHeader,
) -> Result<&'m mut AchFile, ResponderError> {
    match out_files.entry(delay) {
        Entry::Occupied(occupied) => Ok(occupied.into_mut()),
        Entry::Vacant(vacant) => {
            let header = response_file_header(inbound)?;
            Ok(vacant.insert(AchFile::new(header)))
        }
    }
}

/// Build a response file header: origin and destination swapped, a fresh
/// creation timestamp, and a fixed file ID modifier.
fn response_file_header(inbound: &FileHeader) -> Result<FileHeader, ResponderError> {
    let now = Local::now();
    let mut header = FileHeader::new();
    header.immediate_destination = inbound.immediate_origin.clone();
    header.immediate_destination_name = inbound.immediate_origin_name.clone();
    header.immediate_origin = inbound.immediate_destination.clone();
    header.immediate_origin_name = inbound.immediate_destination_name.clone();
    header.file_creation_date = now.format("%y%m%d").to_string();
    header.file_creation_time = now.format("%H%M").to_string();
    header.validate()?;
    Ok(header)
}

/// Build a response batch header from the inbound one: the SEC code flips to
/// COR for NOC batches, and the ODFI identification becomes the responding
/// institution (the inbound file's immediate destination).
fn response_batch(file_header: &FileHeader, inbound: &BatchHeader, is_noc: bool) -> Batch {
    let mut header = inbound.clone();
    if is_noc {
        header.standard_entry_class_code = codes::sec::COR.to_string();
    }
    if let Some(aba8) = routing::aba8(&file_header.immediate_destination) {
        header.odfi_identification = aba8;
    }
    Batch::new(header)
}

/// Derive the output filename: `CORRECTION_` when any batch carries the COR
/// class, otherwise `RETURN_`, plus a timestamp and a random suffix.
fn generate_filename<R: Rng>(file: &AchFile, rng: &mut R) -> String {
    let timestamp = fractional_timestamp(Local::now());
    let suffix: u64 = rng.gen();
    let corrected = file
        .batches()
        .iter()
        .any(|batch| batch.header().standard_entry_class_code == codes::sec::COR);
    if corrected {
        format!("CORRECTION_{timestamp}_{suffix}.ach")
    } else {
        format!("RETURN_{timestamp}_{suffix}.ach")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ach;
    use crate::ach::records::EntryDetail;
    use crate::io::writer::test_support::{CapturedWrite, CapturingWriter};
    use crate::types::rule::{Action, Amount, Copy, Correction, Match, Response, Return};
    use std::sync::Arc;

    fn inbound_file(entries: Vec<EntryDetail>) -> AchFile {
        let mut batch = Batch::new(BatchHeader {
            service_class_code: 200,
            company_name: "Best Co".to_string(),
            company_identification: "231380104".to_string(),
            standard_entry_class_code: "PPD".to_string(),
            company_entry_description: "PAYROLL".to_string(),
            originator_status_code: "1".to_string(),
            odfi_identification: "23138010".to_string(),
            batch_number: 1,
            ..BatchHeader::default()
        });
        for entry in entries {
            batch.add_entry(entry);
        }
        batch.create().unwrap();

        let mut file = AchFile::new(FileHeader {
            immediate_destination: "121042882".to_string(),
            immediate_origin: "231380104".to_string(),
            file_creation_date: "240115".to_string(),
            file_creation_time: "1304".to_string(),
            file_id_modifier: "A".to_string(),
            immediate_destination_name: "Receiving Bank".to_string(),
            immediate_origin_name: "Best Co".to_string(),
            ..FileHeader::default()
        });
        file.add_batch(batch);
        file.create().unwrap();
        file
    }

    fn entry(trace: &str, amount: u64) -> EntryDetail {
        EntryDetail {
            transaction_code: codes::CHECKING_DEBIT,
            rdfi_identification: "08300013".to_string(),
            check_digit: "7".to_string(),
            dfi_account_number: "12345678".to_string(),
            amount,
            individual_name: "Jane Doe".to_string(),
            trace_number: trace.to_string(),
            ..EntryDetail::default()
        }
    }

    fn transformer(responses: Vec<Response>, writer: CapturingWriter) -> FileTransformer<CapturingWriter> {
        let matcher = Matcher::new(false, Arc::from(responses));
        FileTransformer::new(matcher, writer, "returned")
    }

    fn amount_rule(cents: u64, action: Action) -> Response {
        Response {
            matcher: Match {
                amount: Some(Amount {
                    value: Some(cents),
                    ..Default::default()
                }),
                ..Default::default()
            },
            not: Match::default(),
            action,
        }
    }

    fn return_action(code: &str, delay: Option<&str>) -> Action {
        Action {
            delay: delay.map(|d| d.parse().unwrap()),
            return_: Some(Return {
                code: code.to_string(),
            }),
            ..Default::default()
        }
    }

    fn response_writes(writes: &[CapturedWrite]) -> Vec<&CapturedWrite> {
        writes
            .iter()
            .filter(|w| w.path.starts_with("returned"))
            .collect()
    }

    #[test]
    fn test_return_rule_writes_return_file() {
        let writer = CapturingWriter::new();
        let ft = transformer(
            vec![amount_rule(500_000, return_action("R03", None))],
            writer,
        );
        let file = inbound_file(vec![entry("083000130000001", 500_000)]);
        ft.transform(&file).unwrap();

        let writes = ft.writer().writes();
        assert_eq!(writes.len(), 1);
        let write = &writes[0];
        assert!(write.path.starts_with("returned"));
        assert!(write
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("RETURN_"));
        assert!(write.delay.is_none());

        let out = ach::read(&write.contents).unwrap();
        // Origin and destination are swapped on the response.
        assert_eq!(out.header.immediate_destination, "231380104");
        assert_eq!(out.header.immediate_origin, "121042882");
        assert_eq!(out.batches().len(), 1);
        let batch = &out.batches()[0];
        assert_eq!(batch.header().standard_entry_class_code, "PPD");
        // ODFI is rewritten to the responding institution.
        assert_eq!(batch.header().odfi_identification, "12104288");
        let response = &batch.entries()[0];
        assert_eq!(response.category, Category::Return);
        assert_eq!(response.amount, 500_000);
        let addenda = response.addenda99.as_ref().unwrap();
        assert_eq!(addenda.return_code, "R03");
        out.validate().unwrap();
    }

    #[test]
    fn test_correction_rule_writes_cor_batch() {
        let writer = CapturingWriter::new();
        let correction = Action {
            correction: Some(Correction {
                code: "C01".to_string(),
                data: "44-5678-99".to_string(),
            }),
            ..Default::default()
        };
        let ft = transformer(vec![amount_rule(500_000, correction)], writer);
        let file = inbound_file(vec![entry("083000130000001", 500_000)]);
        ft.transform(&file).unwrap();

        let writes = ft.writer().writes();
        assert_eq!(writes.len(), 1);
        assert!(writes[0]
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("CORRECTION_"));

        let out = ach::read(&writes[0].contents).unwrap();
        let batch = &out.batches()[0];
        assert_eq!(batch.header().standard_entry_class_code, "COR");
        let response = &batch.entries()[0];
        assert_eq!(response.category, Category::Noc);
        assert_eq!(response.amount, 0);
        assert_eq!(
            response.addenda98.as_ref().unwrap().corrected_data,
            "44-5678-99"
        );
    }

    #[test]
    fn test_copy_only_rule_writes_mirror_not_response() {
        let writer = CapturingWriter::new();
        let copy = Action {
            copy: Some(Copy {
                path: PathBuf::from("reconciliation"),
            }),
            ..Default::default()
        };
        let ft = transformer(vec![amount_rule(500_000, copy)], writer);
        let file = inbound_file(vec![entry("083000130000001", 500_000)]);
        ft.transform(&file).unwrap();

        let writes = ft.writer().writes();
        assert_eq!(writes.len(), 1);
        assert!(writes[0].path.starts_with("reconciliation"));
        assert!(response_writes(&writes).is_empty());

        // The mirrored entry is byte-identical to the original line.
        let contents = String::from_utf8(writes[0].contents.clone()).unwrap();
        let entry_line = contents.lines().find(|l| l.starts_with('6')).unwrap();
        assert_eq!(entry_line, file.batches()[0].entries()[0].to_record("PPD"));
    }

    #[test]
    fn test_delays_bucket_into_separate_files() {
        let writer = CapturingWriter::new();
        let ft = transformer(
            vec![
                amount_rule(100, return_action("R01", None)),
                amount_rule(200, return_action("R02", Some("12h"))),
                amount_rule(300, return_action("R03", Some("12h"))),
            ],
            writer,
        );
        let file = inbound_file(vec![
            entry("083000130000001", 100),
            entry("083000130000002", 200),
            entry("083000130000003", 300),
        ]);
        ft.transform(&file).unwrap();

        let writes = ft.writer().writes();
        assert_eq!(writes.len(), 2, "one file per distinct delay");
        let immediate = writes.iter().find(|w| w.delay.is_none()).unwrap();
        let delayed = writes.iter().find(|w| w.delay.is_some()).unwrap();
        assert_eq!(
            delayed.delay.unwrap().as_duration(),
            std::time::Duration::from_secs(12 * 3600)
        );

        let immediate_file = ach::read(&immediate.contents).unwrap();
        assert_eq!(immediate_file.batches()[0].entries().len(), 1);
        let delayed_file = ach::read(&delayed.contents).unwrap();
        assert_eq!(delayed_file.batches()[0].entries().len(), 2);
    }

    #[test]
    fn test_same_delay_noc_and_return_share_a_file() {
        let writer = CapturingWriter::new();
        let correction = Action {
            correction: Some(Correction {
                code: "C01".to_string(),
                data: "corrected".to_string(),
            }),
            ..Default::default()
        };
        let ft = transformer(
            vec![
                amount_rule(100, return_action("R01", None)),
                amount_rule(200, correction),
            ],
            writer,
        );
        let file = inbound_file(vec![
            entry("083000130000001", 100),
            entry("083000130000002", 200),
        ]);
        ft.transform(&file).unwrap();

        let writes = ft.writer().writes();
        assert_eq!(writes.len(), 1);
        // A file holding any COR batch takes the CORRECTION_ prefix.
        assert!(writes[0]
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("CORRECTION_"));
        let out = ach::read(&writes[0].contents).unwrap();
        assert_eq!(out.batches().len(), 2);
        let classes: Vec<&str> = out
            .batches()
            .iter()
            .map(|b| b.header().standard_entry_class_code.as_str())
            .collect();
        assert!(classes.contains(&"COR"));
        assert!(classes.contains(&"PPD"));
    }

    #[test]
    fn test_output_entries_sorted_by_trace_number() {
        let writer = CapturingWriter::new();
        let ft = transformer(vec![amount_rule(500, return_action("R03", None))], writer);
        let file = inbound_file(vec![
            entry("083000130000009", 500),
            entry("083000130000001", 500),
            entry("083000130000005", 500),
        ]);
        ft.transform(&file).unwrap();

        let writes = ft.writer().writes();
        let out = ach::read(&writes[0].contents).unwrap();
        let traces: Vec<&str> = out.batches()[0]
            .entries()
            .iter()
            .map(|e| e.trace_number.as_str())
            .collect();
        let mut sorted = traces.clone();
        sorted.sort();
        assert_eq!(traces, sorted, "entries must be trace-number ordered");
        assert_eq!(traces.len(), 3);
    }

    #[test]
    fn test_copy_superseded_by_undelayed_return() {
        let writer = CapturingWriter::new();
        let copy = Action {
            copy: Some(Copy {
                path: PathBuf::from("reconciliation"),
            }),
            ..Default::default()
        };
        let ft = transformer(
            vec![
                amount_rule(500_000, copy),
                amount_rule(500_000, return_action("R03", None)),
            ],
            writer,
        );
        let file = inbound_file(vec![entry("083000130000001", 500_000)]);
        ft.transform(&file).unwrap();

        let writes = ft.writer().writes();
        assert_eq!(writes.len(), 1, "undelayed return supersedes the copy");
        assert!(writes[0].path.starts_with("returned"));
    }

    #[test]
    fn test_copy_and_delayed_return_both_apply() {
        let writer = CapturingWriter::new();
        let copy = Action {
            copy: Some(Copy {
                path: PathBuf::from("reconciliation"),
            }),
            ..Default::default()
        };
        let ft = transformer(
            vec![
                amount_rule(500_000, return_action("R03", Some("1h"))),
                amount_rule(500_000, copy),
            ],
            writer,
        );
        let file = inbound_file(vec![entry("083000130000001", 500_000)]);
        ft.transform(&file).unwrap();

        let writes = ft.writer().writes();
        assert_eq!(writes.len(), 2);
        assert!(writes.iter().any(|w| w.path.starts_with("reconciliation")));
        assert!(writes
            .iter()
            .any(|w| w.path.starts_with("returned") && w.delay.is_some()));
    }

    #[test]
    fn test_unmatched_file_writes_nothing() {
        let writer = CapturingWriter::new();
        let ft = transformer(vec![amount_rule(1, return_action("R03", None))], writer);
        let file = inbound_file(vec![entry("083000130000001", 500_000)]);
        ft.transform(&file).unwrap();
        assert!(ft.writer().writes().is_empty());
    }

    #[test]
    fn test_morph_failure_aborts_transform() {
        let writer = CapturingWriter::new();
        // A bad ODFI identification in the batch header breaks trace/RDFI
        // derivation during the morph.
        let matcher = Matcher::new(
            false,
            Arc::from(vec![amount_rule(500_000, return_action("R03", None))]),
        );
        let ft = FileTransformer::new(matcher, writer, "returned");

        let mut batch = Batch::new(BatchHeader {
            service_class_code: 200,
            company_name: "Best Co".to_string(),
            company_identification: "231380104".to_string(),
            standard_entry_class_code: "PPD".to_string(),
            company_entry_description: "PAYROLL".to_string(),
            originator_status_code: "1".to_string(),
            odfi_identification: "bad".to_string(),
            batch_number: 1,
            ..BatchHeader::default()
        });
        batch.add_entry(entry("083000130000001", 500_000));

        let mut file = AchFile::new(FileHeader {
            immediate_destination: "121042882".to_string(),
            immediate_origin: "231380104".to_string(),
            file_creation_date: "240115".to_string(),
            file_creation_time: "1304".to_string(),
            file_id_modifier: "A".to_string(),
            ..FileHeader::default()
        });
        file.add_batch(batch);

        let err = ft.transform(&file).unwrap_err();
        assert!(matches!(err, ResponderError::MorphEntry { batch: 0, entry: 0, .. }));
        assert!(ft.writer().writes().is_empty(), "nothing is written on abort");
    }
}
