//! Parse a byte stream into a [`File`].

use crate::ach::error::AchError;
use crate::ach::file::{Batch, File};
use crate::ach::records::{
    Addenda98, Addenda99, BatchControl, BatchHeader, Category, EntryDetail, FileControl,
    FileHeader,
};

/// Parse NACHA-formatted bytes into a structured [`File`].
///
/// Lines must be 94 characters (carriage returns tolerated); block-padding
/// lines of all nines are skipped. Addenda98/99 records attach to the
/// preceding entry and set its category; other addenda types are rejected.
pub fn read(data: &[u8]) -> Result<File, AchError> {
    let text = String::from_utf8_lossy(data);

    let mut header: Option<FileHeader> = None;
    let mut control: Option<FileControl> = None;
    let mut batches: Vec<Batch> = Vec::new();
    let mut current: Option<Batch> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        if line.len() != 94 || !line.is_ascii() {
            return Err(AchError::InvalidRecordLength {
                line: line_number,
                length: line.chars().count(),
            });
        }

        match line.as_bytes()[0] {
            b'1' => {
                header = Some(FileHeader::parse(line)?);
            }
            b'5' => {
                if let Some(batch) = current.take() {
                    batches.push(batch);
                }
                current = Some(Batch::new(BatchHeader::parse(line)?));
            }
            b'6' => {
                let batch = current.as_mut().ok_or(AchError::RecordOutsideBatch {
                    line: line_number,
                    record: "entry detail",
                })?;
                let entry = EntryDetail::parse(line, &batch.header().standard_entry_class_code)?;
                batch.add_entry(entry);
            }
            b'7' => {
                let batch = current.as_mut().ok_or(AchError::RecordOutsideBatch {
                    line: line_number,
                    record: "addenda",
                })?;
                let entry = batch
                    .entries_mut()
                    .last_mut()
                    .ok_or(AchError::OrphanedAddenda { line: line_number })?;
                match &line[1..3] {
                    "98" => {
                        entry.addenda98 = Some(Addenda98::parse(line)?);
                        entry.category = Category::Noc;
                    }
                    "99" => {
                        entry.addenda99 = Some(Addenda99::parse(line)?);
                        entry.category = Category::Return;
                    }
                    other => {
                        return Err(AchError::UnsupportedAddendaType {
                            line: line_number,
                            type_code: other.to_string(),
                        })
                    }
                }
            }
            b'8' => {
                let mut batch = current.take().ok_or(AchError::RecordOutsideBatch {
                    line: line_number,
                    record: "batch control",
                })?;
                batch.set_control(BatchControl::parse(line)?);
                batches.push(batch);
            }
            b'9' => {
                if line.bytes().all(|b| b == b'9') {
                    continue; // block padding
                }
                control = Some(FileControl::parse(line)?);
            }
            other => {
                return Err(AchError::UnknownRecordType {
                    line: line_number,
                    record_type: other as char,
                })
            }
        }
    }

    if let Some(batch) = current.take() {
        batches.push(batch);
    }

    let mut file = File::new(header.unwrap_or_default());
    for batch in batches {
        file.add_batch(batch);
    }
    if let Some(control) = control {
        file.set_control(control);
    }
    Ok(file)
}
