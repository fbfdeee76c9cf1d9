//! Serialize a [`File`] back into NACHA-formatted bytes.

use crate::ach::error::AchError;
use crate::ach::file::File;

/// Records per block; files are padded to a block boundary with lines of
/// nines.
const BLOCKING_FACTOR: usize = 10;

/// Serialize `file` into NACHA-formatted bytes.
///
/// The file must have been finalized with [`File::create`] so every batch and
/// the file itself carry control records.
pub fn write(file: &File) -> Result<Vec<u8>, AchError> {
    let mut lines: Vec<String> = Vec::new();
    lines.push(file.header.to_record());
    for batch in file.batches() {
        let sec_code = batch.header().standard_entry_class_code.clone();
        lines.push(batch.header().to_record());
        for entry in batch.entries() {
            lines.push(entry.to_record(&sec_code));
            if let Some(addenda) = &entry.addenda98 {
                lines.push(addenda.to_record());
            }
            if let Some(addenda) = &entry.addenda99 {
                lines.push(addenda.to_record());
            }
        }
        let control = batch
            .control()
            .ok_or(AchError::MissingBatchControl {
                batch_number: batch.header().batch_number,
            })?;
        lines.push(control.to_record());
    }
    let control = file.control().ok_or(AchError::MissingFileControl)?;
    lines.push(control.to_record());

    while lines.len() % BLOCKING_FACTOR != 0 {
        lines.push("9".repeat(94));
    }

    let mut out = String::with_capacity(lines.len() * 95);
    for line in &lines {
        out.push_str(line);
        out.push('\n');
    }
    Ok(out.into_bytes())
}
