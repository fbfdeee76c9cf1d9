//! Fixed-width NACHA record types.
//!
//! Every record is one 94-character line. Serialization pads alphanumeric
//! fields to the right with spaces and numeric fields to the left with zeros;
//! parsing reverses the padding. Only the record types this engine needs are
//! modeled: file header/control, batch header/control, entry detail, and the
//! Addenda98 (NOC) and Addenda99 (Return) records.

use crate::ach::codes::{self, sec};
use crate::ach::error::AchError;

/// Left-justify and space-pad `value` into `width` characters, truncating if
/// it is too long.
fn alpha(value: &str, width: usize) -> String {
    format!("{value:<width$.width$}")
}

/// Zero-pad `value` into `width` digits, keeping the trailing digits if the
/// value is too wide.
fn numeric(value: u64, width: usize) -> String {
    let s = value.to_string();
    if s.len() > width {
        s[s.len() - width..].to_string()
    } else {
        format!("{s:0>width$}")
    }
}

/// Zero-pad a numeric string into `width` characters, keeping the trailing
/// characters if it is too long.
fn numeric_str(value: &str, width: usize) -> String {
    if value.len() > width {
        value[value.len() - width..].to_string()
    } else {
        format!("{value:0>width$}")
    }
}

fn parse_u64(record: &'static str, field: &'static str, value: &str) -> Result<u64, AchError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| AchError::NonNumericField {
        record,
        field,
        value: value.to_string(),
    })
}

fn require_digits(
    record: &'static str,
    field: &'static str,
    value: &str,
    width: usize,
) -> Result<(), AchError> {
    if value.len() != width || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(AchError::validation(
            record,
            field,
            format!("'{value}' must be {width} digits"),
        ));
    }
    Ok(())
}

/// File header record (record type 1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileHeader {
    /// Routing number of the institution receiving this file (9 digits).
    pub immediate_destination: String,
    /// Routing number of the institution sending this file (9 digits).
    pub immediate_origin: String,
    /// File creation date, `YYMMDD`.
    pub file_creation_date: String,
    /// File creation time, `HHMM`.
    pub file_creation_time: String,
    /// Distinguishes multiple files created the same day ("A".."Z", "0".."9").
    pub file_id_modifier: String,
    pub immediate_destination_name: String,
    pub immediate_origin_name: String,
    pub reference_code: String,
}

impl FileHeader {
    pub fn new() -> Self {
        FileHeader {
            file_id_modifier: "A".to_string(),
            ..FileHeader::default()
        }
    }

    /// Serialize into a 94-character record line.
    ///
    /// Routing numbers occupy 10-character fields; a 9-digit number gains the
    /// conventional leading space.
    pub fn to_record(&self) -> String {
        let mut line = String::with_capacity(94);
        line.push('1');
        line.push_str("01");
        line.push_str(&format!("{:>10}", alpha(&self.immediate_destination, 9).trim_end()));
        line.push_str(&format!("{:>10}", alpha(&self.immediate_origin, 9).trim_end()));
        line.push_str(&alpha(&self.file_creation_date, 6));
        line.push_str(&alpha(&self.file_creation_time, 4));
        line.push_str(&alpha(&self.file_id_modifier, 1));
        line.push_str("094");
        line.push_str("10");
        line.push('1');
        line.push_str(&alpha(&self.immediate_destination_name, 23));
        line.push_str(&alpha(&self.immediate_origin_name, 23));
        line.push_str(&alpha(&self.reference_code, 8));
        line
    }

    /// Parse from a 94-character record line.
    pub fn parse(line: &str) -> Result<Self, AchError> {
        Ok(FileHeader {
            immediate_destination: line[3..13].trim().to_string(),
            immediate_origin: line[13..23].trim().to_string(),
            file_creation_date: line[23..29].trim().to_string(),
            file_creation_time: line[29..33].trim().to_string(),
            file_id_modifier: line[33..34].to_string(),
            immediate_destination_name: line[40..63].trim_end().to_string(),
            immediate_origin_name: line[63..86].trim_end().to_string(),
            reference_code: line[86..94].trim_end().to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), AchError> {
        for (field, value) in [
            ("immediate_destination", &self.immediate_destination),
            ("immediate_origin", &self.immediate_origin),
        ] {
            if !(value.len() == 9 || value.len() == 10) || !value.trim().chars().all(|c| c.is_ascii_digit()) {
                return Err(AchError::validation(
                    "FileHeader",
                    field,
                    format!("'{value}' is not a routing number"),
                ));
            }
        }
        require_digits("FileHeader", "file_creation_date", &self.file_creation_date, 6)?;
        require_digits("FileHeader", "file_creation_time", &self.file_creation_time, 4)?;
        if self.file_id_modifier.len() != 1
            || !self.file_id_modifier.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(AchError::validation(
                "FileHeader",
                "file_id_modifier",
                format!("'{}' must be one letter or digit", self.file_id_modifier),
            ));
        }
        Ok(())
    }
}

/// Batch header record (record type 5).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchHeader {
    /// 200 (mixed), 220 (credits only), or 225 (debits only).
    pub service_class_code: u16,
    pub company_name: String,
    pub company_discretionary_data: String,
    pub company_identification: String,
    /// Standard Entry Class code, e.g. "PPD" or "COR".
    pub standard_entry_class_code: String,
    pub company_entry_description: String,
    pub company_descriptive_date: String,
    pub effective_entry_date: String,
    pub settlement_date: String,
    pub originator_status_code: String,
    /// 8-digit ABA prefix of the originating institution.
    pub odfi_identification: String,
    pub batch_number: u32,
}

impl BatchHeader {
    pub fn new() -> Self {
        BatchHeader {
            service_class_code: 200,
            originator_status_code: "1".to_string(),
            batch_number: 1,
            ..BatchHeader::default()
        }
    }

    /// Serialize into a 94-character record line.
    pub fn to_record(&self) -> String {
        let mut line = String::with_capacity(94);
        line.push('5');
        line.push_str(&numeric(u64::from(self.service_class_code), 3));
        line.push_str(&alpha(&self.company_name, 16));
        line.push_str(&alpha(&self.company_discretionary_data, 20));
        line.push_str(&alpha(&self.company_identification, 10));
        line.push_str(&alpha(&self.standard_entry_class_code, 3));
        line.push_str(&alpha(&self.company_entry_description, 10));
        line.push_str(&alpha(&self.company_descriptive_date, 6));
        line.push_str(&alpha(&self.effective_entry_date, 6));
        line.push_str(&alpha(&self.settlement_date, 3));
        line.push_str(&alpha(&self.originator_status_code, 1));
        line.push_str(&numeric_str(&self.odfi_identification, 8));
        line.push_str(&numeric(u64::from(self.batch_number), 7));
        line
    }

    /// Parse from a 94-character record line.
    pub fn parse(line: &str) -> Result<Self, AchError> {
        Ok(BatchHeader {
            service_class_code: parse_u64("BatchHeader", "service_class_code", &line[1..4])? as u16,
            company_name: line[4..20].trim_end().to_string(),
            company_discretionary_data: line[20..40].trim_end().to_string(),
            company_identification: line[40..50].trim_end().to_string(),
            standard_entry_class_code: line[50..53].trim_end().to_string(),
            company_entry_description: line[53..63].trim_end().to_string(),
            company_descriptive_date: line[63..69].trim_end().to_string(),
            effective_entry_date: line[69..75].trim_end().to_string(),
            settlement_date: line[75..78].trim_end().to_string(),
            originator_status_code: line[78..79].to_string(),
            odfi_identification: line[79..87].trim().to_string(),
            batch_number: parse_u64("BatchHeader", "batch_number", &line[87..94])? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), AchError> {
        if !matches!(self.service_class_code, 200 | 220 | 225) {
            return Err(AchError::validation(
                "BatchHeader",
                "service_class_code",
                format!("unknown service class code {}", self.service_class_code),
            ));
        }
        if !sec::ALL.contains(&self.standard_entry_class_code.as_str()) {
            return Err(AchError::validation(
                "BatchHeader",
                "standard_entry_class_code",
                format!("unknown SEC code '{}'", self.standard_entry_class_code),
            ));
        }
        if self.company_identification.trim().is_empty() {
            return Err(AchError::validation(
                "BatchHeader",
                "company_identification",
                "must not be empty",
            ));
        }
        require_digits("BatchHeader", "odfi_identification", &self.odfi_identification, 8)?;
        Ok(())
    }
}

/// Where an entry sits in the response lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Category {
    /// An ordinary forward entry.
    #[default]
    Forward,
    /// A returned entry (carries an Addenda99).
    Return,
    /// A notification of change (carries an Addenda98).
    Noc,
}

/// Entry detail record (record type 6).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDetail {
    pub transaction_code: u8,
    /// 8-digit ABA prefix of the receiving institution.
    pub rdfi_identification: String,
    /// Check digit of the receiving institution's routing number.
    pub check_digit: String,
    pub dfi_account_number: String,
    /// Amount in cents.
    pub amount: u64,
    pub identification_number: String,
    pub individual_name: String,
    pub discretionary_data: String,
    /// 1 when an addenda record follows this entry.
    pub addenda_record_indicator: u8,
    pub trace_number: String,
    /// CTX/ATX batches carry the addenda count inside the entry record.
    pub catx_addenda_records: Option<u16>,
    pub addenda98: Option<Addenda98>,
    pub addenda99: Option<Addenda99>,
    pub category: Category,
}

impl EntryDetail {
    pub fn new() -> Self {
        EntryDetail::default()
    }

    /// Store the addenda-record count for CTX/ATX serialization.
    pub fn set_catx_addenda_records(&mut self, count: u16) {
        self.catx_addenda_records = Some(count);
    }

    /// Serialize into a 94-character record line.
    ///
    /// `sec_code` selects the layout of the name field: CTX and ATX replace
    /// the 22-character individual name with a 4-digit addenda count, a
    /// 16-character receiving company name, and 2 reserved characters.
    pub fn to_record(&self, sec_code: &str) -> String {
        let mut line = String::with_capacity(94);
        line.push('6');
        line.push_str(&numeric(u64::from(self.transaction_code), 2));
        line.push_str(&numeric_str(&self.rdfi_identification, 8));
        line.push_str(&alpha(&self.check_digit, 1));
        line.push_str(&alpha(&self.dfi_account_number, 17));
        line.push_str(&numeric(self.amount, 10));
        line.push_str(&alpha(&self.identification_number, 15));
        if sec::carries_addenda_count(sec_code) {
            let count = self.catx_addenda_records.unwrap_or(0);
            line.push_str(&numeric(u64::from(count), 4));
            line.push_str(&alpha(&self.individual_name, 16));
            line.push_str("  ");
        } else {
            line.push_str(&alpha(&self.individual_name, 22));
        }
        line.push_str(&alpha(&self.discretionary_data, 2));
        line.push_str(&numeric(u64::from(self.addenda_record_indicator), 1));
        line.push_str(&numeric_str(&self.trace_number, 15));
        line
    }

    /// Parse from a 94-character record line.
    pub fn parse(line: &str, sec_code: &str) -> Result<Self, AchError> {
        let mut entry = EntryDetail {
            transaction_code: parse_u64("EntryDetail", "transaction_code", &line[1..3])? as u8,
            rdfi_identification: line[3..11].to_string(),
            check_digit: line[11..12].to_string(),
            dfi_account_number: line[12..29].trim_end().to_string(),
            amount: parse_u64("EntryDetail", "amount", &line[29..39])?,
            identification_number: line[39..54].trim_end().to_string(),
            discretionary_data: line[76..78].trim_end().to_string(),
            addenda_record_indicator: parse_u64(
                "EntryDetail",
                "addenda_record_indicator",
                &line[78..79],
            )? as u8,
            trace_number: line[79..94].to_string(),
            ..EntryDetail::default()
        };
        if sec::carries_addenda_count(sec_code) {
            entry.catx_addenda_records =
                Some(parse_u64("EntryDetail", "catx_addenda_records", &line[54..58])? as u16);
            entry.individual_name = line[58..74].trim_end().to_string();
        } else {
            entry.individual_name = line[54..76].trim_end().to_string();
        }
        Ok(entry)
    }

    pub fn validate(&self) -> Result<(), AchError> {
        if !codes::is_known_transaction_code(self.transaction_code) {
            return Err(AchError::validation(
                "EntryDetail",
                "transaction_code",
                format!("unknown transaction code {}", self.transaction_code),
            ));
        }
        require_digits("EntryDetail", "rdfi_identification", &self.rdfi_identification, 8)?;
        require_digits("EntryDetail", "check_digit", &self.check_digit, 1)?;
        if self.amount > 9_999_999_999 {
            return Err(AchError::validation(
                "EntryDetail",
                "amount",
                format!("{} exceeds the 10-digit amount field", self.amount),
            ));
        }
        if self.trace_number.is_empty() || self.trace_number.len() > 15 {
            return Err(AchError::validation(
                "EntryDetail",
                "trace_number",
                format!("'{}' must be 1-15 characters", self.trace_number),
            ));
        }
        match self.category {
            Category::Noc => {
                if self.amount != 0 {
                    return Err(AchError::validation(
                        "EntryDetail",
                        "amount",
                        "notifications of change are zero-dollar entries",
                    ));
                }
                if self.addenda98.is_none() {
                    return Err(AchError::validation(
                        "EntryDetail",
                        "addenda98",
                        "NOC entries require an Addenda98",
                    ));
                }
            }
            Category::Return => {
                if self.addenda99.is_none() {
                    return Err(AchError::validation(
                        "EntryDetail",
                        "addenda99",
                        "returned entries require an Addenda99",
                    ));
                }
            }
            Category::Forward => {}
        }
        if self.addenda_record_indicator == 1
            && self.addenda98.is_none()
            && self.addenda99.is_none()
            && self.catx_addenda_records.is_none()
        {
            return Err(AchError::validation(
                "EntryDetail",
                "addenda_record_indicator",
                "indicator set without an addenda record",
            ));
        }
        if let Some(addenda) = &self.addenda98 {
            addenda.validate()?;
        }
        if let Some(addenda) = &self.addenda99 {
            addenda.validate()?;
        }
        Ok(())
    }
}

/// Notification-of-change addenda record (record type 7, addenda type 98).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda98 {
    pub change_code: String,
    /// Trace number of the entry being corrected.
    pub original_trace: String,
    /// 8-digit ABA prefix of the original receiving institution.
    pub original_dfi: String,
    pub corrected_data: String,
    pub trace_number: String,
}

impl Addenda98 {
    pub fn new() -> Self {
        Addenda98::default()
    }

    /// Serialize into a 94-character record line.
    pub fn to_record(&self) -> String {
        let mut line = String::with_capacity(94);
        line.push('7');
        line.push_str("98");
        line.push_str(&alpha(&self.change_code, 3));
        line.push_str(&numeric_str(&self.original_trace, 15));
        line.push_str(&alpha("", 6));
        line.push_str(&numeric_str(&self.original_dfi, 8));
        line.push_str(&alpha(&self.corrected_data, 29));
        line.push_str(&alpha("", 15));
        line.push_str(&numeric_str(&self.trace_number, 15));
        line
    }

    /// Parse from a 94-character record line.
    pub fn parse(line: &str) -> Result<Self, AchError> {
        Ok(Addenda98 {
            change_code: line[3..6].trim_end().to_string(),
            original_trace: line[6..21].to_string(),
            original_dfi: line[27..35].to_string(),
            corrected_data: line[35..64].trim_end().to_string(),
            trace_number: line[79..94].to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), AchError> {
        if codes::lookup_change_code(&self.change_code).is_none() {
            return Err(AchError::validation(
                "Addenda98",
                "change_code",
                format!("unknown change code '{}'", self.change_code),
            ));
        }
        if self.corrected_data.is_empty() || self.corrected_data.len() > 29 {
            return Err(AchError::validation(
                "Addenda98",
                "corrected_data",
                format!("'{}' must be 1-29 characters", self.corrected_data),
            ));
        }
        require_digits("Addenda98", "original_dfi", &self.original_dfi, 8)?;
        Ok(())
    }
}

/// Return addenda record (record type 7, addenda type 99).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda99 {
    pub return_code: String,
    /// Trace number of the entry being returned.
    pub original_trace: String,
    pub date_of_death: String,
    /// 8-digit ABA prefix of the original receiving institution.
    pub original_dfi: String,
    pub addenda_information: String,
    pub trace_number: String,
}

impl Addenda99 {
    pub fn new() -> Self {
        Addenda99::default()
    }

    /// Serialize into a 94-character record line.
    pub fn to_record(&self) -> String {
        let mut line = String::with_capacity(94);
        line.push('7');
        line.push_str("99");
        line.push_str(&alpha(&self.return_code, 3));
        line.push_str(&numeric_str(&self.original_trace, 15));
        line.push_str(&alpha(&self.date_of_death, 6));
        line.push_str(&numeric_str(&self.original_dfi, 8));
        line.push_str(&alpha(&self.addenda_information, 44));
        line.push_str(&numeric_str(&self.trace_number, 15));
        line
    }

    /// Parse from a 94-character record line.
    pub fn parse(line: &str) -> Result<Self, AchError> {
        Ok(Addenda99 {
            return_code: line[3..6].trim_end().to_string(),
            original_trace: line[6..21].to_string(),
            date_of_death: line[21..27].trim().to_string(),
            original_dfi: line[27..35].to_string(),
            addenda_information: line[35..79].trim_end().to_string(),
            trace_number: line[79..94].to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), AchError> {
        if codes::lookup_return_code(&self.return_code).is_none() {
            return Err(AchError::validation(
                "Addenda99",
                "return_code",
                format!("unknown return code '{}'", self.return_code),
            ));
        }
        require_digits("Addenda99", "original_dfi", &self.original_dfi, 8)?;
        Ok(())
    }
}

/// Batch control record (record type 8).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchControl {
    pub service_class_code: u16,
    /// Count of entry detail plus addenda records in the batch.
    pub entry_addenda_count: u32,
    /// Sum of entry RDFI identifications, truncated to 10 digits.
    pub entry_hash: u64,
    pub total_debit: u64,
    pub total_credit: u64,
    pub company_identification: String,
    pub message_authentication_code: String,
    pub odfi_identification: String,
    pub batch_number: u32,
}

impl BatchControl {
    /// Serialize into a 94-character record line.
    pub fn to_record(&self) -> String {
        let mut line = String::with_capacity(94);
        line.push('8');
        line.push_str(&numeric(u64::from(self.service_class_code), 3));
        line.push_str(&numeric(u64::from(self.entry_addenda_count), 6));
        line.push_str(&numeric(self.entry_hash, 10));
        line.push_str(&numeric(self.total_debit, 12));
        line.push_str(&numeric(self.total_credit, 12));
        line.push_str(&alpha(&self.company_identification, 10));
        line.push_str(&alpha(&self.message_authentication_code, 19));
        line.push_str(&alpha("", 6));
        line.push_str(&numeric_str(&self.odfi_identification, 8));
        line.push_str(&numeric(u64::from(self.batch_number), 7));
        line
    }

    /// Parse from a 94-character record line.
    pub fn parse(line: &str) -> Result<Self, AchError> {
        Ok(BatchControl {
            service_class_code: parse_u64("BatchControl", "service_class_code", &line[1..4])? as u16,
            entry_addenda_count: parse_u64("BatchControl", "entry_addenda_count", &line[4..10])? as u32,
            entry_hash: parse_u64("BatchControl", "entry_hash", &line[10..20])?,
            total_debit: parse_u64("BatchControl", "total_debit", &line[20..32])?,
            total_credit: parse_u64("BatchControl", "total_credit", &line[32..44])?,
            company_identification: line[44..54].trim_end().to_string(),
            message_authentication_code: line[54..73].trim_end().to_string(),
            odfi_identification: line[79..87].trim().to_string(),
            batch_number: parse_u64("BatchControl", "batch_number", &line[87..94])? as u32,
        })
    }
}

/// File control record (record type 9).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileControl {
    pub batch_count: u32,
    /// Count of 10-record blocks in the file, including padding.
    pub block_count: u32,
    pub entry_addenda_count: u32,
    pub entry_hash: u64,
    pub total_debit: u64,
    pub total_credit: u64,
}

impl FileControl {
    /// Serialize into a 94-character record line.
    pub fn to_record(&self) -> String {
        let mut line = String::with_capacity(94);
        line.push('9');
        line.push_str(&numeric(u64::from(self.batch_count), 6));
        line.push_str(&numeric(u64::from(self.block_count), 6));
        line.push_str(&numeric(u64::from(self.entry_addenda_count), 8));
        line.push_str(&numeric(self.entry_hash, 10));
        line.push_str(&numeric(self.total_debit, 12));
        line.push_str(&numeric(self.total_credit, 12));
        line.push_str(&alpha("", 39));
        line
    }

    /// Parse from a 94-character record line.
    pub fn parse(line: &str) -> Result<Self, AchError> {
        Ok(FileControl {
            batch_count: parse_u64("FileControl", "batch_count", &line[1..7])? as u32,
            block_count: parse_u64("FileControl", "block_count", &line[7..13])? as u32,
            entry_addenda_count: parse_u64("FileControl", "entry_addenda_count", &line[13..21])? as u32,
            entry_hash: parse_u64("FileControl", "entry_hash", &line[21..31])?,
            total_debit: parse_u64("FileControl", "total_debit", &line[31..43])?,
            total_credit: parse_u64("FileControl", "total_credit", &line[43..55])?,
        })
    }
}
