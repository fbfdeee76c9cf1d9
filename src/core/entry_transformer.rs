//! Entry transformers: rewrite a matched entry into its bank-response form.
//!
//! Transformers compose as an ordered chain; each variant no-ops when its
//! corresponding Action field is absent, so a single chain serves every
//! process action.

use crate::ach::records::{Addenda98, Addenda99, BatchHeader, Category, EntryDetail, FileHeader};
use crate::ach::{codes, routing, AchError};
use crate::types::rule::{Action, Correction};

/// Fallback for corrections configured without data; an Addenda98 must carry
/// something in its corrected-data field.
const MISSING_CORRECTED_DATA: &str = "missing data";

/// Rewrites one entry according to one Action field.
pub trait EntryTransformer: Send + Sync {
    /// Produce the response entry for `entry`, or return it unchanged when
    /// this transformer's Action field is not set.
    fn morph_entry(
        &self,
        file_header: &FileHeader,
        batch_header: &BatchHeader,
        entry: &EntryDetail,
        action: &Action,
    ) -> Result<EntryDetail, AchError>;
}

/// An ordered chain of transformers applied in sequence.
pub struct TransformerChain {
    transformers: Vec<Box<dyn EntryTransformer>>,
}

impl TransformerChain {
    /// The standard chain: corrections, then returns.
    pub fn standard() -> Self {
        TransformerChain {
            transformers: vec![
                Box::new(CorrectionTransformer),
                Box::new(ReturnTransformer),
            ],
        }
    }

    pub fn morph_entry(
        &self,
        file_header: &FileHeader,
        batch_header: &BatchHeader,
        entry: &EntryDetail,
        action: &Action,
    ) -> Result<EntryDetail, AchError> {
        let mut current = entry.clone();
        for transformer in &self.transformers {
            current = transformer.morph_entry(file_header, batch_header, &current, action)?;
        }
        Ok(current)
    }
}

/// Map a forward transaction code onto its return/NOC sibling.
///
/// Credit and debit codes map by subtracting one, except LoanDebit (55) which
/// sits directly below its sibling (56) and maps by adding one. Prenote codes
/// map by subtracting two. Anything else passes through unchanged.
fn response_transaction_code(code: u8) -> u8 {
    match code {
        codes::CHECKING_CREDIT
        | codes::CHECKING_DEBIT
        | codes::SAVINGS_CREDIT
        | codes::SAVINGS_DEBIT
        | codes::GL_CREDIT
        | codes::GL_DEBIT
        | codes::LOAN_CREDIT => code - 1,

        codes::LOAN_DEBIT => code + 1,

        codes::CHECKING_PRENOTE_CREDIT
        | codes::CHECKING_PRENOTE_DEBIT
        | codes::SAVINGS_PRENOTE_CREDIT
        | codes::SAVINGS_PRENOTE_DEBIT
        | codes::GL_PRENOTE_CREDIT
        | codes::GL_PRENOTE_DEBIT
        | codes::LOAN_PRENOTE_CREDIT => code - 2,

        other => other,
    }
}

/// Build the response entry shared by both variants: mapped transaction code,
/// RDFI fields derived from the batch header's ODFI identification, carried
/// identification fields, and a freshly generated trace number.
fn base_response_entry(
    file_header: &FileHeader,
    batch_header: &BatchHeader,
    entry: &EntryDetail,
) -> Result<EntryDetail, AchError> {
    let mut out = EntryDetail::new();
    out.transaction_code = response_transaction_code(entry.transaction_code);

    out.rdfi_identification = routing::aba8(&batch_header.odfi_identification).ok_or_else(|| {
        AchError::InvalidRoutingNumber {
            routing: batch_header.odfi_identification.clone(),
        }
    })?;
    out.check_digit = routing::check_digit(&batch_header.odfi_identification).ok_or_else(|| {
        AchError::InvalidRoutingNumber {
            routing: batch_header.odfi_identification.clone(),
        }
    })?;
    out.dfi_account_number = entry.dfi_account_number.clone();
    out.identification_number = entry.identification_number.clone();
    out.individual_name = entry.individual_name.clone();
    out.discretionary_data = entry.discretionary_data.clone();
    out.addenda_record_indicator = 1;

    // ATX and CTX store the addenda count inside the entry record.
    if codes::sec::carries_addenda_count(&batch_header.standard_entry_class_code) {
        out.set_catx_addenda_records(1);
    }

    out.trace_number = routing::trace_number(&file_header.immediate_destination)?;
    Ok(out)
}

/// Builds notification-of-change responses.
pub struct CorrectionTransformer;

impl EntryTransformer for CorrectionTransformer {
    fn morph_entry(
        &self,
        file_header: &FileHeader,
        batch_header: &BatchHeader,
        entry: &EntryDetail,
        action: &Action,
    ) -> Result<EntryDetail, AchError> {
        let Some(correction) = &action.correction else {
            return Ok(entry.clone());
        };

        let mut out = base_response_entry(file_header, batch_header, entry)?;
        out.amount = 0; // NOCs are always zero-dollar entries
        out.category = Category::Noc;

        let addenda = Addenda98 {
            change_code: correction.code.clone(),
            original_trace: entry.trace_number.clone(),
            original_dfi: entry.rdfi_identification.clone(),
            corrected_data: corrected_data(correction),
            trace_number: out.trace_number.clone(),
        };
        addenda.validate()?;
        out.addenda98 = Some(addenda);

        out.validate()?;
        Ok(out)
    }
}

fn corrected_data(correction: &Correction) -> String {
    if correction.data.is_empty() {
        MISSING_CORRECTED_DATA.to_string()
    } else {
        correction.data.clone()
    }
}

/// Builds return responses.
pub struct ReturnTransformer;

impl EntryTransformer for ReturnTransformer {
    fn morph_entry(
        &self,
        file_header: &FileHeader,
        batch_header: &BatchHeader,
        entry: &EntryDetail,
        action: &Action,
    ) -> Result<EntryDetail, AchError> {
        let Some(ret) = &action.return_ else {
            return Ok(entry.clone());
        };

        let mut out = base_response_entry(file_header, batch_header, entry)?;
        out.amount = entry.amount; // a Return does move money
        out.category = Category::Return;

        let addenda = Addenda99 {
            return_code: ret.code.clone(),
            original_trace: entry.trace_number.clone(),
            date_of_death: String::new(),
            original_dfi: entry.rdfi_identification.clone(),
            addenda_information: String::new(),
            trace_number: out.trace_number.clone(),
        };
        addenda.validate()?;
        out.addenda99 = Some(addenda);

        out.validate()?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::rule::Return;
    use rstest::rstest;

    fn test_file_header() -> FileHeader {
        FileHeader {
            immediate_destination: "121042882".to_string(),
            immediate_origin: "231380104".to_string(),
            file_creation_date: "240115".to_string(),
            file_creation_time: "1304".to_string(),
            file_id_modifier: "A".to_string(),
            ..FileHeader::default()
        }
    }

    fn test_batch_header() -> BatchHeader {
        BatchHeader {
            service_class_code: 200,
            company_name: "Best Co".to_string(),
            company_identification: "231380104".to_string(),
            standard_entry_class_code: "PPD".to_string(),
            company_entry_description: "PAYROLL".to_string(),
            originator_status_code: "1".to_string(),
            odfi_identification: "23138010".to_string(),
            batch_number: 1,
            ..BatchHeader::default()
        }
    }

    fn test_entry(code: u8) -> EntryDetail {
        EntryDetail {
            transaction_code: code,
            rdfi_identification: "08300013".to_string(),
            check_digit: "7".to_string(),
            dfi_account_number: "12345678".to_string(),
            amount: 500_000,
            identification_number: "id-number".to_string(),
            individual_name: "Jane Doe".to_string(),
            trace_number: "083000130000001".to_string(),
            ..EntryDetail::default()
        }
    }

    fn correction_action(code: &str, data: &str) -> Action {
        Action {
            correction: Some(Correction {
                code: code.to_string(),
                data: data.to_string(),
            }),
            ..Default::default()
        }
    }

    fn return_action(code: &str) -> Action {
        Action {
            return_: Some(Return {
                code: code.to_string(),
            }),
            ..Default::default()
        }
    }

    #[rstest]
    #[case::checking_credit(codes::CHECKING_CREDIT, codes::CHECKING_RETURN_NOC_CREDIT)]
    #[case::checking_debit(codes::CHECKING_DEBIT, codes::CHECKING_RETURN_NOC_DEBIT)]
    #[case::savings_credit(codes::SAVINGS_CREDIT, codes::SAVINGS_RETURN_NOC_CREDIT)]
    #[case::savings_debit(codes::SAVINGS_DEBIT, codes::SAVINGS_RETURN_NOC_DEBIT)]
    #[case::gl_credit(codes::GL_CREDIT, codes::GL_RETURN_NOC_CREDIT)]
    #[case::gl_debit(codes::GL_DEBIT, codes::GL_RETURN_NOC_DEBIT)]
    #[case::loan_credit(codes::LOAN_CREDIT, codes::LOAN_RETURN_NOC_CREDIT)]
    #[case::loan_debit_adds_one(codes::LOAN_DEBIT, codes::LOAN_RETURN_NOC_DEBIT)]
    #[case::checking_prenote_credit(codes::CHECKING_PRENOTE_CREDIT, codes::CHECKING_RETURN_NOC_CREDIT)]
    #[case::checking_prenote_debit(codes::CHECKING_PRENOTE_DEBIT, codes::CHECKING_RETURN_NOC_DEBIT)]
    #[case::savings_prenote_credit(codes::SAVINGS_PRENOTE_CREDIT, codes::SAVINGS_RETURN_NOC_CREDIT)]
    #[case::savings_prenote_debit(codes::SAVINGS_PRENOTE_DEBIT, codes::SAVINGS_RETURN_NOC_DEBIT)]
    #[case::gl_prenote_credit(codes::GL_PRENOTE_CREDIT, codes::GL_RETURN_NOC_CREDIT)]
    #[case::gl_prenote_debit(codes::GL_PRENOTE_DEBIT, codes::GL_RETURN_NOC_DEBIT)]
    #[case::loan_prenote_credit(codes::LOAN_PRENOTE_CREDIT, codes::LOAN_RETURN_NOC_CREDIT)]
    #[case::passthrough(codes::CHECKING_RETURN_NOC_DEBIT, codes::CHECKING_RETURN_NOC_DEBIT)]
    fn test_response_transaction_code(#[case] input: u8, #[case] expected: u8) {
        assert_eq!(response_transaction_code(input), expected);
    }

    #[test]
    fn test_correction_builds_noc_entry() {
        let chain = TransformerChain::standard();
        let entry = test_entry(codes::CHECKING_DEBIT);
        let out = chain
            .morph_entry(
                &test_file_header(),
                &test_batch_header(),
                &entry,
                &correction_action("C01", "44-5678-99"),
            )
            .unwrap();

        assert_eq!(out.transaction_code, codes::CHECKING_RETURN_NOC_DEBIT);
        assert_eq!(out.amount, 0, "NOCs carry no money movement");
        assert_eq!(out.category, Category::Noc);
        // RDFI fields come from the batch header's ODFI identification.
        assert_eq!(out.rdfi_identification, "23138010");
        assert_eq!(out.check_digit, "4");
        assert_eq!(out.addenda_record_indicator, 1);
        assert_ne!(out.trace_number, entry.trace_number);
        assert!(out.trace_number.starts_with("12104288"));

        let addenda = out.addenda98.as_ref().unwrap();
        assert_eq!(addenda.change_code, "C01");
        assert_eq!(addenda.original_trace, "083000130000001");
        assert_eq!(addenda.original_dfi, "08300013");
        assert_eq!(addenda.corrected_data, "44-5678-99");
        assert_eq!(addenda.trace_number, out.trace_number);
    }

    #[test]
    fn test_correction_without_data_uses_placeholder() {
        let chain = TransformerChain::standard();
        let out = chain
            .morph_entry(
                &test_file_header(),
                &test_batch_header(),
                &test_entry(codes::CHECKING_DEBIT),
                &correction_action("C01", ""),
            )
            .unwrap();
        assert_eq!(
            out.addenda98.unwrap().corrected_data,
            MISSING_CORRECTED_DATA
        );
    }

    #[test]
    fn test_return_preserves_amount() {
        let chain = TransformerChain::standard();
        let entry = test_entry(codes::CHECKING_DEBIT);
        let out = chain
            .morph_entry(
                &test_file_header(),
                &test_batch_header(),
                &entry,
                &return_action("R03"),
            )
            .unwrap();

        assert_eq!(out.transaction_code, codes::CHECKING_RETURN_NOC_DEBIT);
        assert_eq!(out.amount, entry.amount, "a Return does move money");
        assert_eq!(out.category, Category::Return);
        assert_ne!(out.trace_number, entry.trace_number);

        let addenda = out.addenda99.as_ref().unwrap();
        assert_eq!(addenda.return_code, "R03");
        assert_eq!(addenda.original_trace, entry.trace_number);
        assert_eq!(addenda.original_dfi, "08300013");
        assert_eq!(addenda.trace_number, out.trace_number);
    }

    #[test]
    fn test_ctx_entries_carry_addenda_count() {
        let mut header = test_batch_header();
        header.standard_entry_class_code = codes::sec::CTX.to_string();
        let chain = TransformerChain::standard();
        let out = chain
            .morph_entry(
                &test_file_header(),
                &header,
                &test_entry(codes::CHECKING_DEBIT),
                &return_action("R03"),
            )
            .unwrap();
        assert_eq!(out.catx_addenda_records, Some(1));
    }

    #[test]
    fn test_no_process_action_is_identity() {
        let chain = TransformerChain::standard();
        let entry = test_entry(codes::CHECKING_DEBIT);
        let out = chain
            .morph_entry(
                &test_file_header(),
                &test_batch_header(),
                &entry,
                &Action::default(),
            )
            .unwrap();
        assert_eq!(out, entry);
    }

    #[test]
    fn test_unknown_return_code_fails_validation() {
        let chain = TransformerChain::standard();
        let err = chain
            .morph_entry(
                &test_file_header(),
                &test_batch_header(),
                &test_entry(codes::CHECKING_DEBIT),
                &return_action("R99"),
            )
            .unwrap_err();
        assert!(matches!(err, AchError::Validation { .. }));
    }

    #[test]
    fn test_fresh_trace_per_morph() {
        let chain = TransformerChain::standard();
        let entry = test_entry(codes::CHECKING_DEBIT);
        let a = chain
            .morph_entry(
                &test_file_header(),
                &test_batch_header(),
                &entry,
                &return_action("R03"),
            )
            .unwrap();
        let b = chain
            .morph_entry(
                &test_file_header(),
                &test_batch_header(),
                &entry,
                &return_action("R03"),
            )
            .unwrap();
        assert_ne!(a.trace_number, b.trace_number);
    }
}
