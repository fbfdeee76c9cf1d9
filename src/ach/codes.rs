//! Transaction codes, Standard Entry Class codes, and the NACHA reason-code
//! tables (return R-codes, change C-codes).
//!
//! The transaction-code constants follow the NACHA numbering: each account
//! category (checking, savings, general ledger, loan) owns a decade, and the
//! last digit selects credit/debit/prenote/return-or-NOC variants.

/// Checking account credit
pub const CHECKING_CREDIT: u8 = 22;
/// Checking account debit
pub const CHECKING_DEBIT: u8 = 27;
/// Checking prenotification credit (zero dollar)
pub const CHECKING_PRENOTE_CREDIT: u8 = 23;
/// Checking prenotification debit (zero dollar)
pub const CHECKING_PRENOTE_DEBIT: u8 = 28;
/// Checking return or NOC credit
pub const CHECKING_RETURN_NOC_CREDIT: u8 = 21;
/// Checking return or NOC debit
pub const CHECKING_RETURN_NOC_DEBIT: u8 = 26;

/// Savings account credit
pub const SAVINGS_CREDIT: u8 = 32;
/// Savings account debit
pub const SAVINGS_DEBIT: u8 = 37;
/// Savings prenotification credit (zero dollar)
pub const SAVINGS_PRENOTE_CREDIT: u8 = 33;
/// Savings prenotification debit (zero dollar)
pub const SAVINGS_PRENOTE_DEBIT: u8 = 38;
/// Savings return or NOC credit
pub const SAVINGS_RETURN_NOC_CREDIT: u8 = 31;
/// Savings return or NOC debit
pub const SAVINGS_RETURN_NOC_DEBIT: u8 = 36;

/// General ledger credit
pub const GL_CREDIT: u8 = 42;
/// General ledger debit
pub const GL_DEBIT: u8 = 47;
/// General ledger prenotification credit (zero dollar)
pub const GL_PRENOTE_CREDIT: u8 = 43;
/// General ledger prenotification debit (zero dollar)
pub const GL_PRENOTE_DEBIT: u8 = 48;
/// General ledger return or NOC credit
pub const GL_RETURN_NOC_CREDIT: u8 = 41;
/// General ledger return or NOC debit
pub const GL_RETURN_NOC_DEBIT: u8 = 46;

/// Loan account credit
pub const LOAN_CREDIT: u8 = 52;
/// Loan account debit
pub const LOAN_DEBIT: u8 = 55;
/// Loan prenotification credit (zero dollar)
pub const LOAN_PRENOTE_CREDIT: u8 = 53;
/// Loan return or NOC credit
pub const LOAN_RETURN_NOC_CREDIT: u8 = 51;
/// Loan return or NOC debit
pub const LOAN_RETURN_NOC_DEBIT: u8 = 56;

/// Standard Entry Class codes recognized by the codec.
pub mod sec {
    pub const PPD: &str = "PPD";
    pub const CCD: &str = "CCD";
    pub const CTX: &str = "CTX";
    pub const ATX: &str = "ATX";
    pub const COR: &str = "COR";
    pub const WEB: &str = "WEB";
    pub const TEL: &str = "TEL";
    pub const ARC: &str = "ARC";
    pub const BOC: &str = "BOC";
    pub const POP: &str = "POP";
    pub const RCK: &str = "RCK";

    pub const ALL: &[&str] = &[PPD, CCD, CTX, ATX, COR, WEB, TEL, ARC, BOC, POP, RCK];

    /// CTX and ATX entries carry their addenda count inside the entry record
    /// instead of relying solely on the addenda record indicator.
    pub fn carries_addenda_count(code: &str) -> bool {
        code == CTX || code == ATX
    }
}

/// Whether `code` moves money out of the receiver's account.
pub fn is_debit(code: u8) -> bool {
    matches!(
        code,
        CHECKING_DEBIT
            | SAVINGS_DEBIT
            | GL_DEBIT
            | LOAN_DEBIT
            | CHECKING_PRENOTE_DEBIT
            | SAVINGS_PRENOTE_DEBIT
            | GL_PRENOTE_DEBIT
            | CHECKING_RETURN_NOC_DEBIT
            | SAVINGS_RETURN_NOC_DEBIT
            | GL_RETURN_NOC_DEBIT
            | LOAN_RETURN_NOC_DEBIT
    )
}

/// Whether `code` moves money into the receiver's account.
pub fn is_credit(code: u8) -> bool {
    matches!(
        code,
        CHECKING_CREDIT
            | SAVINGS_CREDIT
            | GL_CREDIT
            | LOAN_CREDIT
            | CHECKING_PRENOTE_CREDIT
            | SAVINGS_PRENOTE_CREDIT
            | GL_PRENOTE_CREDIT
            | LOAN_PRENOTE_CREDIT
            | CHECKING_RETURN_NOC_CREDIT
            | SAVINGS_RETURN_NOC_CREDIT
            | GL_RETURN_NOC_CREDIT
            | LOAN_RETURN_NOC_CREDIT
    )
}

/// Whether `code` is a zero-dollar prenotification.
pub fn is_prenote(code: u8) -> bool {
    matches!(
        code,
        CHECKING_PRENOTE_CREDIT
            | SAVINGS_PRENOTE_CREDIT
            | GL_PRENOTE_CREDIT
            | LOAN_PRENOTE_CREDIT
            | CHECKING_PRENOTE_DEBIT
            | SAVINGS_PRENOTE_DEBIT
            | GL_PRENOTE_DEBIT
    )
}

/// Whether `code` is a transaction code this codec knows how to handle.
pub fn is_known_transaction_code(code: u8) -> bool {
    is_debit(code) || is_credit(code)
}

/// NACHA return reason codes and their descriptions.
const RETURN_CODES: &[(&str, &str)] = &[
    ("R01", "Insufficient Funds"),
    ("R02", "Account Closed"),
    ("R03", "No Account/Unable to Locate Account"),
    ("R04", "Invalid Account Number"),
    ("R05", "Improper Debit to Consumer Account"),
    ("R06", "Returned per ODFI's Request"),
    ("R07", "Authorization Revoked by Customer"),
    ("R08", "Payment Stopped"),
    ("R09", "Uncollected Funds"),
    ("R10", "Customer Advises Not Authorized"),
    ("R11", "Customer Advises Entry Not in Accordance with Terms"),
    ("R12", "Branch Sold to Another DFI"),
    ("R13", "RDFI Not Qualified to Participate"),
    ("R14", "Representative Payee Deceased"),
    ("R15", "Beneficiary or Account Holder Deceased"),
    ("R16", "Account Frozen"),
    ("R17", "File Record Edit Criteria"),
    ("R18", "Improper Effective Entry Date"),
    ("R19", "Amount Field Error"),
    ("R20", "Non-Transaction Account"),
    ("R21", "Invalid Company Identification"),
    ("R22", "Invalid Individual ID Number"),
    ("R23", "Credit Entry Refused by Receiver"),
    ("R24", "Duplicate Entry"),
    ("R25", "Addenda Error"),
    ("R26", "Mandatory Field Error"),
    ("R27", "Trace Number Error"),
    ("R28", "Routing Number Check Digit Error"),
    ("R29", "Corporate Customer Advises Not Authorized"),
    ("R30", "RDFI Not Participant in Check Truncation Program"),
    ("R31", "Permissible Return Entry"),
    ("R32", "RDFI Non-Settlement"),
    ("R33", "Return of XCK Entry"),
    ("R34", "Limited Participation DFI"),
    ("R35", "Return of Improper Debit Entry"),
    ("R36", "Return of Improper Credit Entry"),
    ("R37", "Source Document Presented for Payment"),
    ("R38", "Stop Payment on Source Document"),
    ("R39", "Improper Source Document"),
    ("R61", "Misrouted Return"),
    ("R62", "Return of Erroneous or Reversing Debit"),
    ("R67", "Duplicate Return"),
    ("R68", "Untimely Return"),
    ("R69", "Field Error"),
    ("R70", "Permissible Return Entry Not Accepted"),
    ("R71", "Misrouted Dishonored Return"),
    ("R72", "Untimely Dishonored Return"),
    ("R73", "Timely Original Return"),
    ("R74", "Corrected Return"),
    ("R75", "Return Not a Duplicate"),
    ("R76", "No Errors Found"),
    ("R77", "Non-Acceptance of R62 Dishonored Return"),
    ("R80", "IAT Entry Coding Error"),
    ("R81", "Non-Participant in IAT Program"),
    ("R82", "Invalid Foreign RDFI Identification"),
    ("R83", "Foreign RDFI Unable to Settle"),
    ("R84", "Entry Not Processed by Gateway"),
    ("R85", "Incorrectly Coded Outbound International Payment"),
];

/// NACHA notification-of-change codes and their descriptions.
const CHANGE_CODES: &[(&str, &str)] = &[
    ("C01", "Incorrect DFI Account Number"),
    ("C02", "Incorrect Routing Number"),
    ("C03", "Incorrect Routing Number and Incorrect DFI Account Number"),
    ("C04", "Incorrect Individual Name / Receiving Company Name"),
    ("C05", "Incorrect Transaction Code"),
    ("C06", "Incorrect DFI Account Number and Incorrect Transaction Code"),
    ("C07", "Incorrect Routing Number, DFI Account Number, and Transaction Code"),
    ("C08", "Incorrect Receiving DFI Identification (IAT only)"),
    ("C09", "Incorrect Individual Identification Number"),
    ("C13", "Addenda Format Error"),
    ("C14", "Incorrect SEC Code for Outbound International Payment"),
];

/// Look up the description for a return reason code.
pub fn lookup_return_code(code: &str) -> Option<&'static str> {
    RETURN_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, description)| *description)
}

/// Look up the description for a notification-of-change code.
pub fn lookup_change_code(code: &str) -> Option<&'static str> {
    CHANGE_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, description)| *description)
}
