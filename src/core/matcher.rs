//! Rule matcher: decides which configured action applies to an entry.
//!
//! Rules are evaluated in configuration order. Predicates inside one rule are
//! AND-ed: every configured predicate contributes a positive or negative vote
//! and a single negative anywhere rejects the rule. The votes are counted
//! rather than short-circuited so debug logging can report exactly which
//! predicates held and which failed.

use std::sync::Arc;

use tracing::debug;

use crate::ach::records::{BatchHeader, EntryDetail};
use crate::ach::{codes, routing};
use crate::types::rule::{Action, EntryType, Match, Response};

/// Evaluates the configured response rules against entries.
///
/// The rule list is immutable after construction and shared between
/// concurrent transforms.
#[derive(Debug, Clone)]
pub struct Matcher {
    debug: bool,
    responses: Arc<[Response]>,
}

/// Vote accumulator for one rule attempt.
///
/// Predicate names are collected alongside the counts so rule authors can see
/// which checks decided the outcome.
#[derive(Debug, Default)]
struct Tally {
    positive: u32,
    negative: u32,
    positive_matchers: Vec<&'static str>,
    negative_matchers: Vec<&'static str>,
}

impl Tally {
    fn record(&mut self, name: &'static str, holds: bool) {
        if holds {
            self.positive += 1;
            self.positive_matchers.push(name);
        } else {
            self.negative += 1;
            self.negative_matchers.push(name);
        }
    }

    fn accepted(&self) -> bool {
        self.negative == 0 && self.positive > 0
    }
}

impl Matcher {
    pub fn new(debug: bool, responses: Arc<[Response]>) -> Self {
        if debug {
            debug!("matcher: debug logging enabled");
        }
        Matcher { debug, responses }
    }

    /// Find the actions applying to one entry.
    ///
    /// Returns at most one copy action and at most one process (Return or
    /// Correction) action. The first matching copy rule wins. An undelayed
    /// process action takes precedence over everything else and terminates
    /// evaluation immediately; a delayed process action keeps evaluating so a
    /// later copy rule can still be captured.
    pub fn find_action<'a>(
        &'a self,
        header: &BatchHeader,
        entry: &EntryDetail,
    ) -> (Option<&'a Action>, Option<&'a Action>) {
        let mut copy_action: Option<&Action> = None;
        let mut process_action: Option<&Action> = None;

        for (idx, response) in self.responses.iter().enumerate() {
            let action = &response.action;

            // At most one action of each kind survives per entry.
            if copy_action.is_some() && action.copy.is_some() {
                continue;
            }
            if process_action.is_some() && action.is_process() {
                continue;
            }

            if self.debug {
                debug!(
                    response_idx = idx,
                    entry_trace_number = %entry.trace_number,
                    entry_account_number = %entry.dfi_account_number,
                    entry_routing_number = %format!("{}{}", entry.rdfi_identification, entry.check_digit),
                    entry_transaction_code = entry.transaction_code,
                    entry_amount = entry.amount,
                    entry_individual_name = %entry.individual_name,
                    company_identification = %header.company_identification,
                    company_entry_description = %header.company_entry_description,
                    "starting EntryDetail matching"
                );
            }

            let mut tally = Tally::default();
            score(&response.matcher, header, entry, false, &mut tally);
            score(&response.not, header, entry, true, &mut tally);

            if self.debug {
                debug!(
                    response_idx = idx,
                    entry_trace_number = %entry.trace_number,
                    negative = tally.negative,
                    negative_matchers = ?tally.negative_matchers,
                    positive = tally.positive,
                    positive_matchers = ?tally.positive_matchers,
                    "FINAL matching score"
                );
            }

            if tally.accepted() {
                if action.copy.is_some() {
                    copy_action = Some(action);
                } else {
                    process_action = Some(action);
                    // An undelayed process action supersedes everything else.
                    if action.delay.is_none() {
                        return (None, process_action);
                    }
                }
            }
        }

        (copy_action, process_action)
    }
}

/// Run every configured predicate of `matcher`, recording votes into `tally`.
///
/// With `inverted` set (the `Not` clause) the sense of each individual check
/// is flipped: a predicate that holds votes negative and one that fails votes
/// positive.
fn score(matcher: &Match, header: &BatchHeader, entry: &EntryDetail, inverted: bool, tally: &mut Tally) {
    if !matcher.trace_number.is_empty() {
        tally.record("TraceNumber", matches_trace_number(matcher, entry) ^ inverted);
    }
    if !matcher.account_number.is_empty() {
        tally.record(
            "DFIAccountNumber",
            matches_account_number(matcher, entry) ^ inverted,
        );
    }
    if !matcher.routing_number.is_empty() {
        tally.record(
            "RDFIIdentification",
            matches_routing_number(matcher, entry) ^ inverted,
        );
    }
    if matcher.amount.is_some() {
        tally.record("Amount", matches_amount(matcher, entry) ^ inverted);
    }
    if !matcher.entry_type.is_empty() {
        tally.record("TransactionCode", matches_entry_type(matcher, entry) ^ inverted);
    }
    if !matcher.individual_name.is_empty() {
        tally.record(
            "IndividualName",
            matches_individual_name(matcher, entry) ^ inverted,
        );
    }
    if !matcher.company_identification.is_empty() {
        tally.record(
            "CompanyIdentification",
            matches_company_identification(matcher, header) ^ inverted,
        );
    }
    if !matcher.company_entry_description.is_empty() {
        tally.record(
            "CompanyEntryDescription",
            matches_company_entry_description(matcher, header) ^ inverted,
        );
    }
}

fn matches_trace_number(m: &Match, entry: &EntryDetail) -> bool {
    entry.trace_number == m.trace_number
}

fn matches_account_number(m: &Match, entry: &EntryDetail) -> bool {
    entry.dfi_account_number.trim() == m.account_number
}

fn matches_routing_number(m: &Match, entry: &EntryDetail) -> bool {
    let aba8 = routing::aba8(&m.routing_number).as_deref() == Some(entry.rdfi_identification.as_str());
    let check = routing::check_digit(&m.routing_number).as_deref() == Some(entry.check_digit.as_str());
    aba8 && check
}

fn matches_amount(m: &Match, entry: &EntryDetail) -> bool {
    m.amount.as_ref().is_some_and(|a| a.matches(entry.amount))
}

fn matches_entry_type(m: &Match, entry: &EntryDetail) -> bool {
    match &m.entry_type {
        EntryType::Debit => is_forward_debit(entry),
        EntryType::Credit => is_forward_credit(entry),
        EntryType::Prenote => codes::is_prenote(entry.transaction_code),
        EntryType::Code(code) => *code == entry.transaction_code.to_string(),
        EntryType::Empty => false,
    }
}

// The symbolic debit/credit classes cover forward entries only; prenote and
// return/NOC siblings are matched by their own class or numeric code.
fn is_forward_debit(entry: &EntryDetail) -> bool {
    matches!(
        entry.transaction_code,
        codes::CHECKING_DEBIT | codes::SAVINGS_DEBIT | codes::GL_DEBIT | codes::LOAN_DEBIT
    )
}

fn is_forward_credit(entry: &EntryDetail) -> bool {
    matches!(
        entry.transaction_code,
        codes::CHECKING_CREDIT | codes::SAVINGS_CREDIT | codes::GL_CREDIT | codes::LOAN_CREDIT
    )
}

fn matches_individual_name(m: &Match, entry: &EntryDetail) -> bool {
    entry.individual_name.trim() == m.individual_name
}

fn matches_company_identification(m: &Match, header: &BatchHeader) -> bool {
    header
        .company_identification
        .trim()
        .eq_ignore_ascii_case(m.company_identification.trim())
}

fn matches_company_entry_description(m: &Match, header: &BatchHeader) -> bool {
    header
        .company_entry_description
        .trim()
        .eq_ignore_ascii_case(m.company_entry_description.trim())
}
