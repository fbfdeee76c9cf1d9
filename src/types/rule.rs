//! Response rule configuration: match predicates and actions.
//!
//! Rules are loaded once at startup and are immutable for the process
//! lifetime. Evaluation order is significant, so the configuration is an
//! ordered list of [`Response`] values. Load-time validation rejects invalid
//! action combinations and unknown NACHA codes before any file is processed.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

use crate::ach::codes;
use crate::types::error::ResponderError;

/// One configured rule: a predicate set, an optional inverted predicate set,
/// and the action to take when the rule matches.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Response {
    /// Predicates that must all hold.
    #[serde(rename = "match", default)]
    pub matcher: Match,
    /// Predicates evaluated with every check inverted.
    #[serde(default)]
    pub not: Match,
    pub action: Action,
}

impl Response {
    /// Load-time validation; failures are fatal to startup.
    pub fn validate(&self) -> Result<(), ResponderError> {
        if self.matcher.is_empty() && self.not.is_empty() {
            return Err(ResponderError::invalid_action(
                "no Match or Not predicates configured",
            ));
        }
        self.action.validate()
    }
}

/// A conjunction of optional field predicates.
///
/// A predicate only participates when its field is configured; absent fields
/// contribute nothing to the match score.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Match {
    /// Trimmed equality against the entry's DFI account number.
    pub account_number: String,
    pub amount: Option<Amount>,
    pub entry_type: EntryType,
    /// Case-sensitive trimmed equality against the entry's individual name.
    pub individual_name: String,
    /// Full 9-digit ABA number; matched as ABA8 prefix plus check digit.
    pub routing_number: String,
    pub trace_number: String,
    /// Case-insensitive trimmed equality against the batch header.
    pub company_identification: String,
    /// Case-insensitive trimmed equality against the batch header.
    pub company_entry_description: String,
}

impl Match {
    /// Whether no predicate is configured.
    pub fn is_empty(&self) -> bool {
        self.account_number.is_empty()
            && self.amount.as_ref().map_or(true, Amount::is_empty)
            && self.entry_type == EntryType::Empty
            && self.individual_name.is_empty()
            && self.routing_number.is_empty()
            && self.trace_number.is_empty()
            && self.company_identification.is_empty()
            && self.company_entry_description.is_empty()
    }
}

/// Amount predicate: exact value, or an inclusive range.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Amount {
    /// Exact amount in cents.
    pub value: Option<u64>,
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl Amount {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.min.is_none() && self.max.is_none()
    }

    /// Exact-value match if `value` is set, else an inclusive range match if
    /// both bounds are set; an Amount with neither never matches.
    pub fn matches(&self, amount: u64) -> bool {
        if let Some(value) = self.value {
            return amount == value;
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            return min <= amount && amount <= max;
        }
        false
    }
}

/// Entry classification predicate.
///
/// The three symbolic values classify by transaction-code table; anything
/// else is compared against the numeric transaction code verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EntryType {
    #[default]
    Empty,
    Debit,
    Credit,
    Prenote,
    /// Exact numeric-string comparison against the transaction code.
    Code(String),
}

impl EntryType {
    pub fn is_empty(&self) -> bool {
        *self == EntryType::Empty
    }
}

impl<'de> Deserialize<'de> for EntryType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(match value.as_str() {
            "" => EntryType::Empty,
            "debit" => EntryType::Debit,
            "credit" => EntryType::Credit,
            "prenote" => EntryType::Prenote,
            _ => EntryType::Code(value),
        })
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryType::Empty => Ok(()),
            EntryType::Debit => write!(f, "debit"),
            EntryType::Credit => write!(f, "credit"),
            EntryType::Prenote => write!(f, "prenote"),
            EntryType::Code(code) => write!(f, "{code}"),
        }
    }
}

/// What to do with a matched entry.
///
/// At most one of `copy`, `correction`, `return` may be set; `delay` requires
/// a correction or return and excludes `copy`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Action {
    /// Defer the response file's visibility by this long.
    pub delay: Option<Delay>,
    /// Mirror the original entry for reconciliation.
    pub copy: Option<Copy>,
    /// Respond with a notification of change.
    pub correction: Option<Correction>,
    /// Respond with a return.
    #[serde(rename = "return")]
    pub return_: Option<Return>,
}

impl Action {
    /// Whether this is a "process" action (produces a Return or Correction),
    /// as opposed to a copy action.
    pub fn is_process(&self) -> bool {
        self.correction.is_some() || self.return_.is_some()
    }

    /// Enforce the mutual-exclusion invariants.
    pub fn validate(&self) -> Result<(), ResponderError> {
        if self.delay.is_some() && self.copy.is_some() {
            return Err(ResponderError::invalid_action(
                "Delay and Copy are not valid together in an Action",
            ));
        }
        let count = [
            self.copy.is_some(),
            self.correction.is_some(),
            self.return_.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count();
        if count > 1 {
            return Err(ResponderError::invalid_action(
                "only 1 of Copy, Return, Correction can be configured in an Action",
            ));
        }
        if self.delay.is_some() && count == 0 {
            return Err(ResponderError::invalid_action(
                "either Return or Correction is required if Delay is set",
            ));
        }
        if let Some(ret) = &self.return_ {
            if codes::lookup_return_code(&ret.code).is_none() {
                return Err(ResponderError::UnknownReturnCode {
                    code: ret.code.clone(),
                });
            }
        }
        if let Some(correction) = &self.correction {
            if codes::lookup_change_code(&correction.code).is_none() {
                return Err(ResponderError::UnknownChangeCode {
                    code: correction.code.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Copy the original entry into a reconciliation file under `path`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Copy {
    pub path: PathBuf,
}

/// Respond with a notification of change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Correction {
    /// NACHA change code, e.g. "C01".
    pub code: String,
    /// Corrected data carried in the Addenda98.
    #[serde(default)]
    pub data: String,
}

/// Respond with a return.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Return {
    /// NACHA return reason code, e.g. "R03".
    pub code: String,
}

/// A settlement delay, compared and keyed by value.
///
/// Deserialized from compact duration strings ("10s", "5m", "12h", "1h30m",
/// "250ms"). Ordering and hashing follow the underlying duration, so two
/// logically-equal delays always land in the same output bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Delay(Duration);

impl Delay {
    pub fn from_duration(duration: Duration) -> Self {
        Delay(duration)
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl FromStr for Delay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty duration".to_string());
        }
        let bytes = s.as_bytes();
        let mut total = Duration::ZERO;
        let mut i = 0;
        while i < s.len() {
            let digits_start = i;
            while i < s.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if digits_start == i {
                return Err(format!("invalid duration '{s}'"));
            }
            let value: u64 = s[digits_start..i]
                .parse()
                .map_err(|_| format!("invalid duration '{s}'"))?;
            let unit_start = i;
            while i < s.len() && !bytes[i].is_ascii_digit() {
                i += 1;
            }
            total += match &s[unit_start..i] {
                "ms" => Duration::from_millis(value),
                "s" => Duration::from_secs(value),
                "m" => Duration::from_secs(value * 60),
                "h" => Duration::from_secs(value * 3600),
                unit => return Err(format!("invalid duration unit '{unit}' in '{s}'")),
            };
        }
        Ok(Delay(total))
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut millis = self.0.as_millis();
        if millis == 0 {
            return write!(f, "0s");
        }
        for (per, unit) in [(3_600_000, "h"), (60_000, "m"), (1_000, "s"), (1, "ms")] {
            if millis >= per {
                write!(f, "{}{unit}", millis / per)?;
                millis %= per;
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for Delay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}
