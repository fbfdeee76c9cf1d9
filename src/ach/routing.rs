//! ABA routing-number helpers and trace-number generation.

use rand::Rng;

use crate::ach::error::AchError;

/// Returns the first 8 digits of an ABA routing number.
///
/// Accepts 8, 9, or 10 character inputs; a 10-character input is assumed to
/// carry a leading filler character (ACH servers prefix with a space, 0, or 1).
/// Returns `None` for anything else.
pub fn aba8(rtn: &str) -> Option<String> {
    if !rtn.is_ascii() {
        return None;
    }
    match rtn.len() {
        10 => Some(rtn[1..9].to_string()),
        8 | 9 => Some(rtn[..8].to_string()),
        _ => None,
    }
}

/// Returns the check digit (last digit) of an ABA routing number.
///
/// For an 8-digit input the check digit is computed with the NACHA 3-7-1
/// weighting; for 9 and 10 character inputs it is taken from the final
/// position. Returns `None` for anything else.
pub fn check_digit(rtn: &str) -> Option<String> {
    if !rtn.is_ascii() {
        return None;
    }
    match rtn.len() {
        10 => Some(rtn[9..].to_string()),
        9 => Some(rtn[8..9].to_string()),
        8 => calculate_check_digit(rtn).map(|d| d.to_string()),
        _ => None,
    }
}

/// Computes the NACHA check digit for an 8-digit ABA prefix.
///
/// Digits are weighted 3, 7, 1 (repeating); the check digit is the amount
/// needed to round the weighted sum up to the next multiple of ten.
pub fn calculate_check_digit(aba8: &str) -> Option<u32> {
    if aba8.len() != 8 {
        return None;
    }
    const WEIGHTS: [u32; 8] = [3, 7, 1, 3, 7, 1, 3, 7];
    let mut sum = 0;
    for (ch, weight) in aba8.chars().zip(WEIGHTS) {
        sum += ch.to_digit(10)? * weight;
    }
    Some((10 - (sum % 10)) % 10)
}

/// Generates a trace number for the given routing number.
///
/// The trace is the routing number's 8-digit ABA prefix followed by a random
/// numeral sequence, truncated so the whole trace never exceeds 15 characters.
/// A fresh random value is drawn per call; a shared counter would produce
/// visibly-sequential traces across unrelated transforms.
pub fn trace_number(routing_number: &str) -> Result<String, AchError> {
    let prefix = aba8(routing_number).ok_or_else(|| AchError::InvalidRoutingNumber {
        routing: routing_number.to_string(),
    })?;
    let n: u64 = rand::thread_rng().gen_range(0..1_000_000_000_000_000);
    let trace = format!("{prefix}{n}");
    if trace.len() > 15 {
        Ok(trace[..15].to_string())
    } else {
        Ok(trace)
    }
}
