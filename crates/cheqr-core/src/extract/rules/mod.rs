//! Ordered pattern rules for locating cheque fields in raw OCR text.
//!
//! Each field owns an ordered table of pure `text -> Option<value>` rules.
//! Rules are tried in table order and the first match wins - ties are broken
//! by position in the table, never by scoring.

pub mod patterns;

mod account;
mod amount;
mod bank;
mod date;
mod ifsc;
mod micr;
mod payer;

use crate::models::{ChequeField, config::ExtractionConfig};

/// One candidate pattern for a field.
pub struct Rule {
    /// Short identifier for logging and tests.
    pub name: &'static str,
    /// Pure extraction function over the page's raw text.
    pub apply: fn(&str, &ExtractionConfig) -> Option<String>,
}

/// The ordered rule table for a field.
///
/// Transaction metadata has no pattern rules: those fields only ever come
/// from a backend.
pub fn rules_for(field: ChequeField) -> &'static [Rule] {
    match field {
        ChequeField::BankName => bank::RULES,
        ChequeField::Date => date::RULES,
        ChequeField::IfscCode => ifsc::RULES,
        ChequeField::AmountInWords => amount::WORDS_RULES,
        ChequeField::AmountInDigits => amount::DIGITS_RULES,
        ChequeField::Payer => payer::RULES,
        ChequeField::AccountNumber => account::RULES,
        ChequeField::ChequeNumber => micr::RULES,
        ChequeField::TransactionId | ChequeField::TransactionMessage => &[],
    }
}

/// Apply a field's rules in priority order; first match wins.
pub fn first_match(field: ChequeField, text: &str, config: &ExtractionConfig) -> Option<String> {
    rules_for(field)
        .iter()
        .find_map(|rule| (rule.apply)(text, config))
}
