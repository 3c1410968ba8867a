//! Amount rules, in words and in digits.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::Rule;
use super::patterns::{AMOUNT_DIGITS, AMOUNT_WORDS};
use crate::models::config::ExtractionConfig;

pub(super) static WORDS_RULES: &[Rule] = &[Rule {
    name: "rupees-to-only",
    apply: words,
}];

pub(super) static DIGITS_RULES: &[Rule] = &[Rule {
    name: "digit-run",
    apply: digits,
}];

/// Text between a currency marker ("Rupees"/"Rs.") and "only", trimmed.
fn words(text: &str, _config: &ExtractionConfig) -> Option<String> {
    AMOUNT_WORDS
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

/// First standalone digit run (optionally comma-grouped, optionally with a
/// 2-digit decimal part); commas stripped before storage.
fn digits(text: &str, _config: &ExtractionConfig) -> Option<String> {
    for caps in AMOUNT_DIGITS.captures_iter(text) {
        let cleaned = caps[1].replace(',', "");
        if Decimal::from_str(&cleaned).is_ok() {
            return Some(cleaned);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    #[test]
    fn test_words_between_marker_and_only() {
        assert_eq!(
            words("Rupees Five Thousand only", &config()),
            Some("Five Thousand".to_string())
        );
        assert_eq!(
            words("RS. twenty one and fifty paise ONLY", &config()),
            Some("twenty one and fifty paise".to_string())
        );
        assert_eq!(words("Five Thousand", &config()), None);
    }

    #[test]
    fn test_digits_strip_commas() {
        assert_eq!(
            digits("₹ 1,25,000.00 payable", &config()),
            Some("125000.00".to_string())
        );
        assert_eq!(digits("Rs 5000", &config()), Some("5000".to_string()));
    }

    #[test]
    fn test_digits_first_run_wins() {
        assert_eq!(
            digits("amount 500 then 9000", &config()),
            Some("500".to_string())
        );
    }
}
