//! Bank name rules.

use super::Rule;
use crate::models::config::ExtractionConfig;

pub(super) static RULES: &[Rule] = &[
    Rule {
        name: "bank-token-line",
        apply: bank_token_line,
    },
    Rule {
        name: "first-line",
        apply: first_line,
    },
];

/// First line containing the token "BANK" (case-insensitive).
fn bank_token_line(text: &str, _config: &ExtractionConfig) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| {
            line.split(|c: char| !c.is_ascii_alphanumeric())
                .any(|token| token.eq_ignore_ascii_case("bank"))
        })
        .map(str::to_string)
}

/// First non-empty line of the document.
fn first_line(text: &str, _config: &ExtractionConfig) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    #[test]
    fn test_bank_line_wins_over_first_line() {
        let text = "Cheque leaf\nSTATE BANK OF INDIA\nPay someone";
        assert_eq!(
            bank_token_line(text, &config()),
            Some("STATE BANK OF INDIA".to_string())
        );
    }

    #[test]
    fn test_bank_token_is_word_bounded() {
        // "BANKRUPT" must not count as the BANK token.
        let text = "BANKRUPT ESTATE\nHDFC Bank Ltd.";
        assert_eq!(
            bank_token_line(text, &config()),
            Some("HDFC Bank Ltd.".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_first_nonempty_line() {
        let text = "\n\n  Canara Trust Services  \nother text";
        assert_eq!(bank_token_line(text, &config()), None);
        assert_eq!(
            first_line(text, &config()),
            Some("Canara Trust Services".to_string())
        );
    }
}
