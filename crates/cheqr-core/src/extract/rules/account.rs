//! Account number rule.

use super::Rule;
use super::patterns::ACCOUNT_RUN;
use crate::models::config::ExtractionConfig;

pub(super) static RULES: &[Rule] = &[Rule {
    name: "longest-digit-run",
    apply: longest_digit_run,
}];

/// Longest digit run of at least `min_account_digits` digits anywhere in
/// the text. Longer runs are more likely to be full account numbers than
/// partial matches; ties go to the earliest run.
fn longest_digit_run(text: &str, config: &ExtractionConfig) -> Option<String> {
    let mut best: Option<&str> = None;
    for m in ACCOUNT_RUN.find_iter(text) {
        let run = m.as_str();
        if run.len() < config.min_account_digits {
            continue;
        }
        if best.is_none_or(|b| run.len() > b.len()) {
            best = Some(run);
        }
    }
    best.map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    #[test]
    fn test_longest_run_wins() {
        let text = "123456789 and 123456789012 and 987654321";
        assert_eq!(
            longest_digit_run(text, &config()),
            Some("123456789012".to_string())
        );
    }

    #[test]
    fn test_tie_goes_to_earliest() {
        let text = "111111111 222222222";
        assert_eq!(
            longest_digit_run(text, &config()),
            Some("111111111".to_string())
        );
    }

    #[test]
    fn test_minimum_length_is_configurable() {
        let mut strict = config();
        strict.min_account_digits = 12;

        let text = "short 123456789 only";
        assert_eq!(
            longest_digit_run(text, &config()),
            Some("123456789".to_string())
        );
        assert_eq!(longest_digit_run(text, &strict), None);
    }
}
