//! Payer name rule.

use super::Rule;
use super::patterns::PAYER_BEARER;
use crate::models::config::ExtractionConfig;

pub(super) static RULES: &[Rule] = &[Rule {
    name: "pay-or-bearer",
    apply: pay_or_bearer,
}];

/// Text between "Pay" and "or bearer".
fn pay_or_bearer(text: &str, _config: &ExtractionConfig) -> Option<String> {
    PAYER_BEARER
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    #[test]
    fn test_extracts_name_between_markers() {
        assert_eq!(
            pay_or_bearer("Pay RAMESH KUMAR or bearer", &config()),
            Some("RAMESH KUMAR".to_string())
        );
    }

    #[test]
    fn test_case_insensitive_markers() {
        assert_eq!(
            pay_or_bearer("PAY Sunita Devi OR BEARER", &config()),
            Some("Sunita Devi".to_string())
        );
        assert_eq!(pay_or_bearer("Pay to the order of X", &config()), None);
    }
}
