//! Cheque date rule.

use chrono::NaiveDate;

use super::Rule;
use super::patterns::DATE_DMY;
use crate::models::config::ExtractionConfig;

pub(super) static RULES: &[Rule] = &[Rule {
    name: "dmy-triplet",
    apply: dmy_triplet,
}];

/// First day/month/year triplet that forms a valid calendar date,
/// normalized to zero-padded DD/MM/YYYY.
fn dmy_triplet(text: &str, _config: &ExtractionConfig) -> Option<String> {
    for caps in DATE_DMY.captures_iter(text) {
        let day: u32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let year = expand_year(&caps[3]);

        if NaiveDate::from_ymd_opt(year, month, day).is_some() {
            return Some(format!("{day:02}/{month:02}/{year:04}"));
        }
    }
    None
}

fn expand_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 { 2000 + year } else { 1900 + year }
    } else {
        year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    #[test]
    fn test_zero_pads_and_normalizes_separator() {
        assert_eq!(
            dmy_triplet("Date: 5-3-2024", &config()),
            Some("05/03/2024".to_string())
        );
        assert_eq!(
            dmy_triplet("15/01/2024", &config()),
            Some("15/01/2024".to_string())
        );
    }

    #[test]
    fn test_two_digit_year_expansion() {
        assert_eq!(
            dmy_triplet("01/06/24", &config()),
            Some("01/06/2024".to_string())
        );
        assert_eq!(
            dmy_triplet("01/06/99", &config()),
            Some("01/06/1999".to_string())
        );
    }

    #[test]
    fn test_skips_invalid_calendar_dates() {
        // 45/88 is not a date; the later triplet is the first valid one.
        assert_eq!(
            dmy_triplet("45/88/2024 then 12/11/2023", &config()),
            Some("12/11/2023".to_string())
        );
        assert_eq!(dmy_triplet("no dates here", &config()), None);
    }
}
