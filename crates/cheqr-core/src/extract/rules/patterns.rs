//! Common regex patterns for cheque field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Date patterns: day/month/year with - or / separators
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[-/](\d{1,2})[-/](\d{4}|\d{2})\b"
    ).unwrap();

    // IFSC: 4 uppercase letters + 7 digits, optionally labeled
    pub static ref IFSC_LABELED: Regex = Regex::new(
        r"(?i:IFSC)[\s:]*([A-Z]{4}[0-9]{7})"
    ).unwrap();

    pub static ref IFSC_STANDALONE: Regex = Regex::new(
        r"\b([A-Z]{4}[0-9]{7})\b"
    ).unwrap();

    // Amount in words, between a currency marker and the terminator
    pub static ref AMOUNT_WORDS: Regex = Regex::new(
        r"(?i)(?:rupees|rs\.?)\s+(.+?)\s+only"
    ).unwrap();

    // Amount in digits: comma-grouped run, optional 2-digit decimals,
    // optional currency prefix
    pub static ref AMOUNT_DIGITS: Regex = Regex::new(
        r"(?:₹|(?i:rs\.?))?\s*\b(\d+(?:,\d+)*(?:\.\d{2})?)\b"
    ).unwrap();

    // Payer name, between "Pay" and "or bearer"
    pub static ref PAYER_BEARER: Regex = Regex::new(
        r"(?i)pay\s+(.+?)\s+or\s+bearer"
    ).unwrap();

    // Candidate account numbers: long standalone digit runs
    pub static ref ACCOUNT_RUN: Regex = Regex::new(
        r"\b\d{9,18}\b"
    ).unwrap();

    // MICR line: four delimiter-bounded numeric groups (6+9+6+2 digits)
    pub static ref MICR_LINE: Regex = Regex::new(
        r"(\d{6})[^\d\n]{1,3}(\d{9})[^\d\n]{1,3}(\d{6})[^\d\n]{1,3}(\d{2})"
    ).unwrap();

    // Fallback cheque number: standalone 6-digit run
    pub static ref CHEQUE_STANDALONE: Regex = Regex::new(
        r"\b(\d{6})\b"
    ).unwrap();
}
