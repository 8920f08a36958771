//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;
use chrono::Utc;
use rand::Rng;
use regex::Regex;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a payment order id of the form `order_{millis}_{suffix}`
pub fn generate_order_id() -> String {
    format!("order_{}_{}", Utc::now().timestamp_millis(), generate_base36_string(9))
}

/// Generate a random lowercase base36 string
pub fn generate_base36_string(length: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Strip hyphens and whitespace from a phone number
pub fn normalize_phone_number(phone: &str) -> String {
    phone.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect()
}

fn mobile_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^01[016789][0-9]{7,8}$").ok()).as_ref()
}

/// Validate a Korean mobile number (hyphens and spaces allowed)
pub fn is_valid_phone(phone: &str) -> bool {
    mobile_pattern().is_some_and(|pattern| pattern.is_match(&normalize_phone_number(phone)))
}

/// Format a KRW amount with thousands separators, e.g. `30,000원`
pub fn format_currency(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-{}원", grouped)
    } else {
        format!("{}원", grouped)
    }
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
