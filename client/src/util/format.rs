//! Display formatting for money and timestamps.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

use time::OffsetDateTime;
use time::macros::format_description;

pub const CURRENCY: &str = "$";

/// `1250` → `$12.50`; negative amounts keep their sign.
pub fn money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{CURRENCY}{}.{:02}", group_thousands(abs / 100), abs % 100)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `HH:MM` in the timestamp's own offset, empty when unknown.
pub fn clock_time(at: Option<OffsetDateTime>) -> String {
    at.and_then(|t| t.format(format_description!("[hour]:[minute]")).ok()).unwrap_or_default()
}

/// `12 Mar 2026, 14:05`, empty when unknown.
pub fn date_time(at: Option<OffsetDateTime>) -> String {
    at.and_then(|t| t.format(format_description!("[day padding:none] [month repr:short] [year], [hour]:[minute]")).ok())
        .unwrap_or_default()
}
