//! Lexical helpers for `<letters><digits>` cell references such as `C7`.

use once_cell::sync::Lazy;
use regex::Regex;

static COLUMN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new("[A-Za-z]+").expect("Hardcode regex pattern"));
static ROW_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Hardcode regex pattern"));

/// Extracts the column label of a reference (`"C7"` → `"C"`).
/// Returns an empty string when the reference is absent or has no letters.
pub fn column_of(reference: Option<&str>) -> String {
    reference
        .and_then(|reference| COLUMN_PATTERN.find(reference))
        .map(|matcher| matcher.as_str().to_owned())
        .unwrap_or_default()
}

/// Extracts the 1-based row number of a reference (`"C7"` → `7`).
pub fn row_of(reference: Option<&str>) -> Option<u32> {
    reference
        .and_then(|reference| ROW_PATTERN.find(reference))
        .and_then(|matcher| matcher.as_str().parse().ok())
}

/// Builds a reference from a column label and a 1-based row number.
pub fn reference(column: &str, row: u32) -> String {
    format!("{column}{row}")
}

/// Converts 0-based row and column indexes to a reference (`(0, 27)` → `"AB1"`).
pub fn from_index(row: usize, col: usize) -> String {
    let mut column = col + 1;
    let mut label = Vec::<u8>::new();
    while column > 0 {
        column -= 1;
        label.push(b'A' + (column % 26) as u8);
        column /= 26;
    }
    label.reverse();
    format!("{}{}", String::from_utf8_lossy(&label), row + 1)
}
