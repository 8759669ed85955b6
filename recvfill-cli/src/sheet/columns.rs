//! Column selection: spreadsheet letters ("C,T,U", "A:C") or header names

use regex::Regex;

use super::SheetError;

/// Highest column Excel supports (XFD)
const MAX_COLUMN: usize = 16_383;

/// Which columns of a sheet to keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelection {
    /// Letter spec, e.g. `"C,T,U"`, `"A:C"` or `"A,C:E"`
    Letters(String),
    /// Header names as they appear in the header row
    Names(Vec<String>),
}

/// Column letter to zero-based index (A -> 0, Z -> 25, AA -> 26)
pub fn column_index(letters: &str) -> Option<usize> {
    let letters = letters.trim();
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut index = 0usize;
    for c in letters.chars() {
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }

    let index = index - 1;
    (index <= MAX_COLUMN).then_some(index)
}

/// Zero-based index to column letter (0 -> A, 25 -> Z, 26 -> AA)
pub fn column_letter(index: usize) -> String {
    let mut n = index;
    let mut s = String::new();
    loop {
        let r = (n % 26) as u8;
        s.insert(0, (b'A' + r) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    s
}

/// Parse a letter spec into sorted, de-duplicated column indexes
pub fn parse_column_letters(spec: &str) -> Result<Vec<usize>, SheetError> {
    let invalid = |reason: String| SheetError::InvalidColumnSpec {
        spec: spec.to_string(),
        reason,
    };

    let re = Regex::new(r"^([A-Za-z]+)(?::([A-Za-z]+))?$")
        .map_err(|e| invalid(e.to_string()))?;

    let mut indexes = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(invalid("empty column entry".to_string()));
        }

        let caps = re
            .captures(part)
            .ok_or_else(|| invalid(format!("'{}' is not a column letter or range", part)))?;

        let start = caps
            .get(1)
            .and_then(|m| column_index(m.as_str()))
            .ok_or_else(|| invalid(format!("'{}' is out of range", part)))?;

        let end = match caps.get(2) {
            Some(m) => column_index(m.as_str())
                .ok_or_else(|| invalid(format!("'{}' is out of range", part)))?,
            None => start,
        };

        if end < start {
            return Err(invalid(format!("range '{}' is reversed", part)));
        }

        indexes.extend(start..=end);
    }

    indexes.sort_unstable();
    indexes.dedup();
    Ok(indexes)
}
