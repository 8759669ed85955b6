//! Two-part item numbers ("3-12")

use std::cmp::Ordering;

/// Numeric sort key of an item number: `major-minor`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemKey {
    pub major: f64,
    pub minor: f64,
}

/// Why an item number could not be split into a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKeyError {
    /// No `-` in the value
    MissingSeparator,
    /// More than one `-`
    TooManySeparators { count: usize },
    /// A part is empty or not a finite number
    NotNumeric { part: String },
}

impl std::fmt::Display for ItemKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKeyError::MissingSeparator => {
                write!(f, "missing '-' separator (expected e.g. '3-12')")
            }
            ItemKeyError::TooManySeparators { count } => {
                write!(f, "has {} '-' separators, expected exactly one", count)
            }
            ItemKeyError::NotNumeric { part } => {
                write!(f, "'{}' is not a number", part)
            }
        }
    }
}

impl std::error::Error for ItemKeyError {}

impl ItemKey {
    /// Split an item number on its single `-` and parse both halves
    pub fn parse(item: &str) -> Result<Self, ItemKeyError> {
        let item = item.trim();
        let count = item.matches('-').count();

        match count {
            0 => return Err(ItemKeyError::MissingSeparator),
            1 => {}
            _ => return Err(ItemKeyError::TooManySeparators { count }),
        }

        let (major, minor) = item
            .split_once('-')
            .ok_or(ItemKeyError::MissingSeparator)?;

        Ok(Self {
            major: parse_part(major)?,
            minor: parse_part(minor)?,
        })
    }

    /// Ascending by major, then minor
    pub fn compare(&self, other: &Self) -> Ordering {
        self.major
            .total_cmp(&other.major)
            .then(self.minor.total_cmp(&other.minor))
    }
}

fn parse_part(part: &str) -> Result<f64, ItemKeyError> {
    let trimmed = part.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ItemKeyError::NotNumeric {
            part: trimmed.to_string(),
        })
}
