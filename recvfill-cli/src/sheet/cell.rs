//! Cell values read from a worksheet

use calamine::Data;
use serde::Serialize;

/// A single worksheet cell, normalised from calamine's `Data`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Blank cell, whitespace-only text, or an Excel error value
    Empty,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Date/time rendered as text
    DateTime(String),
}

impl Cell {
    /// Convert a calamine cell
    pub fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::String(s.clone()),
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::DateTime(format!("{}", dt)),
            Data::DateTimeIso(s) => Cell::DateTime(s.clone()),
            Data::DurationIso(s) => Cell::String(s.clone()),
            Data::Error(_) => Cell::Empty,
        }
    }

    /// Parse a user-supplied literal (CLI flag or config value) into a cell
    pub fn parse(s: &str) -> Self {
        let s = s.trim();

        if s.is_empty() {
            return Cell::Empty;
        }

        match s.to_lowercase().as_str() {
            "true" => return Cell::Bool(true),
            "false" => return Cell::Bool(false),
            _ => {}
        }

        if let Ok(i) = s.parse::<i64>() {
            return Cell::Int(i);
        }

        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return Cell::Float(f);
            }
        }

        Cell::String(s.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text form of the cell, `None` when empty
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::String(s) => Some(s.trim().to_string()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) => Some(format_number(*f)),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::DateTime(s) => Some(s.clone()),
        }
    }

    /// Numeric value of the cell; text is accepted when it parses as a number
    /// (thousands separators are ignored)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::String(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
                cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_text() {
            Some(text) => write!(f, "{}", text),
            None => Ok(()),
        }
    }
}

/// Render a number the way an operator would type it: whole values without
/// a fractional part (`12.0` -> `"12"`)
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data_blank_strings_are_empty() {
        assert_eq!(Cell::from_data(&Data::String("   ".to_string())), Cell::Empty);
        assert_eq!(Cell::from_data(&Data::Empty), Cell::Empty);
        assert_eq!(
            Cell::from_data(&Data::String("2-1".to_string())),
            Cell::String("2-1".to_string())
        );
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(Cell::parse("0"), Cell::Int(0));
        assert_eq!(Cell::parse("1.5"), Cell::Float(1.5));
        assert_eq!(Cell::parse("TRUE"), Cell::Bool(true));
        assert_eq!(Cell::parse("n/a"), Cell::String("n/a".to_string()));
        assert_eq!(Cell::parse(""), Cell::Empty);
        assert_eq!(Cell::parse("nan"), Cell::String("nan".to_string()));
    }

    #[test]
    fn test_as_text_whole_floats() {
        assert_eq!(Cell::Float(12.0).as_text(), Some("12".to_string()));
        assert_eq!(Cell::Float(12.5).as_text(), Some("12.5".to_string()));
        assert_eq!(Cell::String(" 3-4 ".to_string()).as_text(), Some("3-4".to_string()));
        assert_eq!(Cell::Empty.as_text(), None);
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Cell::Int(7).as_number(), Some(7.0));
        assert_eq!(Cell::String("1,234.5".to_string()).as_number(), Some(1234.5));
        assert_eq!(Cell::String("abc".to_string()).as_number(), None);
        assert_eq!(Cell::Bool(true).as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(-3.0), "-3");
    }
}
