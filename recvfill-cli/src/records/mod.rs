//! Receiving rows derived from a billing sheet
//!
//! A raw sheet table is filtered, trimmed, mapped to item/quantity/amount and
//! sorted by item number before it is handed to the form filler.

mod item;
mod transform;

use serde::{Deserialize, Serialize};

pub use item::{ItemKey, ItemKeyError};
pub use transform::{TransformOptions, transform_rows};

/// One billable line to be typed into the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Item number, `"<major>-<minor>"`
    pub item: String,
    pub quantity: f64,
    /// Extended price
    pub amount: f64,
}

impl Row {
    pub fn new(item: impl Into<String>, quantity: f64, amount: f64) -> Self {
        Self {
            item: item.into(),
            quantity,
            amount,
        }
    }
}
