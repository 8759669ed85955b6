//! Outcome tally of one processing run

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No page row carries the item number
    NotFound,
    /// The page could not be queried while looking for the row
    LookupFailed,
    /// Typing quantity or amount failed
    WriteFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedItem {
    pub item: String,
    pub kind: FailureKind,
    pub reason: String,
}

/// Counts per outcome plus the rows that did not make it onto the page
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProcessResult {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub not_found: usize,
    pub failed_items: Vec<FailedItem>,
}

impl ProcessResult {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.success += 1;
    }

    pub(crate) fn record_not_found(&mut self, item: &str) {
        self.not_found += 1;
        self.failed_items.push(FailedItem {
            item: item.to_string(),
            kind: FailureKind::NotFound,
            reason: "item not found on page".to_string(),
        });
    }

    pub(crate) fn record_failure(&mut self, item: &str, kind: FailureKind, reason: String) {
        self.failed += 1;
        self.failed_items.push(FailedItem {
            item: item.to_string(),
            kind,
            reason,
        });
    }

    pub fn is_complete_success(&self) -> bool {
        self.success == self.total
    }
}
