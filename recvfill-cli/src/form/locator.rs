//! Finding the page row that carries a given item number

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{DriverError, PageSession};

/// Element id prefixes of the receiving grid. Ids are `<prefix>_<row index>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSelectors {
    /// Label holding the item number
    pub label_prefix: String,
    /// Received quantity input
    pub quantity_prefix: String,
    /// Received amount input
    pub amount_prefix: String,
    /// Upper bound (exclusive) on probed row indexes
    pub scan_limit: usize,
}

impl Default for FormSelectors {
    fn default() -> Self {
        Self {
            label_prefix: "gvReceive_lblItem".to_string(),
            quantity_prefix: "gvReceive_txtRecvQty".to_string(),
            amount_prefix: "gvReceive_txtRecvAmt".to_string(),
            scan_limit: 1000,
        }
    }
}

impl FormSelectors {
    pub fn label_id(&self, index: usize) -> String {
        element_id(&self.label_prefix, index)
    }

    pub fn quantity_id(&self, index: usize) -> String {
        element_id(&self.quantity_prefix, index)
    }

    pub fn amount_id(&self, index: usize) -> String {
        element_id(&self.amount_prefix, index)
    }
}

pub fn element_id(prefix: &str, index: usize) -> String {
    format!("{}_{}", prefix, index)
}

/// A located row on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHandle {
    /// Zero-based row position assigned by the page
    pub index: usize,
}

/// Strategy for mapping an item label to a page row
#[async_trait]
pub trait RowLocator: Send + Sync {
    async fn lookup_row_by_label(
        &self,
        page: &mut dyn PageSession,
        label: &str,
    ) -> Result<Option<RowHandle>, DriverError>;
}

/// Probes `<prefix>_0`, `<prefix>_1`, ... until the label matches, an element
/// is missing, or `limit` is reached. The first (lowest) matching index wins.
#[derive(Debug, Clone)]
pub struct SequentialIdScan {
    prefix: String,
    limit: usize,
}

impl SequentialIdScan {
    pub fn new(prefix: impl Into<String>, limit: usize) -> Self {
        Self {
            prefix: prefix.into(),
            limit,
        }
    }

    pub fn from_selectors(selectors: &FormSelectors) -> Self {
        Self::new(selectors.label_prefix.clone(), selectors.scan_limit)
    }
}

#[async_trait]
impl RowLocator for SequentialIdScan {
    async fn lookup_row_by_label(
        &self,
        page: &mut dyn PageSession,
        label: &str,
    ) -> Result<Option<RowHandle>, DriverError> {
        let wanted = label.trim();

        for index in 0..self.limit {
            let id = element_id(&self.prefix, index);
            let Some(text) = page.element_text(&id).await? else {
                debug!("No element '{}', '{}' not on page", id, wanted);
                return Ok(None);
            };

            if text.trim() == wanted {
                return Ok(Some(RowHandle { index }));
            }
        }

        debug!("Scanned {} rows without finding '{}'", self.limit, wanted);
        Ok(None)
    }
}
