//! Drives one browser session through the receiving form

use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time::sleep;

use super::wait::wait_for_element;
use super::{
    BrowserLauncher, FailureKind, FillError, FormSelectors, PageSession, PageWait, ProcessResult,
    RowLocator, SequentialIdScan,
};
use crate::records::Row;
use crate::sheet::format_number;

/// Lifecycle of a [`FormFiller`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillerState {
    Idle,
    BrowserStarted,
    PageOpen,
    Processing,
    Closed,
}

impl std::fmt::Display for FillerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillerState::Idle => write!(f, "idle"),
            FillerState::BrowserStarted => write!(f, "started"),
            FillerState::PageOpen => write!(f, "on a page"),
            FillerState::Processing => write!(f, "processing"),
            FillerState::Closed => write!(f, "closed"),
        }
    }
}

/// Types receiving rows into the page, one row at a time.
///
/// Owns at most one browser session. Call [`FormFiller::close_browser`] on every
/// exit path. Dropping a filler with an open session only spawns a quit on the
/// current tokio runtime, which may never run while the runtime shuts down; a
/// chromedriver spawned for the session is killed when the session is dropped.
pub struct FormFiller {
    launcher: Box<dyn BrowserLauncher>,
    locator: Box<dyn RowLocator>,
    selectors: FormSelectors,
    field_settle: Duration,
    session: Option<Box<dyn PageSession>>,
    state: FillerState,
}

impl FormFiller {
    /// Filler that finds rows with `locator` and types into the inputs named by `selectors`
    pub fn new(
        launcher: Box<dyn BrowserLauncher>,
        locator: Box<dyn RowLocator>,
        selectors: FormSelectors,
    ) -> Self {
        Self {
            launcher,
            locator,
            selectors,
            field_settle: Duration::ZERO,
            session: None,
            state: FillerState::Idle,
        }
    }

    /// Filler using the sequential id scan over `selectors`' label ids
    pub fn with_id_scan(launcher: Box<dyn BrowserLauncher>, selectors: FormSelectors) -> Self {
        let locator = Box::new(SequentialIdScan::from_selectors(&selectors));
        Self::new(launcher, locator, selectors)
    }

    /// Pause after both fields of a row are written
    pub fn with_field_settle(mut self, settle: Duration) -> Self {
        self.field_settle = settle;
        self
    }

    pub fn state(&self) -> FillerState {
        self.state
    }

    /// Launch the browser. Fails if a session is already open.
    pub async fn start_browser(&mut self, headless: bool) -> Result<(), FillError> {
        if self.session.is_some() {
            return Err(FillError::AlreadyStarted);
        }

        let session = self.launcher.launch(headless).await?;
        self.session = Some(session);
        self.state = FillerState::BrowserStarted;
        info!("Browser started{}", if headless { " (headless)" } else { "" });

        Ok(())
    }

    /// Navigate to `url`, then wait for the page according to `wait`
    pub async fn open_url(&mut self, url: &str, wait: &PageWait) -> Result<(), FillError> {
        let session = self.session.as_mut().ok_or(FillError::NotStarted)?;
        if self.state == FillerState::Processing {
            return Err(FillError::InvalidState {
                operation: "navigate",
                state: self.state,
            });
        }

        session.navigate(url).await?;
        self.state = FillerState::PageOpen;
        info!("Opened {}", url);

        self.wait_until_ready(wait).await
    }

    /// Wait for the current page without navigating, e.g. after a manual login
    pub async fn wait_until_ready(&mut self, wait: &PageWait) -> Result<(), FillError> {
        match wait {
            PageWait::Fixed(settle) => {
                if self.session.is_none() {
                    return Err(FillError::NotStarted);
                }
                debug!("Waiting {:?} for the page to settle", settle);
                sleep(*settle).await;
                Ok(())
            }
            PageWait::Element {
                id,
                timeout,
                interval,
            } => {
                let page = self.session.as_deref_mut().ok_or(FillError::NotStarted)?;
                if wait_for_element(page, id, *timeout, *interval).await? {
                    Ok(())
                } else {
                    Err(FillError::PageNotReady {
                        element: id.clone(),
                        waited: *timeout,
                    })
                }
            }
        }
    }

    /// Page row index carrying `item`, `None` if the page has no such row
    pub async fn find_item_index(&mut self, item: &str) -> Result<Option<usize>, FillError> {
        let page = self.session.as_deref_mut().ok_or(FillError::NotStarted)?;
        let found = self.locator.lookup_row_by_label(page, item).await?;

        match found {
            Some(handle) => debug!("Item '{}' is page row {}", item.trim(), handle.index),
            None => debug!("Item '{}' is not on the page", item.trim()),
        }

        Ok(found.map(|handle| handle.index))
    }

    /// Clear and type the quantity, then the amount, of page row `index`.
    ///
    /// A failure on the amount leaves the quantity already typed.
    pub async fn fill_quantity_and_amount(
        &mut self,
        index: usize,
        quantity: f64,
        amount: f64,
    ) -> Result<(), FillError> {
        let page = self.session.as_deref_mut().ok_or(FillError::NotStarted)?;

        let fields = [
            (self.selectors.quantity_id(index), quantity),
            (self.selectors.amount_id(index), amount),
        ];
        for (id, value) in fields {
            let text = format_number(value);
            page.replace_value(&id, &text)
                .await
                .map_err(|source| FillError::Write {
                    element: id.clone(),
                    source,
                })?;
            debug!("Typed {} into {}", text, id);
        }

        if !self.field_settle.is_zero() {
            sleep(self.field_settle).await;
        }

        Ok(())
    }

    /// Fill every row in order, pausing `row_delay` between rows.
    ///
    /// Failures are per row: a missing item or a failed write is recorded and
    /// the next row is processed. Nothing is retried.
    pub async fn process(&mut self, rows: &[Row], row_delay: Duration) -> Result<ProcessResult, FillError> {
        if self.state != FillerState::PageOpen || self.session.is_none() {
            return Err(FillError::InvalidState {
                operation: "process rows",
                state: self.state,
            });
        }

        self.state = FillerState::Processing;
        let mut result = ProcessResult::new(rows.len());

        for (i, row) in rows.iter().enumerate() {
            let item = row.item.trim();
            info!("[{}/{}] Processing item {}", i + 1, rows.len(), item);

            match self.find_item_index(item).await {
                Ok(Some(index)) => {
                    match self.fill_quantity_and_amount(index, row.quantity, row.amount).await {
                        Ok(()) => {
                            info!(
                                "  {} -> row {}: quantity {}, amount {}",
                                item,
                                index,
                                format_number(row.quantity),
                                format_number(row.amount)
                            );
                            result.record_success();
                        }
                        Err(err) => {
                            error!("  {}: {}", item, err);
                            result.record_failure(item, FailureKind::WriteFailed, err.to_string());
                        }
                    }
                }
                Ok(None) => {
                    warn!("  {}: not found on page", item);
                    result.record_not_found(item);
                }
                Err(err) => {
                    error!("  {}: lookup failed: {}", item, err);
                    result.record_failure(item, FailureKind::LookupFailed, err.to_string());
                }
            }

            if i + 1 < rows.len() && !row_delay.is_zero() {
                sleep(row_delay).await;
            }
        }

        self.state = FillerState::PageOpen;
        info!(
            "Processed {} rows: {} filled, {} failed, {} not found",
            result.total, result.success, result.failed, result.not_found
        );

        Ok(result)
    }

    /// Close the browser session; does nothing when none is open
    pub async fn close_browser(&mut self) -> Result<(), FillError> {
        let Some(mut session) = self.session.take() else {
            debug!("close_browser: no session open");
            return Ok(());
        };

        self.state = FillerState::Closed;
        session.quit().await?;
        info!("Browser closed");

        Ok(())
    }
}

impl Drop for FormFiller {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        warn!("Browser session still open on drop, scheduling quit");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = session.quit().await {
                        warn!("Failed to close browser session: {}", err);
                    }
                });
            }
            Err(_) => warn!("No async runtime available, browser session left open"),
        }
    }
}
