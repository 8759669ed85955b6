//! In-memory page and launcher for filler tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{BrowserLauncher, DriverError, FormSelectors, PageSession};

#[derive(Debug, Default)]
pub struct PageState {
    /// Element id -> text (labels) or value (inputs)
    pub elements: HashMap<String, String>,
    /// Ids whose writes fail
    pub failing_writes: HashSet<String>,
    /// Ids that only show up after this many total probes
    pub delayed: HashMap<String, usize>,
    pub fail_reads: bool,
    pub probes: usize,
    pub visited: Vec<String>,
    pub quit: bool,
}

/// Fake page; clones share state so tests can inspect it after the filler
/// has taken ownership of the session
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    state: Arc<Mutex<PageState>>,
}

impl FakePage {
    /// A receiving grid with one row per label, inputs empty
    pub fn with_labels(labels: &[&str]) -> Self {
        let selectors = FormSelectors::default();
        let page = Self::default();
        {
            let mut state = page.state();
            for (i, label) in labels.iter().enumerate() {
                state.elements.insert(selectors.label_id(i), label.to_string());
                state.elements.insert(selectors.quantity_id(i), String::new());
                state.elements.insert(selectors.amount_id(i), String::new());
            }
        }
        page
    }

    pub fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap()
    }

    pub fn value(&self, id: &str) -> Option<String> {
        self.state().elements.get(id).cloned()
    }

    pub fn probes(&self) -> usize {
        self.state().probes
    }

    pub fn fail_reads(&mut self) {
        self.state().fail_reads = true;
    }

    pub fn fail_writes_to(&mut self, id: &str) {
        self.state().failing_writes.insert(id.to_string());
    }

    pub fn delay_element(&mut self, id: &str, probes: usize) {
        self.state().delayed.insert(id.to_string(), probes);
    }
}

#[async_trait]
impl PageSession for FakePage {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.state().visited.push(url.to_string());
        Ok(())
    }

    async fn element_text(&mut self, id: &str) -> Result<Option<String>, DriverError> {
        let mut state = self.state();
        state.probes += 1;

        if state.fail_reads {
            return Err(DriverError::Http("connection reset".to_string()));
        }

        if let Some(&after) = state.delayed.get(id) {
            if state.probes <= after {
                return Ok(None);
            }
        }

        Ok(state.elements.get(id).cloned())
    }

    async fn replace_value(&mut self, id: &str, value: &str) -> Result<(), DriverError> {
        let mut state = self.state();

        if state.failing_writes.contains(id) {
            return Err(DriverError::Protocol {
                status: 400,
                error: "element not interactable".to_string(),
                message: format!("{} is read-only", id),
            });
        }

        match state.elements.get_mut(id) {
            Some(current) => {
                *current = value.to_string();
                Ok(())
            }
            None => Err(DriverError::NoSuchElement { id: id.to_string() }),
        }
    }

    async fn quit(&mut self) -> Result<(), DriverError> {
        self.state().quit = true;
        Ok(())
    }
}

/// Hands out clones of one fake page
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    pub page: FakePage,
    pub launches: Arc<AtomicUsize>,
    pub fail: bool,
}

impl FakeLauncher {
    pub fn new(page: FakePage) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, _headless: bool) -> Result<Box<dyn PageSession>, DriverError> {
        if self.fail {
            return Err(DriverError::Launch("chrome not installed".to_string()));
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.page.clone()))
    }
}
