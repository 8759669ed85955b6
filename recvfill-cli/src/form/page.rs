//! Capabilities the filler needs from a browser

use async_trait::async_trait;

use super::DriverError;

/// An open browser page, addressed by element id
#[async_trait]
pub trait PageSession: Send {
    /// Navigate the current window to `url`
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    /// Visible text of the element with this id; `Ok(None)` if there is no such element
    async fn element_text(&mut self, id: &str) -> Result<Option<String>, DriverError>;

    /// Whether an element with this id is on the page
    async fn element_exists(&mut self, id: &str) -> Result<bool, DriverError> {
        Ok(self.element_text(id).await?.is_some())
    }

    /// Clear an input and type `value` into it
    async fn replace_value(&mut self, id: &str, value: &str) -> Result<(), DriverError>;

    /// End the session and release the browser
    async fn quit(&mut self) -> Result<(), DriverError>;
}

/// Starts browser sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, headless: bool) -> Result<Box<dyn PageSession>, DriverError>;
}
