//! Browser automation for the receiving form
//!
//! The filler talks to the browser through two seams:
//! - [`PageSession`]: read element text and type into inputs by element id
//! - [`RowLocator`]: map an item number to the page's row index
//!
//! [`webdriver`] provides the real session over the W3C WebDriver protocol.

mod error;
mod filler;
mod locator;
mod page;
mod result;
mod wait;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{DriverError, FillError};
pub use filler::{FillerState, FormFiller};
pub use locator::{FormSelectors, RowLocator, SequentialIdScan};
pub use page::{BrowserLauncher, PageSession};
pub use result::{FailureKind, ProcessResult};
pub use wait::{PageWait, poll_until};
pub use webdriver::{WebDriverConfig, WebDriverLauncher};
