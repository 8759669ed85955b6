//! Browser and form-filling errors

use std::time::Duration;

use super::FillerState;

/// Failure reported by a page session (WebDriver or otherwise)
#[derive(Debug, Clone, PartialEq)]
pub enum DriverError {
    /// The endpoint could not be reached or the transport failed
    Http(String),
    /// The driver answered with a WebDriver error
    Protocol {
        status: u16,
        error: String,
        message: String,
    },
    /// An element required for the command is not on the page
    NoSuchElement { id: String },
    /// Starting the driver or the browser failed
    Launch(String),
    /// The session has already been closed
    SessionClosed,
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverError::Http(message) => write!(f, "webdriver request failed: {}", message),
            DriverError::Protocol {
                status,
                error,
                message,
            } => write!(f, "webdriver error {} ({}): {}", status, error, message),
            DriverError::NoSuchElement { id } => write!(f, "element '{}' not found", id),
            DriverError::Launch(message) => write!(f, "failed to start browser: {}", message),
            DriverError::SessionClosed => write!(f, "browser session is closed"),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<reqwest::Error> for DriverError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("timed out: {}", err)
        } else if err.is_connect() {
            format!("could not connect to webdriver: {}", err)
        } else {
            err.to_string()
        };
        DriverError::Http(message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FillError {
    /// `start_browser` called while a session is open
    AlreadyStarted,
    /// An operation needs a browser session and none is open
    NotStarted,
    /// Operation not allowed in the current state
    InvalidState {
        operation: &'static str,
        state: FillerState,
    },
    /// The ready element did not appear in time
    PageNotReady { element: String, waited: Duration },
    /// Writing a field failed; earlier writes on the same row stay on the page
    Write { element: String, source: DriverError },
    Driver(DriverError),
}

impl std::fmt::Display for FillError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillError::AlreadyStarted => {
                write!(f, "browser already started, close it before starting again")
            }
            FillError::NotStarted => write!(f, "browser not started, call start_browser first"),
            FillError::InvalidState { operation, state } => {
                write!(f, "cannot {} while the filler is {}", operation, state)
            }
            FillError::PageNotReady { element, waited } => write!(
                f,
                "page not ready: element '{}' did not appear within {:.1}s",
                element,
                waited.as_secs_f64()
            ),
            FillError::Write { element, source } => {
                write!(f, "failed to write '{}': {}", element, source)
            }
            FillError::Driver(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FillError {}

impl From<DriverError> for FillError {
    fn from(err: DriverError) -> Self {
        FillError::Driver(err)
    }
}
