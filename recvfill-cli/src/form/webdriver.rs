//! W3C WebDriver session over HTTP (chromedriver)
//!
//! Endpoints used:
//! - POST   /session                              new session
//! - POST   /session/{id}/url                     navigate
//! - POST   /session/{id}/element                 find element (css selector)
//! - GET    /session/{id}/element/{el}/text       element text
//! - POST   /session/{id}/element/{el}/clear      clear input
//! - POST   /session/{id}/element/{el}/value      type text
//! - DELETE /session/{id}                         quit
//! - GET    /status                               driver readiness

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::process::{Child, Command};

use super::{BrowserLauncher, DriverError, PageSession, poll_until};

/// Key under which WebDriver returns element references
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    /// Driver endpoint (chromedriver listens on 9515 by default)
    pub url: String,
    /// Spawn this chromedriver binary on the endpoint's port instead of
    /// connecting to one that is already running
    pub chromedriver_path: Option<PathBuf>,
    /// Extra Chrome command line switches
    pub browser_args: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long to wait for the driver's /status to report ready
    pub startup_timeout_secs: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9515".to_string(),
            chromedriver_path: None,
            browser_args: vec![
                "--disable-gpu".to_string(),
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
            request_timeout_secs: 30,
            startup_timeout_secs: 10,
        }
    }
}

/// Starts Chrome sessions through a WebDriver endpoint
pub struct WebDriverLauncher {
    config: WebDriverConfig,
    client: reqwest::Client,
}

impl WebDriverLauncher {
    pub fn new(config: WebDriverConfig) -> Result<Self, DriverError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DriverError::Launch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// New-session capabilities for Chrome
    pub fn capabilities(&self, headless: bool) -> Value {
        let mut args = Vec::with_capacity(self.config.browser_args.len() + 1);
        if headless {
            args.push("--headless=new".to_string());
        }
        args.extend(self.config.browser_args.iter().cloned());

        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }

    fn spawn_driver(&self) -> Result<Option<Child>, DriverError> {
        let Some(path) = &self.config.chromedriver_path else {
            return Ok(None);
        };

        let port = reqwest::Url::parse(&self.config.url)
            .ok()
            .and_then(|url| url.port_or_known_default())
            .ok_or_else(|| {
                DriverError::Launch(format!("cannot determine port from '{}'", self.config.url))
            })?;

        let child = Command::new(path)
            .arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DriverError::Launch(format!("failed to run {}: {}", path.display(), e)))?;

        info!("Started {} on port {}", path.display(), port);
        Ok(Some(child))
    }

    async fn wait_for_driver(&self) -> Result<(), DriverError> {
        let status_url = format!("{}/status", self.base_url());
        let timeout = Duration::from_secs(self.config.startup_timeout_secs);

        let ready = poll_until(timeout, Duration::from_millis(200), || {
            let client = self.client.clone();
            let url = status_url.clone();
            async move {
                match client.get(&url).send().await {
                    Ok(response) => {
                        let body: Value = response.json().await.unwrap_or(Value::Null);
                        Ok::<_, DriverError>(body["value"]["ready"].as_bool().unwrap_or(false))
                    }
                    Err(err) => {
                        debug!("WebDriver not reachable yet: {}", err);
                        Ok(false)
                    }
                }
            }
        })
        .await?;

        if ready {
            Ok(())
        } else {
            Err(DriverError::Launch(format!(
                "webdriver at {} not ready after {}s",
                self.base_url(),
                self.config.startup_timeout_secs
            )))
        }
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self, headless: bool) -> Result<Box<dyn PageSession>, DriverError> {
        // Dropping the child on any error below kills the driver again
        let driver = self.spawn_driver()?;
        self.wait_for_driver().await?;

        let response = self
            .client
            .post(format!("{}/session", self.base_url()))
            .json(&self.capabilities(headless))
            .send()
            .await?;
        let value = decode(response).await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| DriverError::Launch("new session response has no sessionId".to_string()))?
            .to_string();

        debug!("WebDriver session {} created", session_id);

        Ok(Box::new(WebDriverSession {
            client: self.client.clone(),
            base_url: self.base_url().to_string(),
            session_id,
            driver,
            closed: false,
        }))
    }
}

/// One WebDriver session; owns the chromedriver process when it was spawned for it
pub struct WebDriverSession {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
    driver: Option<Child>,
    closed: bool,
}

impl WebDriverSession {
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, DriverError> {
        if self.closed {
            return Err(DriverError::SessionClosed);
        }

        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        decode(response).await
    }

    /// Element reference for an id, `None` when the page has no such element
    async fn find_element(&self, id: &str) -> Result<Option<String>, DriverError> {
        let body = json!({ "using": "css selector", "value": id_selector(id) });

        match self.command(Method::POST, "/element", Some(body)).await {
            Ok(value) => value
                .get(ELEMENT_KEY)
                .and_then(Value::as_str)
                .map(|r| Some(r.to_string()))
                .ok_or_else(|| DriverError::Protocol {
                    status: 200,
                    error: "invalid response".to_string(),
                    message: format!("no element reference for '{}'", id),
                }),
            Err(DriverError::Protocol { ref error, .. }) if error == "no such element" => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl PageSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn element_text(&mut self, id: &str) -> Result<Option<String>, DriverError> {
        let Some(element) = self.find_element(id).await? else {
            return Ok(None);
        };

        let value = self
            .command(Method::GET, &format!("/element/{}/text", element), None)
            .await?;
        Ok(Some(value.as_str().unwrap_or_default().to_string()))
    }

    async fn replace_value(&mut self, id: &str, value: &str) -> Result<(), DriverError> {
        let element = self
            .find_element(id)
            .await?
            .ok_or_else(|| DriverError::NoSuchElement { id: id.to_string() })?;

        self.command(Method::POST, &format!("/element/{}/clear", element), Some(json!({})))
            .await?;
        self.command(
            Method::POST,
            &format!("/element/{}/value", element),
            Some(json!({ "text": value })),
        )
        .await?;

        Ok(())
    }

    async fn quit(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }

        let result = self.command(Method::DELETE, "", None).await;
        self.closed = true;

        if let Some(mut driver) = self.driver.take() {
            if let Err(err) = driver.kill().await {
                warn!("Failed to stop chromedriver: {}", err);
            }
        }

        result.map(|_| ())
    }
}

/// CSS selector matching an element id exactly, quoted so ids need no escaping rules
fn id_selector(id: &str) -> String {
    format!("[id=\"{}\"]", id.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Unwrap a WebDriver response body: `{"value": ...}` on success, an error object otherwise
async fn decode(response: reqwest::Response) -> Result<Value, DriverError> {
    let status = response.status();
    let text = response.text().await?;
    parse_response(status.as_u16(), &text)
}

fn parse_response(status: u16, text: &str) -> Result<Value, DriverError> {
    let body: Value = serde_json::from_str(text).map_err(|e| {
        let preview: String = text.chars().take(200).collect();
        DriverError::Http(format!("invalid response (HTTP {}): {}: {}", status, e, preview))
    })?;

    let value = body.get("value").cloned().unwrap_or(Value::Null);
    if (200..300).contains(&status) {
        return Ok(value);
    }

    Err(DriverError::Protocol {
        status,
        error: value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
        message: value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}
