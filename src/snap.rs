//! PageSnap - composed capture flow with guaranteed browser release.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::{Config, ImageFormat};
use crate::error::Result;
use crate::page::{CaptureResult, Page};
use crate::session::Session;

/// Orchestrator for the launch-and-capture flow.
///
/// Lazily launches one [`Session`] on first use and reuses it across
/// captures. [`PageSnap::capture_url`] runs the whole flow for one URL;
/// [`PageSnap::close`] releases the browser process and is idempotent.
///
/// The browser process is the one exclusively-owned external resource, so
/// the flow closes the page it opened on success and failure alike, and
/// [`quick_capture`] additionally closes the session on every exit path.
pub struct PageSnap {
    config: Config,
    session: RwLock<Option<Arc<Session>>>,
}

impl PageSnap {
    /// Create a PageSnap with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a PageSnap with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            session: RwLock::new(None),
        }
    }

    /// Create a builder for PageSnap.
    pub fn builder() -> PageSnapBuilder {
        PageSnapBuilder::default()
    }

    /// Get the running session, launching one if needed.
    async fn session(&self) -> Result<Arc<Session>> {
        {
            let guard = self.session.read().await;
            if let Some(session) = guard.as_ref() {
                if session.is_running() {
                    return Ok(Arc::clone(session));
                }
            }
        }

        let mut slot = self.session.write().await;
        // Another caller may have launched while we waited for the lock.
        if let Some(session) = slot.as_ref() {
            if session.is_running() {
                return Ok(Arc::clone(session));
            }
        }

        let session = Arc::new(Session::launch(&self.config).await?);
        *slot = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Capture a screenshot of `url` into the file at `path`.
    ///
    /// Opens a fresh page, navigates, captures, and closes the page whether
    /// or not the flow succeeded.
    pub async fn capture_url(&self, url: &str, path: impl AsRef<Path>) -> Result<CaptureResult> {
        let session = self.session().await?;
        let page = session.new_page().await?;

        let result = drive(&page, url, path.as_ref()).await;

        if let Err(e) = page.close().await {
            tracing::debug!("page close after capture: {}", e);
        }

        result
    }

    /// Close the underlying session, terminating the browser process.
    ///
    /// Idempotent; a PageSnap that never launched closes trivially.
    pub async fn close(&self) -> Result<()> {
        let mut slot = self.session.write().await;
        if let Some(session) = slot.take() {
            session.close().await?;
        }
        Ok(())
    }
}

impl Default for PageSnap {
    fn default() -> Self {
        Self::new()
    }
}

/// The sequential navigate-then-capture step, separated so the caller can
/// close the page regardless of where it failed.
async fn drive(page: &Page, url: &str, path: &Path) -> Result<CaptureResult> {
    page.navigate(url).await?;
    page.capture(path).await
}

/// Capture one URL with a throwaway browser session.
///
/// Launches, captures, and closes. The session is released on every exit
/// path, including navigation and capture failure.
pub async fn quick_capture(url: &str, path: impl AsRef<Path>) -> Result<CaptureResult> {
    let snap = PageSnap::new();
    let result = snap.capture_url(url, path).await;

    if let Err(e) = snap.close().await {
        tracing::warn!("session close after capture failed: {}", e);
    }

    result
}

/// Builder for PageSnap.
#[derive(Default)]
pub struct PageSnapBuilder {
    config: Option<Config>,
    headless: Option<bool>,
    executable_path: Option<PathBuf>,
    no_sandbox: bool,
    args: Vec<String>,
    format: Option<ImageFormat>,
    full_page: Option<bool>,
}

impl PageSnapBuilder {
    /// Set custom configuration as the base.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set headless mode.
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = Some(headless);
        self
    }

    /// Set browser executable path.
    pub fn executable_path(mut self, path: PathBuf) -> Self {
        self.executable_path = Some(path);
        self
    }

    /// Disable sandbox (for containers).
    pub fn no_sandbox(mut self) -> Self {
        self.no_sandbox = true;
        self
    }

    /// Append a process argument, passed verbatim.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set the capture image format.
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Capture the full scrollable page.
    pub fn full_page(mut self, full_page: bool) -> Self {
        self.full_page = Some(full_page);
        self
    }

    /// Build the PageSnap instance.
    pub fn build(self) -> PageSnap {
        let mut config = self.config.unwrap_or_default();

        if let Some(headless) = self.headless {
            config.browser.headless = headless;
        }
        if let Some(path) = self.executable_path {
            config.browser.executable_path = Some(path);
        }
        if self.no_sandbox {
            config.browser.sandbox = false;
        }
        config.browser.args.extend(self.args);
        if let Some(format) = self.format {
            config.capture.format = format;
        }
        if let Some(full_page) = self.full_page {
            config.capture.full_page = full_page;
        }

        PageSnap::with_config(config)
    }
}
