//! Page handle: navigation and screenshot capture.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
use chrono::{DateTime, Utc};
use url::Url;

use crate::config::{CaptureConfig, ImageFormat};
use crate::error::{Error, Result};

/// A handle to one navigable tab within a session.
///
/// Obtained from [`crate::Session::new_page`]. Invalid once the owning
/// session is closed: every operation then fails with
/// [`Error::SessionClosed`].
pub struct Page {
    page: CdpPage,
    closed: Arc<AtomicBool>,
    navigation_timeout: Duration,
    settle_delay: Duration,
    capture: CaptureConfig,
}

/// Receipt for a screenshot written to disk.
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// Where the image was written.
    pub path: PathBuf,
    /// Size of the written image in bytes.
    pub bytes: u64,
    /// When the capture completed.
    pub captured_at: DateTime<Utc>,
}

impl Page {
    pub(crate) fn new(
        page: CdpPage,
        closed: Arc<AtomicBool>,
        navigation_timeout: Duration,
        settle_delay: Duration,
        capture: CaptureConfig,
    ) -> Self {
        Self {
            page,
            closed,
            navigation_timeout,
            settle_delay,
            capture,
        }
    }

    /// Navigate to a URL and wait for the load to complete.
    ///
    /// The URL is validated before touching the network. Network failures
    /// and loads exceeding the navigation timeout surface as
    /// [`Error::Navigation`]. After the load event, the configured settle
    /// delay gives the renderer time to paint late-arriving content.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.ensure_open()?;
        let target = validate_url(url)?;

        tracing::info!(url = %target, "navigating");

        let deadline = self.navigation_timeout;
        let outcome = tokio::time::timeout(deadline, async {
            self.page.goto(target.as_str()).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(Error::Navigation {
                    url: url.into(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(Error::Navigation {
                    url: url.into(),
                    reason: format!("load did not complete within {:?}", deadline),
                })
            }
        }

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        Ok(())
    }

    /// Render the current page content and write it to `path`.
    ///
    /// The image format comes from the capture configuration. An empty
    /// image from the browser is a capture failure; a filesystem failure
    /// is [`Error::Io`].
    pub async fn capture(&self, path: &Path) -> Result<CaptureResult> {
        let bytes = self.capture_bytes().await?;
        std::fs::write(path, &bytes)?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "screenshot written");

        Ok(CaptureResult {
            path: path.to_path_buf(),
            bytes: bytes.len() as u64,
            captured_at: Utc::now(),
        })
    }

    /// Render the current page content and return the raw image bytes.
    pub async fn capture_bytes(&self) -> Result<Vec<u8>> {
        self.ensure_open()?;

        tracing::debug!(format = %self.capture.format, "capturing screenshot");

        let bytes = self
            .page
            .screenshot(screenshot_params(&self.capture))
            .await
            .map_err(|e| Error::Capture(format!("screenshot failed: {}", e)))?;

        if bytes.is_empty() {
            return Err(Error::Capture("browser returned an empty image".into()));
        }

        Ok(bytes)
    }

    /// Current URL of the page, if any.
    ///
    /// A driver failure here means the target is gone, which reports as
    /// [`Error::SessionClosed`].
    pub async fn url(&self) -> Result<Option<String>> {
        self.ensure_open()?;
        self.page.url().await.map_err(|_| Error::SessionClosed)
    }

    /// Title of the current document, if any.
    pub async fn title(&self) -> Result<Option<String>> {
        self.ensure_open()?;
        self.page
            .get_title()
            .await
            .map_err(|_| Error::SessionClosed)
    }

    /// Close this page's tab.
    ///
    /// Benign after the session is closed; the session tears down every
    /// page anyway.
    pub async fn close(self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Ok(());
        }
        if let Err(e) = self.page.close().await {
            tracing::debug!("page close: {}", e);
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::SessionClosed);
        }
        Ok(())
    }
}

/// Build CDP screenshot parameters from the capture configuration.
fn screenshot_params(capture: &CaptureConfig) -> ScreenshotParams {
    let format = match capture.format {
        ImageFormat::Png => CaptureScreenshotFormat::Png,
        ImageFormat::Jpeg => CaptureScreenshotFormat::Jpeg,
    };

    let mut builder = ScreenshotParams::builder()
        .format(format)
        .full_page(capture.full_page);

    // Quality is a JPEG-only knob in CDP.
    if capture.format == ImageFormat::Jpeg {
        if let Some(quality) = capture.quality {
            builder = builder.quality(i64::from(quality));
        }
    }

    builder.build()
}

/// Validate a navigation target before touching the network.
fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::Navigation {
        url: raw.into(),
        reason: format!("invalid URL: {}", e),
    })?;

    match url.scheme() {
        "http" | "https" | "file" | "about" | "data" => Ok(url),
        other => Err(Error::Navigation {
            url: raw.into(),
            reason: format!("unsupported scheme: {}", other),
        }),
    }
}
