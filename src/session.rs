//! Browser session lifecycle: launch, page creation, and teardown.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::browser::BrowserDetector;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::page::Page;

/// Time allowed for the browser process to exit after a graceful close.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Distinguishes per-session profile directories within one process.
static SESSION_SEQ: AtomicU64 = AtomicU64::new(0);

/// A handle to one running external browser process.
///
/// Created by [`Session::launch`], destroyed by [`Session::close`]. The
/// session owns every [`Page`] it hands out: once closed, all of them fail
/// with [`Error::SessionClosed`].
pub struct Session {
    inner: Mutex<Option<SessionInner>>,
    closed: Arc<AtomicBool>,
    config: Config,
}

struct SessionInner {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl Session {
    /// Launch a browser process and return a running session.
    ///
    /// Resolves the executable (explicit override or auto-detection), builds
    /// the launch configuration, and bounds process initialization by the
    /// configured launch timeout.
    pub async fn launch(config: &Config) -> Result<Self> {
        let installation = BrowserDetector::resolve(&config.browser)?;

        tracing::info!(
            browser = %installation.browser_type,
            path = %installation.executable_path.display(),
            "launching browser"
        );

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&installation.executable_path)
            .viewport(Viewport {
                width: config.browser.window_width,
                height: config.browser.window_height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: false,
                has_touch: false,
            });

        if !config.browser.headless {
            builder = builder.with_head();
        }

        // Chromium holds an exclusive lock on the profile, so the fallback
        // directory must be unique per session.
        let user_data_dir = config
            .browser
            .user_data_dir
            .clone()
            .unwrap_or_else(default_profile_dir);
        std::fs::create_dir_all(&user_data_dir)?;
        builder = builder.user_data_dir(&user_data_dir);

        if !config.browser.sandbox {
            builder = builder.arg("--no-sandbox");
        }

        for arg in &config.browser.args {
            builder = builder.arg(arg);
        }

        let browser_config = builder.build().map_err(Error::Launch)?;

        let launch_timeout = config.browser.launch_timeout;
        let (browser, mut handler) =
            tokio::time::timeout(launch_timeout, Browser::launch(browser_config))
                .await
                .map_err(|_| {
                    Error::Launch(format!(
                        "browser did not initialize within {:?}",
                        launch_timeout
                    ))
                })?
                .map_err(|e| Error::Launch(format!("failed to launch browser: {}", e)))?;

        // Drive the CDP event stream for the lifetime of the session.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::warn!("browser handler error: {}", e);
                }
            }
        });

        tracing::info!("browser session started");

        Ok(Self {
            inner: Mutex::new(Some(SessionInner {
                browser,
                handler: handler_task,
            })),
            closed: Arc::new(AtomicBool::new(false)),
            config: config.clone(),
        })
    }

    /// Open a new page bound to this session.
    ///
    /// Fails with [`Error::SessionClosed`] if the session has been closed or
    /// the browser process is no longer reachable.
    pub async fn new_page(&self) -> Result<Page> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::SessionClosed);
        }

        let guard = self.inner.lock().await;
        let inner = guard.as_ref().ok_or(Error::SessionClosed)?;

        let page = inner.browser.new_page("about:blank").await.map_err(|e| {
            tracing::warn!("failed to create page: {}", e);
            Error::SessionClosed
        })?;

        tracing::debug!("page created");

        Ok(Page::new(
            page,
            Arc::clone(&self.closed),
            self.config.browser.navigation_timeout,
            self.config.browser.settle_delay,
            self.config.capture.clone(),
        ))
    }

    /// Whether the session is still running.
    pub fn is_running(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    /// Terminate the browser process and release all pages.
    ///
    /// Attempts a graceful close, kills the process if it does not exit
    /// within the shutdown grace period, and stops the event-handler task.
    /// Idempotent: calling it again returns `Ok(())`.
    pub async fn close(&self) -> Result<()> {
        let mut guard = self.inner.lock().await;
        self.closed.store(true, Ordering::SeqCst);

        let Some(mut inner) = guard.take() else {
            return Ok(());
        };

        if let Err(e) = inner.browser.close().await {
            tracing::warn!("graceful browser close failed: {}", e);
        }

        match tokio::time::timeout(SHUTDOWN_GRACE, inner.browser.wait()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::debug!("browser wait failed: {}", e),
            Err(_) => {
                tracing::warn!("browser did not exit within {:?}, killing", SHUTDOWN_GRACE);
                let _ = inner.browser.kill().await;
            }
        }

        inner.handler.abort();
        tracing::info!("browser session closed");

        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            // Close was never called; stop the handler and leave process
            // teardown to the driver.
            if let Ok(mut guard) = self.inner.try_lock() {
                if let Some(inner) = guard.take() {
                    inner.handler.abort();
                    tracing::warn!("session dropped without close");
                }
            }
        }
    }
}

/// Fresh profile directory for a session without an explicit override.
fn default_profile_dir() -> PathBuf {
    let seq = SESSION_SEQ.fetch_add(1, Ordering::Relaxed);
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pagesnap")
        .join(format!("session-{}-{}", std::process::id(), seq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_dirs_are_unique() {
        let a = default_profile_dir();
        let b = default_profile_dir();
        assert_ne!(a, b);
        assert!(a.to_string_lossy().contains("pagesnap"));
    }
}
