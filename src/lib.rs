//! # pagesnap
//!
//! Headless Chromium page capture: launch a browser process, open a page,
//! navigate, write a screenshot to disk, and close the browser.
//!
//! The crate drives Chromium-family browsers over CDP via chromiumoxide and
//! owns exactly one flow: launch → page → navigate → capture → close, with
//! the browser process released on every exit path. Protocol work,
//! rendering, and image encoding stay with the browser.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pagesnap::quick_capture;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let result = quick_capture("https://example.com", "example.png").await?;
//!     println!("wrote {} bytes to {}", result.bytes, result.path.display());
//!     Ok(())
//! }
//! ```
//!
//! For control over the individual steps, use [`Session`] and [`Page`]
//! directly:
//!
//! ```rust,ignore
//! use pagesnap::{Config, Session};
//!
//! let config = Config::builder().no_sandbox().build();
//! let session = Session::launch(&config).await?;
//! let page = session.new_page().await?;
//! page.navigate("http://localhost:8080/").await?;
//! page.capture(std::path::Path::new("out.png")).await?;
//! session.close().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod browser;
pub mod config;
pub mod error;
pub mod page;
pub mod session;
pub mod snap;

pub use browser::{BrowserDetector, BrowserInstallation, BrowserType};
pub use config::{BrowserConfig, CaptureConfig, Config, ConfigBuilder, ImageFormat};
pub use error::{Error, Result};
pub use page::{CaptureResult, Page};
pub use session::Session;
pub use snap::{quick_capture, PageSnap, PageSnapBuilder};
