//! Configuration for the launch-and-capture flow.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for pagesnap.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Browser process configuration.
    pub browser: BrowserConfig,
    /// Screenshot capture settings.
    pub capture: CaptureConfig,
}

/// Browser process configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode.
    pub headless: bool,
    /// Path to browser executable (auto-detect if None).
    pub executable_path: Option<PathBuf>,
    /// User data directory (a fresh per-session directory if None).
    pub user_data_dir: Option<PathBuf>,
    /// Viewport width.
    pub window_width: u32,
    /// Viewport height.
    pub window_height: u32,
    /// Additional process arguments, passed verbatim.
    pub args: Vec<String>,
    /// Time allowed for the browser process to initialize.
    #[serde(with = "humantime_serde")]
    pub launch_timeout: Duration,
    /// Time allowed for a navigation to reach the load event.
    #[serde(with = "humantime_serde")]
    pub navigation_timeout: Duration,
    /// Pause after load before the page counts as renderable.
    #[serde(with = "humantime_serde")]
    pub settle_delay: Duration,
    /// Sandbox mode (disable for containers).
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable_path: None,
            user_data_dir: None,
            window_width: 1280,
            window_height: 800,
            args: vec![
                "--disable-gpu".into(),
                "--disable-dev-shm-usage".into(),
                "--no-first-run".into(),
            ],
            launch_timeout: Duration::from_secs(30),
            navigation_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(500),
            sandbox: true,
        }
    }
}

/// Image format for captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless PNG (default).
    #[default]
    Png,
    /// JPEG with optional quality.
    Jpeg,
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageFormat::Png => write!(f, "png"),
            ImageFormat::Jpeg => write!(f, "jpeg"),
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            _ => Err(crate::Error::Config(format!("Unknown image format: {}", s))),
        }
    }
}

/// Screenshot capture settings.
///
/// Encoding itself is the browser's concern; these map directly onto the
/// capture request sent over CDP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Output image format.
    pub format: ImageFormat,
    /// JPEG quality, 0-100. Ignored for PNG.
    pub quality: Option<u8>,
    /// Capture the full scrollable page instead of the viewport.
    pub full_page: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            quality: None,
            full_page: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Create a builder for configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set headless mode.
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.browser.headless = headless;
        self
    }

    /// Set browser executable path.
    pub fn executable_path(mut self, path: PathBuf) -> Self {
        self.config.browser.executable_path = Some(path);
        self
    }

    /// Set user data directory.
    pub fn user_data_dir(mut self, path: PathBuf) -> Self {
        self.config.browser.user_data_dir = Some(path);
        self
    }

    /// Set viewport dimensions.
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.config.browser.window_width = width;
        self.config.browser.window_height = height;
        self
    }

    /// Append a process argument, passed verbatim.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.config.browser.args.push(arg.into());
        self
    }

    /// Disable sandbox (for containers).
    pub fn no_sandbox(mut self) -> Self {
        self.config.browser.sandbox = false;
        self
    }

    /// Set launch timeout.
    pub fn launch_timeout(mut self, timeout: Duration) -> Self {
        self.config.browser.launch_timeout = timeout;
        self
    }

    /// Set navigation timeout.
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.config.browser.navigation_timeout = timeout;
        self
    }

    /// Set the post-load settle delay.
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.browser.settle_delay = delay;
        self
    }

    /// Set the capture image format.
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.config.capture.format = format;
        self
    }

    /// Set JPEG quality (0-100).
    pub fn quality(mut self, quality: u8) -> Self {
        self.config.capture.quality = Some(quality);
        self
    }

    /// Capture the full scrollable page.
    pub fn full_page(mut self, full_page: bool) -> Self {
        self.config.capture.full_page = full_page;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.browser.headless);
        assert!(config.browser.executable_path.is_none());
        assert!(config.browser.sandbox);
        assert_eq!(config.browser.window_width, 1280);
        assert_eq!(config.capture.format, ImageFormat::Png);
        assert!(!config.capture.full_page);
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .headless(false)
            .executable_path(PathBuf::from("/usr/bin/chromium"))
            .window_size(800, 600)
            .arg("--disable-extensions")
            .no_sandbox()
            .navigation_timeout(Duration::from_secs(10))
            .format(ImageFormat::Jpeg)
            .quality(85)
            .full_page(true)
            .build();

        assert!(!config.browser.headless);
        assert_eq!(
            config.browser.executable_path.as_deref(),
            Some(std::path::Path::new("/usr/bin/chromium"))
        );
        assert_eq!(config.browser.window_width, 800);
        assert!(config
            .browser
            .args
            .contains(&"--disable-extensions".to_string()));
        assert!(!config.browser.sandbox);
        assert_eq!(config.browser.navigation_timeout, Duration::from_secs(10));
        assert_eq!(config.capture.format, ImageFormat::Jpeg);
        assert_eq!(config.capture.quality, Some(85));
        assert!(config.capture.full_page);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::builder()
            .window_size(1024, 768)
            .settle_delay(Duration::from_millis(250))
            .format(ImageFormat::Jpeg)
            .quality(90)
            .build();

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();

        assert_eq!(parsed.browser.window_width, 1024);
        assert_eq!(parsed.browser.window_height, 768);
        assert_eq!(parsed.browser.settle_delay, Duration::from_millis(250));
        assert_eq!(parsed.capture.format, ImageFormat::Jpeg);
        assert_eq!(parsed.capture.quality, Some(90));
    }

    #[test]
    fn test_image_format_from_str() {
        assert_eq!("png".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!("jpeg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!("jpg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!("JPG".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert!("webp".parse::<ImageFormat>().is_err());
    }
}
