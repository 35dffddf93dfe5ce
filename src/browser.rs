//! Browser detection and resolution.
//!
//! Finds a Chromium-family binary to drive over CDP. Only Chromium-based
//! browsers are considered; Gecko and WebKit browsers speak a different
//! automation protocol and are out of scope here.
//!
//! Detection checks platform-specific install locations (including Snap and
//! Flatpak layouts on Linux) and falls back to probing `PATH`.

use std::path::{Path, PathBuf};

use crate::config::BrowserConfig;
use crate::error::{Error, Result};

/// Supported browser types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserType {
    /// Chromium open source browser.
    Chromium,
    /// Google Chrome.
    Chrome,
    /// Microsoft Edge.
    Edge,
    /// Brave browser.
    Brave,
}

impl BrowserType {
    /// Get the display name of the browser.
    pub fn name(&self) -> &'static str {
        match self {
            BrowserType::Chromium => "Chromium",
            BrowserType::Chrome => "Chrome",
            BrowserType::Edge => "Edge",
            BrowserType::Brave => "Brave",
        }
    }

    /// Binary names to probe on `PATH`, in preference order.
    pub fn binary_names(&self) -> &'static [&'static str] {
        match self {
            BrowserType::Chromium => &["chromium", "chromium-browser"],
            BrowserType::Chrome => &["google-chrome-stable", "google-chrome", "chrome"],
            BrowserType::Edge => &["microsoft-edge", "msedge"],
            BrowserType::Brave => &["brave-browser", "brave"],
        }
    }

    /// All supported browser types, in detection preference order.
    pub fn all() -> &'static [BrowserType] {
        &[
            BrowserType::Chromium,
            BrowserType::Chrome,
            BrowserType::Edge,
            BrowserType::Brave,
        ]
    }
}

impl std::fmt::Display for BrowserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for BrowserType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chromium" | "chromium-browser" => Ok(BrowserType::Chromium),
            "chrome" | "google-chrome" => Ok(BrowserType::Chrome),
            "edge" | "microsoft-edge" | "msedge" => Ok(BrowserType::Edge),
            "brave" | "brave-browser" => Ok(BrowserType::Brave),
            _ => Err(Error::Config(format!("Unknown browser type: {}", s))),
        }
    }
}

/// Detected browser installation.
#[derive(Debug, Clone)]
pub struct BrowserInstallation {
    /// Type of browser.
    pub browser_type: BrowserType,
    /// Path to executable.
    pub executable_path: PathBuf,
    /// Version string (if detectable).
    pub version: Option<String>,
}

impl BrowserInstallation {
    /// Check if this installation appears valid.
    pub fn is_valid(&self) -> bool {
        self.executable_path.exists()
    }
}

/// Browser detector for finding system-installed browsers.
pub struct BrowserDetector;

impl BrowserDetector {
    /// Detect all installed Chromium-family browsers, in preference order.
    pub fn detect_all() -> Vec<BrowserInstallation> {
        BrowserType::all()
            .iter()
            .filter_map(|t| Self::detect(*t))
            .collect()
    }

    /// Detect a browser of a specific type.
    pub fn detect(browser_type: BrowserType) -> Option<BrowserInstallation> {
        let executable = well_known_paths(browser_type)
            .into_iter()
            .find(|p| p.is_file())
            .or_else(|| find_in_path(browser_type.binary_names()))?;

        let version = Self::detect_version(&executable);
        Some(BrowserInstallation {
            browser_type,
            executable_path: executable,
            version,
        })
    }

    /// Get the preferred browser (Chromium > Chrome > Edge > Brave).
    pub fn preferred() -> Option<BrowserInstallation> {
        BrowserType::all().iter().find_map(|t| Self::detect(*t))
    }

    /// Resolve the browser to launch for a given configuration.
    ///
    /// An explicit `executable_path` override wins and must point at an
    /// existing file; otherwise detection runs.
    pub fn resolve(config: &BrowserConfig) -> Result<BrowserInstallation> {
        if let Some(ref path) = config.executable_path {
            if !path.is_file() {
                return Err(Error::BrowserNotFound(path.display().to_string()));
            }
            return Ok(BrowserInstallation {
                browser_type: classify_path(path),
                executable_path: path.clone(),
                version: Self::detect_version(path),
            });
        }

        Self::preferred().ok_or_else(|| {
            Error::BrowserNotFound(
                "no Chromium-family browser detected; install Chromium, Chrome, Edge, or Brave, \
                 or set an explicit executable path"
                    .into(),
            )
        })
    }

    /// Detect browser version from executable.
    fn detect_version(executable: &Path) -> Option<String> {
        std::process::Command::new(executable)
            .arg("--version")
            .output()
            .ok()
            .and_then(|output| {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
            })
    }
}

/// Classify an explicit executable override by its path.
fn classify_path(path: &Path) -> BrowserType {
    let path_str = path.to_string_lossy().to_lowercase();
    if path_str.contains("brave") {
        BrowserType::Brave
    } else if path_str.contains("edge") {
        BrowserType::Edge
    } else if path_str.contains("chromium") {
        BrowserType::Chromium
    } else {
        BrowserType::Chrome
    }
}

/// Well-known install locations for a browser type.
#[cfg(target_os = "linux")]
fn well_known_paths(browser_type: BrowserType) -> Vec<PathBuf> {
    let paths: &[&str] = match browser_type {
        BrowserType::Chromium => &[
            "/usr/bin/chromium-browser",
            "/usr/bin/chromium",
            "/snap/bin/chromium",
            "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
        ],
        BrowserType::Chrome => &[
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/opt/google/chrome/chrome",
            "/snap/bin/google-chrome",
            "/var/lib/flatpak/exports/bin/com.google.Chrome",
        ],
        BrowserType::Edge => &[
            "/usr/bin/microsoft-edge-stable",
            "/usr/bin/microsoft-edge",
            "/opt/microsoft/msedge/msedge",
        ],
        BrowserType::Brave => &[
            "/usr/bin/brave-browser",
            "/usr/bin/brave",
            "/opt/brave.com/brave/brave",
            "/snap/bin/brave",
            "/var/lib/flatpak/exports/bin/com.brave.Browser",
        ],
    };
    paths.iter().map(PathBuf::from).collect()
}

#[cfg(target_os = "macos")]
fn well_known_paths(browser_type: BrowserType) -> Vec<PathBuf> {
    let paths: &[&str] = match browser_type {
        BrowserType::Chromium => &["/Applications/Chromium.app/Contents/MacOS/Chromium"],
        BrowserType::Chrome => {
            &["/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"]
        }
        BrowserType::Edge => &["/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"],
        BrowserType::Brave => {
            &["/Applications/Brave Browser.app/Contents/MacOS/Brave Browser"]
        }
    };
    paths.iter().map(PathBuf::from).collect()
}

#[cfg(target_os = "windows")]
fn well_known_paths(browser_type: BrowserType) -> Vec<PathBuf> {
    let paths: &[&str] = match browser_type {
        BrowserType::Chromium => &[
            "C:\\Program Files\\Chromium\\Application\\chrome.exe",
            "C:\\Program Files (x86)\\Chromium\\Application\\chrome.exe",
        ],
        BrowserType::Chrome => &[
            "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe",
            "C:\\Program Files (x86)\\Google\\Chrome\\Application\\chrome.exe",
        ],
        BrowserType::Edge => &[
            "C:\\Program Files\\Microsoft\\Edge\\Application\\msedge.exe",
            "C:\\Program Files (x86)\\Microsoft\\Edge\\Application\\msedge.exe",
        ],
        BrowserType::Brave => &[
            "C:\\Program Files\\BraveSoftware\\Brave-Browser\\Application\\brave.exe",
            "C:\\Program Files (x86)\\BraveSoftware\\Brave-Browser\\Application\\brave.exe",
        ],
    };
    paths.iter().map(PathBuf::from).collect()
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn well_known_paths(_browser_type: BrowserType) -> Vec<PathBuf> {
    Vec::new()
}

/// Probe `PATH` for the first of the given binary names.
fn find_in_path(names: &[&str]) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        for name in names {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_browsers() {
        let browsers = BrowserDetector::detect_all();
        println!("Detected {} browsers:", browsers.len());
        for browser in &browsers {
            println!(
                "  - {} at {:?} (version: {})",
                browser.browser_type,
                browser.executable_path,
                browser.version.as_deref().unwrap_or("unknown")
            );
            assert!(browser.is_valid());
        }
    }

    #[test]
    fn test_browser_type_from_str() {
        assert_eq!(
            "chromium".parse::<BrowserType>().unwrap(),
            BrowserType::Chromium
        );
        assert_eq!(
            "chrome".parse::<BrowserType>().unwrap(),
            BrowserType::Chrome
        );
        assert_eq!(
            "google-chrome".parse::<BrowserType>().unwrap(),
            BrowserType::Chrome
        );
        assert_eq!("edge".parse::<BrowserType>().unwrap(), BrowserType::Edge);
        assert_eq!("msedge".parse::<BrowserType>().unwrap(), BrowserType::Edge);
        assert_eq!("brave".parse::<BrowserType>().unwrap(), BrowserType::Brave);
        assert!("firefox".parse::<BrowserType>().is_err());
    }

    #[test]
    fn test_binary_names_nonempty() {
        for browser_type in BrowserType::all() {
            assert!(!browser_type.binary_names().is_empty());
        }
    }

    #[test]
    fn test_classify_path() {
        assert_eq!(
            classify_path(Path::new("/usr/bin/chromium-browser")),
            BrowserType::Chromium
        );
        assert_eq!(
            classify_path(Path::new("/opt/brave.com/brave/brave")),
            BrowserType::Brave
        );
        assert_eq!(
            classify_path(Path::new("C:\\Program Files\\Microsoft\\Edge\\msedge.exe")),
            BrowserType::Edge
        );
        assert_eq!(
            classify_path(Path::new("/opt/google/chrome/chrome")),
            BrowserType::Chrome
        );
    }

    #[test]
    fn test_resolve_rejects_missing_override() {
        let config = BrowserConfig {
            executable_path: Some(PathBuf::from("/nonexistent/browser-binary")),
            ..Default::default()
        };
        match BrowserDetector::resolve(&config) {
            Err(Error::BrowserNotFound(path)) => {
                assert!(path.contains("/nonexistent/browser-binary"));
            }
            other => panic!("expected BrowserNotFound, got {:?}", other.map(|i| i.executable_path)),
        }
    }
}
