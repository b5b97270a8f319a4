use std::path::PathBuf;

/// Which WebDriver-compatible browser the session targets.
///
/// Both are Chromium-based and accept the same command-line switches; only the
/// capability key carrying them differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Edge,
}

impl Browser {
    /// Capability key under which browser arguments are passed.
    #[must_use]
    pub fn options_key(self) -> &'static str {
        match self {
            Browser::Chrome => "goog:chromeOptions",
            Browser::Edge => "ms:edgeOptions",
        }
    }

    /// W3C `browserName` capability value.
    #[must_use]
    pub fn browser_name(self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Edge => "MicrosoftEdge",
        }
    }
}

impl std::fmt::Display for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Browser::Chrome => write!(f, "chrome"),
            Browser::Edge => write!(f, "edge"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub webdriver_url: String,
    pub browser: Browser,
    pub headless: bool,
    pub log_level: String,
    pub catalog_path: PathBuf,
    pub output_path: PathBuf,
    /// Fixed user agent; `None` picks one at random per session.
    pub user_agent: Option<String>,
    pub click_timeout_secs: u64,
    pub variant_settle_ms: u64,
    pub product_settle_ms: u64,
    pub popup_timeout_secs: u64,
    pub scroll_secs: u64,
}
