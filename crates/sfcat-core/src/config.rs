use crate::app_config::{AppConfig, Browser};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        parse_flag(&raw).ok_or_else(|| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected true/false, got \"{raw}\""),
        })
    };

    let webdriver_url = or_default("SFCAT_WEBDRIVER_URL", "http://localhost:4444");
    url::Url::parse(&webdriver_url).map_err(|e| ConfigError::InvalidEnvVar {
        var: "SFCAT_WEBDRIVER_URL".to_string(),
        reason: e.to_string(),
    })?;

    let browser = parse_browser(&or_default("SFCAT_BROWSER", "edge"))?;
    let headless = parse_bool("SFCAT_HEADLESS", "true")?;
    let log_level = or_default("SFCAT_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("SFCAT_CATALOG_PATH", "./config/catalog.yaml"));
    let output_path = PathBuf::from(or_default(
        "SFCAT_OUTPUT_PATH",
        "./output/scraped_data.xlsx",
    ));
    let user_agent = lookup("SFCAT_USER_AGENT")
        .ok()
        .filter(|ua| !ua.trim().is_empty());

    let click_timeout_secs = parse_u64("SFCAT_CLICK_TIMEOUT_SECS", "10")?;
    let variant_settle_ms = parse_u64("SFCAT_VARIANT_SETTLE_MS", "2000")?;
    let product_settle_ms = parse_u64("SFCAT_PRODUCT_SETTLE_MS", "3000")?;
    let popup_timeout_secs = parse_u64("SFCAT_POPUP_TIMEOUT_SECS", "5")?;
    let scroll_secs = parse_u64("SFCAT_SCROLL_SECS", "5")?;

    Ok(AppConfig {
        webdriver_url,
        browser,
        headless,
        log_level,
        catalog_path,
        output_path,
        user_agent,
        click_timeout_secs,
        variant_settle_ms,
        product_settle_ms,
        popup_timeout_secs,
        scroll_secs,
    })
}

/// Parse `SFCAT_BROWSER` into a [`Browser`].
fn parse_browser(s: &str) -> Result<Browser, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "chrome" | "chromium" => Ok(Browser::Chrome),
        "edge" | "msedge" => Ok(Browser::Edge),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SFCAT_BROWSER".to_string(),
            reason: format!("unknown browser \"{other}\"; expected chrome or edge"),
        }),
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
