use fantoccini::error::{CmdError, ErrorStatus, NewSessionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("WebDriver command failed: {0}")]
    Driver(#[from] CmdError),

    #[error("could not start WebDriver session: {0}")]
    Session(#[from] NewSessionError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("required field \"{field}\" not found on {url}")]
    MissingField { field: &'static str, url: String },

    #[error("timed out after {secs}s waiting for {what}")]
    Timeout { what: String, secs: u64 },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
}

impl ScraperError {
    /// `true` when the browser session itself is gone and no further page can
    /// be processed: the WebDriver connection dropped, the browser crashed
    /// (invalid session id), or its window was closed. Everything else is
    /// scoped to the current product.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            ScraperError::Driver(CmdError::Lost(_)) | ScraperError::Session(_) => true,
            ScraperError::Driver(CmdError::Standard(e)) => matches!(
                e.error,
                ErrorStatus::InvalidSessionId | ErrorStatus::NoSuchWindow
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantoccini::error::WebDriver;

    #[test]
    fn lost_connection_is_fatal() {
        let err = ScraperError::Driver(CmdError::Lost(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        )));
        assert!(err.is_fatal());
    }

    #[test]
    fn crashed_browser_is_fatal() {
        for status in [ErrorStatus::InvalidSessionId, ErrorStatus::NoSuchWindow] {
            let err = ScraperError::Driver(CmdError::Standard(WebDriver::new(
                status,
                "session deleted because of page crash",
            )));
            assert!(err.is_fatal());
        }
    }

    #[test]
    fn missing_element_from_webdriver_is_product_scoped() {
        let err = ScraperError::Driver(CmdError::Standard(WebDriver::new(
            ErrorStatus::NoSuchElement,
            "no such element",
        )));
        assert!(!err.is_fatal());
    }

    #[test]
    fn field_and_timeout_errors_are_product_scoped() {
        let missing = ScraperError::MissingField {
            field: "title",
            url: "https://floorscenter.com/products/x".to_owned(),
        };
        let timeout = ScraperError::Timeout {
            what: "label[for='swatch-1']".to_owned(),
            secs: 10,
        };
        assert!(!missing.is_fatal());
        assert!(!timeout.is_fatal());
    }

    #[test]
    fn missing_field_message_names_field_and_url() {
        let err = ScraperError::MissingField {
            field: "vendor",
            url: "https://floorscenter.com/products/x".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("vendor"));
        assert!(msg.contains("/products/x"));
    }
}
