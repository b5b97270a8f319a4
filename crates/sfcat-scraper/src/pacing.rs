//! Human-like pacing between page loads.
//!
//! The storefront throttles and shows exit-intent popups to clients that move
//! too fast or never scroll. Every delay here is a plain sleep on the single
//! browser session; nothing runs concurrently.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use sfcat_core::AppConfig;

use crate::driver::{Locator, PageDriver};
use crate::error::ScraperError;
use crate::selectors;

/// Share of smooth-scroll steps that move down rather than back up.
const SCROLL_DOWN_PROBABILITY: f64 = 0.85;

const PAUSE_MS: RangeInclusive<u64> = 2_000..=5_000;
const SCROLL_STEP_PAUSE_MS: RangeInclusive<u64> = 200..=500;

#[derive(Debug, Clone)]
pub struct Pacing {
    pause_ms: RangeInclusive<u64>,
    popup_timeout: Duration,
    scroll_for: Duration,
    product_settle: Duration,
}

impl Pacing {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            pause_ms: PAUSE_MS,
            popup_timeout: Duration::from_secs(config.popup_timeout_secs),
            scroll_for: Duration::from_secs(config.scroll_secs),
            product_settle: Duration::from_millis(config.product_settle_ms),
        }
    }

    /// No sleeps and no scrolling; popup checks return immediately.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            pause_ms: 0..=0,
            popup_timeout: Duration::ZERO,
            scroll_for: Duration::ZERO,
            product_settle: Duration::ZERO,
        }
    }

    /// Sleeps for a random interval drawn from the pause range.
    pub async fn pause(&self) {
        let ms = rand::rng().random_range(self.pause_ms.clone());
        if ms > 0 {
            tracing::debug!(ms, "pausing");
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    /// Closes the exit-intent popup if it shows up within the popup timeout.
    ///
    /// # Errors
    ///
    /// Only a lost session is returned; any other failure leaves the popup
    /// open and is logged.
    pub async fn dismiss_popup<D: PageDriver>(&self, driver: &mut D) -> Result<(), ScraperError> {
        let locator = Locator::Css(selectors::POPUP_CLOSE);
        let outcome = match driver.wait_for(locator, self.popup_timeout).await {
            Ok(true) => driver.click(locator, self.popup_timeout).await,
            Ok(false) => return Ok(()),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => {
                tracing::debug!("dismissed popup");
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::debug!(error = %e, "popup could not be dismissed");
                Ok(())
            }
        }
    }

    /// Scrolls in small random steps, mostly downward, for the configured
    /// duration, then scrolls back up a little.
    ///
    /// # Errors
    ///
    /// Propagates driver failures from the scroll script.
    pub async fn smooth_scroll<D: PageDriver>(&self, driver: &mut D) -> Result<(), ScraperError> {
        if self.scroll_for.is_zero() {
            return Ok(());
        }
        let deadline = tokio::time::Instant::now() + self.scroll_for;
        let mut steps = 0u32;
        while tokio::time::Instant::now() < deadline {
            let (dy, pause_ms) = {
                let mut rng = rand::rng();
                let dy = if rng.random_bool(SCROLL_DOWN_PROBABILITY) {
                    rng.random_range(50i64..=200)
                } else {
                    -rng.random_range(30i64..=100)
                };
                (dy, rng.random_range(SCROLL_STEP_PAUSE_MS))
            };
            driver.execute(&format!("window.scrollBy(0, {dy});")).await?;
            steps += 1;
            tokio::time::sleep(Duration::from_millis(pause_ms)).await;
        }
        driver.execute("window.scrollBy(0, -300);").await?;
        tracing::debug!(steps, "smooth scroll finished");
        Ok(())
    }

    /// Lets a freshly loaded product page settle and nudges it so lazy
    /// content renders.
    ///
    /// # Errors
    ///
    /// Propagates driver failures from the scroll script.
    pub async fn before_product_read<D: PageDriver>(
        &self,
        driver: &mut D,
    ) -> Result<(), ScraperError> {
        if !self.product_settle.is_zero() {
            tokio::time::sleep(self.product_settle).await;
        }
        driver.execute("window.scrollBy(0, 100);").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fixture::FixtureDriver;

    const URL: &str = "https://floorscenter.com/collections/ottimo-tiles?page=1";

    #[tokio::test]
    async fn disabled_pacing_never_scrolls() {
        let mut driver = FixtureDriver::single(URL, "<div></div>");
        let pacing = Pacing::disabled();
        pacing.pause().await;
        pacing.smooth_scroll(&mut driver).await.unwrap();
        assert!(driver.scripts.is_empty());
    }

    #[tokio::test]
    async fn dismisses_popup_when_present() {
        let html = r#"<div class="exit-popup"><button class="exit-popup__close">x</button></div>"#;
        let mut driver = FixtureDriver::single(URL, html);
        Pacing::disabled().dismiss_popup(&mut driver).await.unwrap();
        assert_eq!(driver.clicks, vec![selectors::POPUP_CLOSE.to_owned()]);
    }

    #[tokio::test]
    async fn absent_popup_is_not_clicked() {
        let mut driver = FixtureDriver::single(URL, "<div></div>");
        Pacing::disabled().dismiss_popup(&mut driver).await.unwrap();
        assert!(driver.clicks.is_empty());
    }

    #[tokio::test]
    async fn product_read_nudges_page() {
        let mut driver = FixtureDriver::single(URL, "<div></div>");
        Pacing::disabled()
            .before_product_read(&mut driver)
            .await
            .unwrap();
        assert_eq!(driver.scripts, vec!["window.scrollBy(0, 100);".to_owned()]);
    }

    #[tokio::test]
    async fn smooth_scroll_ends_with_scroll_back() {
        let mut driver = FixtureDriver::single(URL, "<div></div>");
        let pacing = Pacing {
            scroll_for: Duration::from_millis(50),
            ..Pacing::disabled()
        };
        pacing.smooth_scroll(&mut driver).await.unwrap();
        assert!(driver.scripts.len() >= 2);
        assert_eq!(
            driver.scripts.last().map(String::as_str),
            Some("window.scrollBy(0, -300);")
        );
        assert!(driver.scripts[0].starts_with("window.scrollBy(0, "));
    }
}
