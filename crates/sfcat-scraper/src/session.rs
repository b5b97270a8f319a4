//! WebDriver-backed [`PageDriver`] over a single `fantoccini` session.

use std::time::Duration;

use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator as WdLocator};
use rand::seq::IndexedRandom;
use serde_json::{json, Map, Value};
use sfcat_core::AppConfig;

use crate::driver::{Locator, PageDriver};
use crate::error::ScraperError;

/// Poll interval while waiting for a located element to become clickable.
const CLICKABLE_POLL: Duration = Duration::from_millis(250);

pub(crate) const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Windows NT 10.0; WOW64; rv:51.0) Gecko/20100101 Firefox/51.0",
];

/// One live browser session. Dropping it without [`BrowserSession::close`]
/// leaves the browser window open on the WebDriver server.
pub struct BrowserSession {
    client: Client,
}

impl BrowserSession {
    /// Starts a session on the configured WebDriver server.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Session`] if the server is unreachable or
    /// rejects the capabilities.
    pub async fn connect(config: &AppConfig) -> Result<Self, ScraperError> {
        let user_agent = pick_user_agent(config);
        let caps = capabilities(config, &user_agent);
        tracing::info!(
            webdriver_url = %config.webdriver_url,
            browser = %config.browser,
            headless = config.headless,
            "starting browser session"
        );
        tracing::debug!(user_agent = %user_agent, "session user agent");
        let mut builder = ClientBuilder::native();
        builder.capabilities(caps);
        let client = builder.connect(&config.webdriver_url).await?;
        Ok(Self { client })
    }

    /// Ends the WebDriver session.
    ///
    /// # Errors
    ///
    /// Propagates the WebDriver error if the session could not be closed.
    pub async fn close(self) -> Result<(), ScraperError> {
        self.client.close().await?;
        Ok(())
    }

    async fn find_opt(&self, locator: Locator<'_>) -> Result<Option<Element>, ScraperError> {
        let xpath = locator.spec_row_xpath().unwrap_or_default();
        match self.client.find(wd_locator(locator, &xpath)).await {
            Ok(element) => Ok(Some(element)),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_all(&self, locator: Locator<'_>) -> Result<Vec<Element>, ScraperError> {
        let xpath = locator.spec_row_xpath().unwrap_or_default();
        Ok(self.client.find_all(wd_locator(locator, &xpath)).await?)
    }
}

fn wd_locator<'a>(locator: Locator<'a>, xpath: &'a str) -> WdLocator<'a> {
    match locator {
        Locator::Css(css) => WdLocator::Css(css),
        Locator::SpecRow(_) => WdLocator::XPath(xpath),
    }
}

fn pick_user_agent(config: &AppConfig) -> String {
    if let Some(ua) = &config.user_agent {
        return ua.clone();
    }
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
        .to_owned()
}

/// Capabilities for a Chromium-based browser with automation hints hidden.
pub(crate) fn capabilities(config: &AppConfig, user_agent: &str) -> Map<String, Value> {
    let mut args: Vec<String> = Vec::new();
    if config.headless {
        args.push("--headless=new".to_owned());
    }
    args.extend(
        [
            "--disable-gpu",
            "--no-sandbox",
            "--start-maximized",
            "--disable-blink-features=AutomationControlled",
            "--disable-infobars",
            "--disable-extensions",
            "--incognito",
        ]
        .map(str::to_owned),
    );
    args.push(format!("--user-agent={user_agent}"));

    let mut caps = Map::new();
    caps.insert(
        "browserName".to_owned(),
        json!(config.browser.browser_name()),
    );
    caps.insert(
        config.browser.options_key().to_owned(),
        json!({
            "args": args,
            "excludeSwitches": ["enable-automation"],
            "useAutomationExtension": false,
        }),
    );
    caps
}

impl PageDriver for BrowserSession {
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, ScraperError> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn text(&mut self, locator: Locator<'_>) -> Result<Option<String>, ScraperError> {
        match self.find_opt(locator).await? {
            Some(el) => Ok(Some(el.text().await?.trim().to_owned())),
            None => Ok(None),
        }
    }

    async fn attr(
        &mut self,
        locator: Locator<'_>,
        name: &str,
    ) -> Result<Option<String>, ScraperError> {
        match self.find_opt(locator).await? {
            Some(el) => Ok(el.attr(name).await?),
            None => Ok(None),
        }
    }

    async fn outer_html(&mut self, locator: Locator<'_>) -> Result<Option<String>, ScraperError> {
        match self.find_opt(locator).await? {
            Some(el) => Ok(Some(el.html(false).await?)),
            None => Ok(None),
        }
    }

    async fn child_text(
        &mut self,
        locator: Locator<'_>,
        child_css: &str,
    ) -> Result<Option<String>, ScraperError> {
        let Some(parent) = self.find_opt(locator).await? else {
            return Ok(None);
        };
        match parent.find(WdLocator::Css(child_css)).await {
            Ok(child) => Ok(Some(child.text().await?.trim().to_owned())),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn attr_all(
        &mut self,
        locator: Locator<'_>,
        name: &str,
    ) -> Result<Vec<Option<String>>, ScraperError> {
        let mut values = Vec::new();
        for el in self.find_all(locator).await? {
            values.push(el.attr(name).await?);
        }
        Ok(values)
    }

    async fn outer_html_all(&mut self, locator: Locator<'_>) -> Result<Vec<String>, ScraperError> {
        let mut html = Vec::new();
        for el in self.find_all(locator).await? {
            html.push(el.html(false).await?);
        }
        Ok(html)
    }

    async fn wait_for(
        &mut self,
        locator: Locator<'_>,
        timeout: Duration,
    ) -> Result<bool, ScraperError> {
        let xpath = locator.spec_row_xpath().unwrap_or_default();
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(wd_locator(locator, &xpath))
            .await
        {
            Ok(_) => Ok(true),
            Err(CmdError::WaitTimeout) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn click(&mut self, locator: Locator<'_>, timeout: Duration) -> Result<(), ScraperError> {
        let timed_out = || ScraperError::Timeout {
            what: locator.to_string(),
            secs: timeout.as_secs(),
        };
        let deadline = tokio::time::Instant::now() + timeout;
        let xpath = locator.spec_row_xpath().unwrap_or_default();
        let element = match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(wd_locator(locator, &xpath))
            .await
        {
            Ok(el) => el,
            Err(CmdError::WaitTimeout) => return Err(timed_out()),
            Err(e) => return Err(e.into()),
        };

        while !(element.is_displayed().await? && element.is_enabled().await?) {
            if tokio::time::Instant::now() >= deadline {
                return Err(timed_out());
            }
            tokio::time::sleep(CLICKABLE_POLL).await;
        }

        let handle = serde_json::to_value(&element)?;
        self.client
            .execute(
                "arguments[0].scrollIntoView({block: 'center'});",
                vec![handle],
            )
            .await?;
        element.click().await?;
        Ok(())
    }

    async fn execute(&mut self, script: &str) -> Result<Value, ScraperError> {
        Ok(self.client.execute(script, Vec::new()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfcat_core::Browser;
    use std::path::PathBuf;

    fn make_config(browser: Browser, headless: bool) -> AppConfig {
        AppConfig {
            webdriver_url: "http://localhost:4444".to_owned(),
            browser,
            headless,
            log_level: "info".to_owned(),
            catalog_path: PathBuf::from("./config/catalog.yaml"),
            output_path: PathBuf::from("./output/scraped_data.xlsx"),
            user_agent: None,
            click_timeout_secs: 10,
            variant_settle_ms: 2000,
            product_settle_ms: 3000,
            popup_timeout_secs: 5,
            scroll_secs: 5,
        }
    }

    fn args_of(caps: &Map<String, Value>, key: &str) -> Vec<String> {
        caps[key]["args"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_owned())
            .collect()
    }

    #[test]
    fn edge_capabilities_use_edge_options_key() {
        let caps = capabilities(&make_config(Browser::Edge, true), "UA");
        assert_eq!(caps["browserName"], "MicrosoftEdge");
        let args = args_of(&caps, "ms:edgeOptions");
        assert_eq!(args[0], "--headless=new");
        assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_owned()));
        assert_eq!(args.last().map(String::as_str), Some("--user-agent=UA"));
        assert_eq!(
            caps["ms:edgeOptions"]["excludeSwitches"],
            json!(["enable-automation"])
        );
        assert_eq!(caps["ms:edgeOptions"]["useAutomationExtension"], false);
    }

    #[test]
    fn chrome_capabilities_without_headless() {
        let caps = capabilities(&make_config(Browser::Chrome, false), "UA");
        assert_eq!(caps["browserName"], "chrome");
        assert!(caps.get("ms:edgeOptions").is_none());
        let args = args_of(&caps, "goog:chromeOptions");
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
        assert!(args.contains(&"--incognito".to_owned()));
    }

    #[test]
    fn configured_user_agent_wins() {
        let mut config = make_config(Browser::Edge, true);
        config.user_agent = Some("sfcat-test/1.0".to_owned());
        assert_eq!(pick_user_agent(&config), "sfcat-test/1.0");
    }

    #[test]
    fn random_user_agent_comes_from_builtin_list() {
        let ua = pick_user_agent(&make_config(Browser::Edge, true));
        assert!(USER_AGENTS.contains(&ua.as_str()));
    }
}
