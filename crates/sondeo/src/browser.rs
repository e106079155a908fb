//! Real browser control via the Chrome DevTools Protocol.
//!
//! Available behind the `browser` feature. Strategies are compiled to
//! JavaScript query expressions ([`Strategy::finder_js`]) and evaluated over
//! the live page; interactions are dispatched through the same compiled
//! expressions so the element clicked is the element that was probed.

use crate::config::SuiteConfig;
use crate::driver::{Driver, ElementHandle, Resolution};
use crate::result::{SondeoError, SondeoResult};
use crate::selector::Strategy;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::network::ClearBrowserCookiesParams;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Quiescence window for the settle poll (500ms)
const SETTLE_QUIET_MS: u64 = 500;

#[derive(Debug, Deserialize)]
struct ProbeEval {
    found: bool,
    text: String,
}

/// CDP-backed driver
pub struct BrowserDriver {
    base_url: String,
    browser: Arc<Mutex<CdpBrowser>>,
    page: Arc<Mutex<CdpPage>>,
    #[allow(dead_code)]
    handle: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for BrowserDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserDriver")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl BrowserDriver {
    /// Launch a browser and open one page against the configured origin.
    ///
    /// Each driver owns an isolated page; launch one driver per scenario
    /// context for cookie/storage isolation.
    pub async fn launch(config: &SuiteConfig) -> SondeoResult<Self> {
        let mut builder = CdpConfig::builder();
        if !config.headless {
            builder = builder.with_head();
        }
        builder = builder.no_sandbox();

        let cdp_config = builder
            .build()
            .map_err(|e| SondeoError::BrowserLaunch { message: e })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| SondeoError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SondeoError::BrowserLaunch {
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: config.base_url.clone(),
            browser: Arc::new(Mutex::new(browser)),
            page: Arc::new(Mutex::new(page)),
            handle,
        })
    }

    /// Capture a PNG screenshot of the current page, for triage artifacts
    /// next to a failing verdict's diagnostic.
    pub async fn screenshot(&self) -> SondeoResult<Vec<u8>> {
        let page = self.page.lock().await;
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let shot = page
            .execute(params)
            .await
            .map_err(|e| SondeoError::Evaluation {
                message: e.to_string(),
            })?;

        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| SondeoError::Evaluation {
                message: e.to_string(),
            })
    }

    /// Close the browser
    pub async fn close(self) -> SondeoResult<()> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| SondeoError::BrowserLaunch {
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn absolute(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else {
            format!("{}{path_or_url}", self.base_url)
        }
    }

    async fn eval<T: serde::de::DeserializeOwned + Unpin>(&self, expr: String) -> SondeoResult<T> {
        let page = self.page.lock().await;
        let result = page
            .evaluate(expr)
            .await
            .map_err(|e| SondeoError::Evaluation {
                message: e.to_string(),
            })?;
        result.into_value().map_err(|e| SondeoError::Evaluation {
            message: e.to_string(),
        })
    }

    /// Evaluate an interaction script that returns `true` when the target
    /// element was present and acted on.
    async fn interact(&self, strategy: &Strategy, body: &str) -> SondeoResult<()> {
        let finder = strategy.finder_js();
        let expr = format!("(() => {{ const el = {finder}; if (!el) return false; {body} return true; }})()");
        let acted: bool = self.eval(expr).await?;
        if acted {
            Ok(())
        } else {
            Err(SondeoError::Interaction {
                message: format!("element detached: {strategy}"),
            })
        }
    }
}

#[async_trait]
impl Driver for BrowserDriver {
    async fn goto(&self, path_or_url: &str) -> SondeoResult<()> {
        let url = self.absolute(path_or_url);
        let page = self.page.lock().await;
        page.goto(url.clone())
            .await
            .map_err(|e| SondeoError::Navigation {
                url,
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> SondeoResult<String> {
        let page = self.page.lock().await;
        let url = page.url().await.map_err(|e| SondeoError::Evaluation {
            message: e.to_string(),
        })?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn resolve(&self, strategy: &Strategy) -> SondeoResult<Resolution> {
        let finder = strategy.finder_js();
        let expr = format!(
            "(() => {{ const el = {finder}; \
             return el ? {{ found: true, text: (el.textContent || '').trim() }} \
                       : {{ found: false, text: '' }}; }})()"
        );
        let eval: ProbeEval = self.eval(expr).await?;
        if eval.found {
            let handle = ElementHandle::new(strategy.clone()).with_text(eval.text);
            Ok(Resolution::Found(handle))
        } else {
            Ok(Resolution::NotFound)
        }
    }

    async fn click(&self, handle: &ElementHandle) -> SondeoResult<()> {
        self.interact(
            &handle.strategy,
            "el.scrollIntoView({ block: 'center' }); el.click();",
        )
        .await
    }

    async fn fill(&self, handle: &ElementHandle, value: &str) -> SondeoResult<()> {
        // Native value setter plus input/change events, so framework-managed
        // inputs (React and friends) observe the change.
        let body = format!(
            "el.focus(); \
             const proto = el.tagName === 'TEXTAREA' \
                 ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
             const desc = Object.getOwnPropertyDescriptor(proto, 'value'); \
             if (desc && desc.set) {{ desc.set.call(el, {value:?}); }} else {{ el.value = {value:?}; }} \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));"
        );
        self.interact(&handle.strategy, &body).await
    }

    async fn press(&self, handle: &ElementHandle, key: &str) -> SondeoResult<()> {
        let body = format!(
            "el.focus(); \
             const opts = {{ key: {key:?}, bubbles: true, cancelable: true }}; \
             el.dispatchEvent(new KeyboardEvent('keydown', opts)); \
             el.dispatchEvent(new KeyboardEvent('keyup', opts)); \
             if ({key:?} === 'Enter' && el.form) {{ el.form.requestSubmit(); }}"
        );
        self.interact(&handle.strategy, &body).await
    }

    async fn wait_for_settle(&self, timeout: Duration) -> SondeoResult<()> {
        // Quiescence poll: the document must report `complete` across one
        // quiet window. Best-effort; returns Ok at the deadline regardless.
        let deadline = tokio::time::Instant::now() + timeout;
        let mut quiet_since: Option<tokio::time::Instant> = None;
        while tokio::time::Instant::now() < deadline {
            let complete: bool = match self
                .eval("document.readyState === 'complete'".to_string())
                .await
            {
                Ok(value) => value,
                // Evaluation can fail mid-navigation; that is activity.
                Err(err) => {
                    debug!(error = %err, "settle probe failed; still navigating");
                    false
                }
            };
            if complete {
                let since = quiet_since.get_or_insert_with(tokio::time::Instant::now);
                if since.elapsed() >= Duration::from_millis(SETTLE_QUIET_MS) {
                    return Ok(());
                }
            } else {
                quiet_since = None;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Ok(())
    }

    async fn clear_session(&self) -> SondeoResult<()> {
        let page = self.page.lock().await;
        page.execute(ClearBrowserCookiesParams::default())
            .await
            .map_err(|e| SondeoError::Evaluation {
                message: e.to_string(),
            })?;
        page.evaluate("localStorage.clear(); sessionStorage.clear(); true")
            .await
            .map_err(|e| SondeoError::Evaluation {
                message: e.to_string(),
            })?;
        Ok(())
    }
}
