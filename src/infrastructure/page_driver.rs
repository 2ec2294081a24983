//! Page driver - infrastructure layer
//!
//! Holds the page handle and exposes primitive capabilities: evaluate JS,
//! find elements, click, type, inject file paths. It knows nothing about
//! destinations or upload flows.

use crate::error::AppResult;
use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::{Element, Page};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::debug;

/// Primitive operations over one remote page.
pub struct PageDriver {
    page: Page,
}

impl PageDriver {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Evaluate JS and return the JSON result.
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// Evaluate JS and deserialize the result.
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// Current page URL, if the page answers.
    pub async fn current_url(&self) -> Option<String> {
        self.page.url().await.ok().flatten()
    }

    /// Probe for an element. "Not found" is an expected answer, not an
    /// error, so this swallows lookup failures.
    pub async fn find(&self, selector: &str) -> Option<Element> {
        self.page.find_element(selector).await.ok()
    }

    /// Probe for the first visible element among several selectors.
    pub async fn find_any(&self, selectors: &[&str]) -> Option<Element> {
        for selector in selectors {
            if let Some(el) = self.find(selector).await {
                return Some(el);
            }
        }
        None
    }

    /// Whether the visible page text contains a marker string.
    pub async fn body_contains(&self, marker: &str) -> bool {
        let js = format!(
            "document.body ? document.body.innerText.includes({}) : false",
            js_string(marker)
        );
        self.eval_as::<bool>(js).await.unwrap_or(false)
    }

    /// Scroll an element into the viewport, then click it.
    pub async fn scroll_click(&self, el: &Element) -> Result<()> {
        el.scroll_into_view().await?;
        el.click().await?;
        Ok(())
    }

    /// Click the element if the selector currently matches. Returns whether
    /// a click happened.
    pub async fn click_if_present(&self, selector: &str) -> bool {
        match self.find(selector).await {
            Some(el) => self.scroll_click(&el).await.is_ok(),
            None => false,
        }
    }

    /// Reset a field's value through JS, then type the text into it.
    ///
    /// Typing into a pre-filled control appends; destinations pre-fill the
    /// title from the file name, so the reset matters.
    pub async fn clear_and_type(&self, selector: &str, text: &str) -> Result<()> {
        let js = format!(
            "(() => {{ const el = document.querySelector({}); if (el) el.value = ''; }})()",
            js_string(selector)
        );
        self.eval(js).await?;

        let el = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| anyhow::anyhow!("field '{}' not found: {}", selector, e))?;
        el.click().await?;
        el.type_str(text).await?;
        debug!("filled '{}' ({} chars)", selector, text.len());
        Ok(())
    }

    /// Inject a local file path into a file-selection control.
    pub async fn set_file_input(&self, el: &Element, path: &Path) -> AppResult<()> {
        let params = SetFileInputFilesParams::builder()
            .file(path.display().to_string())
            .backend_node_id(el.backend_node_id.clone())
            .build()
            .map_err(crate::error::AppError::Other)?;
        self.page.execute(params).await?;
        debug!("injected file {}", path.display());
        Ok(())
    }
}

/// Quote a string as a JS literal.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}
