use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use headless_chrome::browser::tab::element::Element;
use headless_chrome::protocol::cdp::DOM;
use headless_chrome::Tab;
use serde_json::Value;
use tracing::debug;

use super::{Field, Page, PageElement};

/// Read an optional field in one call, so a row recycled mid-read yields
/// `null` instead of a dangling node
const RESOLVE_FN: &str = r#"
    function(selector, name) {
        const el = selector === null ? this : this.querySelector(selector);
        if (el === null) return null;
        return name === null ? el.textContent : el.getAttribute(name);
    }
"#;

/// A live Chrome tab
pub struct ChromePage {
    tab: Arc<Tab>,
    visible_timeout: Duration,
}

impl ChromePage {
    pub fn new(tab: Arc<Tab>, visible_timeout: Duration) -> Self {
        Self { tab, visible_timeout }
    }
}

impl Page for ChromePage {
    type Element<'a> = ChromeElement<'a>;

    fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.tab
            .navigate_to(url)
            .with_context(|| format!("Failed to navigate to {}", url))?
            .wait_until_navigated()
            .with_context(|| format!("Navigation to {} never finished", url))?;
        Ok(())
    }

    fn is_visible(&self, selector: &str) -> Result<bool> {
        // Same notion of "visible" as Playwright: rendered box and not visibility:hidden
        let script = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                const style = window.getComputedStyle(el);
                if (style.visibility === 'hidden') return false;
                const rect = el.getBoundingClientRect();
                return rect.width > 0 && rect.height > 0;
            }})()
            "#,
            selector = js_string(selector)?
        );
        visible_from(self.evaluate(&script)?, selector)
    }

    fn visible_timeout(&self) -> Duration {
        self.visible_timeout
    }

    fn query_all(&self, selector: &str) -> Result<Vec<ChromeElement<'_>>> {
        let root = self.tab.get_document()?.node_id;
        let node_ids = self
            .tab
            .call_method(DOM::QuerySelectorAll {
                node_id: root,
                selector: selector.to_string(),
            })
            .with_context(|| format!("Failed to query {}", selector))?
            .node_ids;

        // A node detached between the query and its resolution is skipped
        let elements = node_ids
            .into_iter()
            .filter_map(|node_id| match Element::new(&self.tab, node_id) {
                Ok(element) => Some(ChromeElement(element)),
                Err(e) => {
                    debug!("Skipping detached {} node {}: {}", selector, node_id, e);
                    None
                }
            })
            .collect();
        Ok(elements)
    }

    fn count(&self, selector: &str) -> Result<usize> {
        let script = format!(
            "document.querySelectorAll({}).length",
            js_string(selector)?
        );
        count_from(self.evaluate(&script)?, selector)
    }

    fn evaluate(&self, script: &str) -> Result<Option<Value>> {
        let result = self.tab.evaluate(script, false)?;
        Ok(result.value)
    }
}

/// An element handle inside a [`ChromePage`]
pub struct ChromeElement<'a>(Element<'a>);

impl ChromeElement<'_> {
    fn call_for_string(&self, function: &str, args: Vec<Value>) -> Result<Option<String>> {
        let result = self.0.call_js_fn(function, args, false)?;
        Ok(result.value.and_then(|v| v.as_str().map(str::to_owned)))
    }
}

impl PageElement for ChromeElement<'_> {
    fn query(&self, selector: &str) -> Result<Option<Self>> {
        match self.0.find_element(selector) {
            Ok(child) => Ok(Some(ChromeElement(child))),
            Err(e) => {
                debug!("No {} under element: {}", selector, e);
                Ok(None)
            }
        }
    }

    fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.resolve(None, Field::Attribute(name))
    }

    fn text(&self) -> Result<Option<String>> {
        self.resolve(None, Field::Text)
    }

    fn resolve(&self, child: Option<&str>, field: Field<'_>) -> Result<Option<String>> {
        self.call_for_string(RESOLVE_FN, resolve_args(child, field))
    }
}

fn resolve_args(child: Option<&str>, field: Field<'_>) -> Vec<Value> {
    let name = match field {
        Field::Text => Value::Null,
        Field::Attribute(name) => Value::from(name),
    };
    vec![child.map(Value::from).unwrap_or(Value::Null), name]
}

/// A thrown script leaves no value; that is an error, not an empty list
fn count_from(value: Option<Value>, selector: &str) -> Result<usize> {
    value
        .as_ref()
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| anyhow!("Counting {} returned {:?}", selector, value))
}

fn visible_from(value: Option<Value>, selector: &str) -> Result<bool> {
    value
        .as_ref()
        .and_then(Value::as_bool)
        .ok_or_else(|| anyhow!("Visibility check for {} returned {:?}", selector, value))
}

/// Quote a value as a JavaScript string literal
fn js_string(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
