//! Browser page capabilities
//!
//! The scroll driver and extractors only talk to a page through these two
//! traits:
//! - [`ChromePage`]: a live headless Chrome tab
//! - [`SnapshotPage`]: a captured DOM parsed with `scraper`

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde_json::Value;
use tokio::time::{sleep, Instant};

mod chrome;
mod snapshot;

pub use chrome::{ChromeElement, ChromePage};
pub use snapshot::{SnapshotElement, SnapshotPage};

pub const DEFAULT_VISIBLE_TIMEOUT: Duration = Duration::from_secs(30);
const VISIBLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A rendered page that can be navigated, queried and scripted
pub trait Page {
    type Element<'a>: PageElement
    where
        Self: 'a;

    /// Navigate and wait for the load to finish
    fn navigate(&self, url: &str) -> Result<()>;

    /// Whether `selector` currently matches a visible element
    fn is_visible(&self, selector: &str) -> Result<bool>;

    /// How long [`wait_for_visible`] keeps polling this page
    fn visible_timeout(&self) -> Duration {
        DEFAULT_VISIBLE_TIMEOUT
    }

    /// All elements matching `selector`, in DOM order
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Element<'_>>>;

    /// Number of elements matching `selector`
    fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.query_all(selector)?.len())
    }

    /// Run a script in the page and return its value, if any
    fn evaluate(&self, script: &str) -> Result<Option<Value>>;
}

/// What to read from an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    /// `textContent`
    Text,
    Attribute(&'a str),
}

/// A single DOM element handle
pub trait PageElement: Sized {
    /// First descendant matching `selector`, or `None`
    fn query(&self, selector: &str) -> Result<Option<Self>>;

    /// Attribute value, or `None` when the attribute is absent
    fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// The element's `textContent`
    fn text(&self) -> Result<Option<String>>;

    /// Read `field` from this element, or from its first descendant matching
    /// `child`. `None` when the child or the value is absent.
    fn resolve(&self, child: Option<&str>, field: Field<'_>) -> Result<Option<String>> {
        let read = |node: &Self| match field {
            Field::Text => node.text(),
            Field::Attribute(name) => node.attribute(name),
        };
        match child {
            Some(selector) => match self.query(selector)? {
                Some(found) => read(&found),
                None => Ok(None),
            },
            None => read(self),
        }
    }
}

/// Poll until `selector` is visible, without blocking the runtime.
/// Page errors end the wait immediately; running out of time is an error.
pub async fn wait_for_visible<P: Page>(page: &P, selector: &str) -> Result<()> {
    let timeout = page.visible_timeout();
    let deadline = Instant::now() + timeout;

    loop {
        if page.is_visible(selector)? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(anyhow!("{} did not become visible within {:?}", selector, timeout));
        }
        sleep(VISIBLE_POLL_INTERVAL).await;
    }
}
