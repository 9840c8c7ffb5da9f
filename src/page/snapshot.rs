use std::time::Duration;

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use super::{Page, PageElement};

/// A captured DOM (e.g. `tab.get_content()` or a saved page).
/// Navigation and scripts are no-ops; the document never changes.
pub struct SnapshotPage {
    document: Html,
}

impl SnapshotPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }
}

impl Page for SnapshotPage {
    type Element<'a> = SnapshotElement<'a>;

    fn navigate(&self, _url: &str) -> Result<()> {
        Ok(())
    }

    /// Present means visible; there is no layout to check
    fn is_visible(&self, selector: &str) -> Result<bool> {
        let selector = parse_selector(selector)?;
        Ok(self.document.select(&selector).next().is_some())
    }

    /// The document never changes, so one check is enough
    fn visible_timeout(&self) -> Duration {
        Duration::ZERO
    }

    fn query_all(&self, selector: &str) -> Result<Vec<SnapshotElement<'_>>> {
        let selector = parse_selector(selector)?;
        Ok(self.document.select(&selector).map(SnapshotElement).collect())
    }

    fn evaluate(&self, _script: &str) -> Result<Option<Value>> {
        Ok(None)
    }
}

/// An element inside a [`SnapshotPage`]
#[derive(Clone, Copy)]
pub struct SnapshotElement<'a>(ElementRef<'a>);

impl PageElement for SnapshotElement<'_> {
    fn query(&self, selector: &str) -> Result<Option<Self>> {
        let selector = parse_selector(selector)?;
        Ok(self.0.select(&selector).next().map(SnapshotElement))
    }

    fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.0.value().attr(name).map(str::to_owned))
    }

    fn text(&self) -> Result<Option<String>> {
        Ok(Some(self.0.text().collect()))
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid selector {:?}: {:?}", selector, e))
}
