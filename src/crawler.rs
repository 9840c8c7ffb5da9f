use anyhow::Result;
use tracing::info;

use crate::extract::{
    extract_catalogs, extract_products, CATALOG_CONTAINER, CATALOG_ITEM, PRODUCT_CONTAINER,
    PRODUCT_ROW,
};
use crate::models::{Catalog, Product};
use crate::page::{wait_for_visible, Page};
use crate::scroll::infinite_scroll;
use crate::session::{BrowserLauncher, Session};

/// The storefront being crawled and the URLs derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storefront {
    /// Scheme and host, no trailing slash
    pub base_url: String,
    /// Store handle, e.g. `angymalu`
    pub handle: String,
    /// Id of the catalog listing page
    pub listing: String,
}

impl Default for Storefront {
    fn default() -> Self {
        Self {
            base_url: "https://quicksell.co".to_string(),
            handle: "angymalu".to_string(),
            listing: "y3a".to_string(),
        }
    }
}

impl Storefront {
    pub fn catalogs_url(&self) -> String {
        format!("{}/w/{}/{}", self.base_url, self.handle, self.listing)
    }

    pub fn products_url(&self, slug: &str, id: &str) -> String {
        format!("{}/s/{}/{}/{}", self.base_url, self.handle, slug, id)
    }
}

/// Load the listing page, scroll until every catalog card is rendered and
/// extract them. One browser per call, closed on every path.
pub async fn get_catalogs<L: BrowserLauncher>(
    launcher: &L,
    storefront: &Storefront,
) -> Result<Vec<Catalog>> {
    let url = storefront.catalogs_url();
    info!("🌐 Fetching catalogs from {}", url);

    let session = Session::open(launcher)?;
    let catalogs = {
        let page = session.new_page()?;
        load(&page, &url, CATALOG_CONTAINER, CATALOG_ITEM).await?;
        extract_catalogs(&page)?
    };
    session.close()?;

    info!("✅ {} catalogs from {}", catalogs.len(), url);
    Ok(catalogs)
}

/// Load one catalog page and extract the products still mounted in its
/// virtualized list after scrolling.
pub async fn get_products<L: BrowserLauncher>(
    launcher: &L,
    storefront: &Storefront,
    slug: &str,
    id: &str,
) -> Result<Vec<Product>> {
    let url = storefront.products_url(slug, id);
    info!("🌐 Fetching products from {}", url);

    let session = Session::open(launcher)?;
    let products = {
        let page = session.new_page()?;
        load(&page, &url, PRODUCT_CONTAINER, PRODUCT_ROW).await?;
        extract_products(&page)?
    };
    session.close()?;

    info!("✅ {} products from {}", products.len(), url);
    Ok(products)
}

/// Navigate, wait for the container and scroll its items into the DOM
async fn load<P: Page>(page: &P, url: &str, container: &str, items: &str) -> Result<()> {
    page.navigate(url)?;
    wait_for_visible(page, container).await?;
    infinite_scroll(page, items).await
}
