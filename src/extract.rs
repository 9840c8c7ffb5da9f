//! Catalog and product extraction from a stabilized page
//!
//! Every field is optional on the page. A missing child node or attribute
//! resolves to an empty string; only page/transport errors are returned.

use anyhow::Result;
use tracing::{debug, info};

use crate::models::{Catalog, Product};
use crate::page::{Field, Page, PageElement, SnapshotPage};

// ============================================================================
// Storefront selectors
// ============================================================================

pub const CATALOG_CONTAINER: &str = ".catalogue-list";
pub const CATALOG_ITEM: &str = ".catalogue-list a";
const CATALOG_TITLE: &str = ".catalogue-title-grid";
const CATALOG_PRODUCT_COUNT: &str = ".product-count";
const CATALOG_IMAGE: &str = "img";

/// Virtualized list; only a window of rows is mounted at any time
pub const PRODUCT_CONTAINER: &str = "div[data-test-id='virtuoso-item-list']";
pub const PRODUCT_ROW: &str = "div[data-test-id='virtuoso-item-list'] > div";
pub const PRODUCT_ITEM: &str =
    "div[data-test-id='virtuoso-item-list'] a[itemtype='https://schema.org/Product']";
const PRODUCT_PRICE: &str = ".price";
const PRODUCT_IMAGE: &str = r#"link[itemprop="image"]"#;

/// Resolve `field` on `node`, or on its first descendant matching `child`.
/// Absent child or absent value yields an empty string.
fn lookup<E: PageElement>(node: &E, child: Option<&str>, field: Field<'_>) -> Result<String> {
    Ok(node.resolve(child, field)?.unwrap_or_default())
}

/// Catalog slug: the fourth `/`-separated segment of its link
/// (`/s/<store>/<slug>/<id>`), or empty when the path is shorter.
pub fn slug_from_url(url: &str) -> String {
    url.split('/').nth(3).unwrap_or_default().to_string()
}

/// Extract every catalog card, in DOM order
pub fn extract_catalogs<P: Page>(page: &P) -> Result<Vec<Catalog>> {
    let nodes = page.query_all(CATALOG_ITEM)?;
    let mut catalogs = Vec::with_capacity(nodes.len());

    for node in &nodes {
        let title = lookup(node, Some(CATALOG_TITLE), Field::Text)?;
        let total_items = lookup(node, Some(CATALOG_PRODUCT_COUNT), Field::Text)?;
        let img_url = lookup(node, Some(CATALOG_IMAGE), Field::Attribute("src"))?;
        let url = lookup(node, None, Field::Attribute("href"))?;
        let slug = slug_from_url(&url);

        debug!("Catalog {:?} -> {}", title, url);
        catalogs.push(Catalog {
            title,
            img_url,
            total_items,
            url,
            slug,
        });
    }

    info!("📦 Extracted {} catalogs", catalogs.len());
    Ok(catalogs)
}

/// Extract the product anchors currently mounted in the virtualized list.
/// Rows recycled out of the DOM before this call are not captured.
pub fn extract_products<P: Page>(page: &P) -> Result<Vec<Product>> {
    let nodes = page.query_all(PRODUCT_ITEM)?;
    let mut products = Vec::with_capacity(nodes.len());

    for node in &nodes {
        let name = lookup(node, None, Field::Attribute("title"))?;
        let price = lookup(node, Some(PRODUCT_PRICE), Field::Text)?;
        let img_url = lookup(node, Some(PRODUCT_IMAGE), Field::Attribute("href"))?;
        let url = lookup(node, None, Field::Attribute("href"))?;

        debug!("Product {:?} ({:?})", name, price);
        products.push(Product {
            name,
            price,
            img_url,
            url,
        });
    }

    info!("🛍️ Extracted {} products", products.len());
    Ok(products)
}

/// Run the catalog extractor over a captured HTML document
pub fn catalogs_from_html(html: &str) -> Result<Vec<Catalog>> {
    extract_catalogs(&SnapshotPage::parse(html))
}

/// Run the product extractor over a captured HTML document
pub fn products_from_html(html: &str) -> Result<Vec<Product>> {
    extract_products(&SnapshotPage::parse(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_HTML: &str = r#"
        <html><body>
          <div class="catalogue-list">
            <a href="/s/angymalu/summer-collection/42">
              <img src="https://cdn.example.com/summer.jpg">
              <div class="catalogue-title-grid">Summer Collection</div>
              <div class="product-count">12 products</div>
            </a>
            <a href="/s/angymalu/winter-wear/43">
              <img src="https://cdn.example.com/winter.jpg">
              <div class="catalogue-title-grid">Winter Wear</div>
              <div class="product-count">8 products</div>
            </a>
            <a href="/s/angymalu/accessories/44">
              <img src="https://cdn.example.com/acc.jpg">
              <div class="catalogue-title-grid">Accessories</div>
              <div class="product-count">30 products</div>
            </a>
          </div>
        </body></html>
    "#;

    const PRODUCT_HTML: &str = r#"
        <html><body>
          <div data-test-id="virtuoso-item-list">
            <div>
              <a itemtype="https://schema.org/Product" title="Linen Shirt" href="/p/linen-shirt">
                <link itemprop="image" href="https://cdn.example.com/linen.jpg">
                <span class="price">₹ 1,499</span>
              </a>
            </div>
            <div>
              <a itemtype="https://schema.org/Product" title="Silk Scarf" href="/p/silk-scarf">
                <link itemprop="image" href="https://cdn.example.com/scarf.jpg">
              </a>
            </div>
            <div>
              <a href="/not-a-product">Banner</a>
            </div>
          </div>
          <a itemtype="https://schema.org/Product" title="Outside" href="/p/outside"></a>
        </body></html>
    "#;

    #[test]
    fn test_slug_from_url() {
        assert_eq!(slug_from_url("/s/angymalu/summer-collection/42"), "summer-collection");
        assert_eq!(slug_from_url("/s/angymalu/summer-collection"), "summer-collection");
        assert_eq!(slug_from_url("/short"), "");
        assert_eq!(slug_from_url(""), "");
    }

    #[test]
    fn test_extract_catalogs_in_dom_order() {
        let catalogs = catalogs_from_html(CATALOG_HTML).unwrap();

        assert_eq!(catalogs.len(), 3);
        assert_eq!(
            catalogs[0],
            Catalog {
                title: "Summer Collection".to_string(),
                img_url: "https://cdn.example.com/summer.jpg".to_string(),
                total_items: "12 products".to_string(),
                url: "/s/angymalu/summer-collection/42".to_string(),
                slug: "summer-collection".to_string(),
            }
        );
        let slugs: Vec<&str> = catalogs.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["summer-collection", "winter-wear", "accessories"]);
        assert!(catalogs.iter().all(|c| !c.title.is_empty()
            && !c.img_url.is_empty()
            && !c.total_items.is_empty()));
    }

    #[test]
    fn test_catalog_missing_children_default_to_empty() {
        let html = r#"
            <div class="catalogue-list">
              <a><span>bare</span></a>
              <a href="/short"><div class="catalogue-title-grid">Only Title</div></a>
            </div>
        "#;
        let catalogs = catalogs_from_html(html).unwrap();

        assert_eq!(catalogs.len(), 2);
        assert_eq!(catalogs[0], Catalog::default());
        assert_eq!(catalogs[1].title, "Only Title");
        assert_eq!(catalogs[1].url, "/short");
        assert_eq!(catalogs[1].slug, "");
        assert_eq!(catalogs[1].img_url, "");
        assert_eq!(catalogs[1].total_items, "");
    }

    #[test]
    fn test_catalog_text_is_not_trimmed() {
        let html = r#"<div class="catalogue-list"><a href="/a/b/c/d"><div class="catalogue-title-grid"> Padded </div></a></div>"#;
        let catalogs = catalogs_from_html(html).unwrap();
        assert_eq!(catalogs[0].title, " Padded ");
        assert_eq!(catalogs[0].slug, "c");
    }

    #[test]
    fn test_no_catalogs_is_empty_not_error() {
        let catalogs = catalogs_from_html("<div class='catalogue-list'></div>").unwrap();
        assert!(catalogs.is_empty());
    }

    #[test]
    fn test_extract_products_missing_price() {
        let products = products_from_html(PRODUCT_HTML).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(
            products[0],
            Product {
                name: "Linen Shirt".to_string(),
                price: "₹ 1,499".to_string(),
                img_url: "https://cdn.example.com/linen.jpg".to_string(),
                url: "/p/linen-shirt".to_string(),
            }
        );
        assert_eq!(products[1].name, "Silk Scarf");
        assert_eq!(products[1].price, "");
        assert_eq!(products[1].img_url, "https://cdn.example.com/scarf.jpg");
        assert_eq!(products[1].url, "/p/silk-scarf");
    }

    #[test]
    fn test_product_without_attributes() {
        let html = r#"
            <div data-test-id="virtuoso-item-list">
              <div><a itemtype="https://schema.org/Product"><span class="price">$5</span></a></div>
            </div>
        "#;
        let products = products_from_html(html).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, "$5");
        assert_eq!(products[0].name, "");
        assert_eq!(products[0].img_url, "");
        assert_eq!(products[0].url, "");
    }

    #[test]
    fn test_product_rows_selector_counts_direct_children() {
        let page = SnapshotPage::parse(PRODUCT_HTML);
        assert_eq!(page.count(PRODUCT_ROW).unwrap(), 3);
        assert!(page.is_visible(PRODUCT_CONTAINER).unwrap());
    }

    /// A recycled row: its children can no longer be handed out, but one
    /// atomic read of a field still answers
    struct RecycledRow {
        price: Option<&'static str>,
    }

    impl PageElement for RecycledRow {
        fn query(&self, selector: &str) -> Result<Option<Self>> {
            anyhow::bail!("Could not find node with given id ({})", selector)
        }

        fn attribute(&self, name: &str) -> Result<Option<String>> {
            Ok(Some(format!("{}-value", name)))
        }

        fn text(&self) -> Result<Option<String>> {
            Ok(None)
        }

        fn resolve(&self, child: Option<&str>, field: Field<'_>) -> Result<Option<String>> {
            match (child, field) {
                (Some(PRODUCT_PRICE), Field::Text) => Ok(self.price.map(str::to_string)),
                (Some(_), _) => Ok(None),
                (None, Field::Attribute(name)) => self.attribute(name),
                (None, Field::Text) => self.text(),
            }
        }
    }

    struct RecycledList(Vec<Option<&'static str>>);

    impl Page for RecycledList {
        type Element<'a> = RecycledRow;

        fn navigate(&self, _url: &str) -> Result<()> {
            Ok(())
        }

        fn is_visible(&self, _selector: &str) -> Result<bool> {
            Ok(true)
        }

        fn query_all(&self, _selector: &str) -> Result<Vec<RecycledRow>> {
            Ok(self.0.iter().map(|&price| RecycledRow { price }).collect())
        }

        fn evaluate(&self, _script: &str) -> Result<Option<serde_json::Value>> {
            Ok(None)
        }
    }

    #[test]
    fn test_fields_are_read_without_handing_out_child_nodes() {
        let page = RecycledList(vec![Some("$10"), None]);

        let products = extract_products(&page).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price, "$10");
        assert_eq!(products[0].name, "title-value");
        assert_eq!(products[1].price, "");
        assert_eq!(products[1].img_url, "");
        assert_eq!(products[1].url, "href-value");
    }
}
