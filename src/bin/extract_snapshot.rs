//! Run the extractors over a saved page without a browser.
//!
//! Usage: extract_snapshot <catalogs|products> <page.html>

use anyhow::{bail, Context, Result};

use storefront_crawler::extract::{catalogs_from_html, products_from_html};

fn main() -> Result<()> {
    // stdout carries the JSON
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (kind, path) = match args.as_slice() {
        [kind, path] => (kind.as_str(), path.as_str()),
        _ => bail!("usage: extract_snapshot <catalogs|products> <page.html>"),
    };

    let html = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;

    let json = match kind {
        "catalogs" => serde_json::to_string_pretty(&catalogs_from_html(&html)?)?,
        "products" => serde_json::to_string_pretty(&products_from_html(&html)?)?,
        other => bail!("unknown listing kind {:?}, expected catalogs or products", other),
    };
    println!("{}", json);

    Ok(())
}
