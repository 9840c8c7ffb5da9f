use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::error;

use storefront_crawler::crawler::{self, Storefront};
use storefront_crawler::models::{Catalog, Product};
use storefront_crawler::session::ChromeLauncher;

pub struct AppState {
    pub launcher: ChromeLauncher,
    pub storefront: Storefront,
}

type ApiError = (StatusCode, String);

/// The storefront is upstream of us; its failures surface as 502
fn upstream_error(e: anyhow::Error) -> ApiError {
    error!("❌ Crawl failed: {:#}", e);
    (StatusCode::BAD_GATEWAY, format!("{:#}", e))
}

/// List every catalog on the storefront
#[utoipa::path(
    get,
    path = "/catalogs",
    tag = "storefront",
    responses(
        (status = 200, description = "Catalogs in page order", body = [Catalog]),
        (status = 502, description = "Storefront unreachable or catalog list never rendered")
    )
)]
pub async fn list_catalogs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Catalog>>, ApiError> {
    crawler::get_catalogs(&state.launcher, &state.storefront)
        .await
        .map(Json)
        .map_err(upstream_error)
}

/// List the products of one catalog
#[utoipa::path(
    get,
    path = "/catalogs/{slug}/{id}/products",
    tag = "storefront",
    params(
        ("slug" = String, Path, description = "Catalog slug"),
        ("id" = String, Path, description = "Catalog id")
    ),
    responses(
        (status = 200, description = "Products mounted in the list after scrolling", body = [Product]),
        (status = 502, description = "Storefront unreachable or product list never rendered")
    )
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Json<Vec<Product>>, ApiError> {
    crawler::get_products(&state.launcher, &state.storefront, &slug, &id)
        .await
        .map(Json)
        .map_err(upstream_error)
}
