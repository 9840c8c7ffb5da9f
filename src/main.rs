mod api;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use storefront_crawler::config::CONFIG;

#[derive(OpenApi)]
#[openapi(
    paths(api::list_catalogs, api::list_products),
    components(schemas(storefront_crawler::Catalog, storefront_crawler::Product)),
    tags((name = "storefront", description = "Storefront catalog and product listings"))
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = &*CONFIG;
    info!("Storefront: {}", config.storefront.catalogs_url());

    let state = Arc::new(api::AppState {
        launcher: config.chrome.clone(),
        storefront: config.storefront.clone(),
    });

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/catalogs", get(api::list_catalogs))
        .route("/catalogs/:slug/:id/products", get(api::list_products))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
