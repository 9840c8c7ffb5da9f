pub mod config;
pub mod crawler;
pub mod extract;
pub mod models;
pub mod page;
pub mod scroll;
pub mod session;

pub use crawler::{get_catalogs, get_products, Storefront};
pub use models::{Catalog, Product};
