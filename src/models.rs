use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A catalog card from the storefront listing page
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub title: String,
    pub img_url: String,
    /// Human-readable count as rendered ("12 products"), not parsed
    pub total_items: String,
    /// Relative link to the catalog page
    pub url: String,
    pub slug: String,
}

/// A product row from a catalog page
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    /// Raw currency-formatted price text
    pub price: String,
    pub img_url: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_serializes_camel_case() {
        let catalog = Catalog {
            title: "Summer".to_string(),
            img_url: "https://cdn.example.com/a.jpg".to_string(),
            total_items: "12 products".to_string(),
            url: "/s/angymalu/summer/42".to_string(),
            slug: "summer".to_string(),
        };
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["imgUrl"], "https://cdn.example.com/a.jpg");
        assert_eq!(json["totalItems"], "12 products");
        assert!(json.get("img_url").is_none());
    }

    #[test]
    fn test_product_defaults_to_empty_fields() {
        let product = Product::default();
        assert!(product.name.is_empty());
        assert!(product.price.is_empty());
        assert!(product.img_url.is_empty());
        assert!(product.url.is_empty());
    }
}
