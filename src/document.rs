//! Response documents of the read API.
//!
//! Everything here is a pure transform over graphs the store already loaded; nothing in this
//! module touches a [`CatalogStore`](crate::CatalogStore).  Attribute values are collapsed into
//! flat maps: keyed by attribute id on a product line (`specification`) and by attribute name on
//! a product (`attribute`).  When two values share a key the later one wins.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    AttributeId, Category, CategoryProductGraph, Order, ProductGraph, ProductImage,
    ProductLineGraph, ResolvedAttributeValue,
};

/// Default prefix joined to image references.
pub const DEFAULT_MEDIA_URL: &str = "/media/";

/// `GET /categories` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDocument {
    /// Category name.
    pub category: String,
    /// URL key.
    pub slug: String,
}

/// An image inside a product line document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImageDocument {
    /// Alternative text.
    pub alternative_text: String,
    /// Media prefix joined to the stored reference.
    pub url: String,
    /// Position among siblings.
    pub order: Order,
}

/// A product line inside a product document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLineDocument {
    /// Two decimal places, serialized as a string.
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    /// Stock keeping unit.
    pub sku: String,
    /// Units in stock.
    pub stock_qty: i32,
    /// Position among siblings.
    pub order: Order,
    /// Images by order.
    pub product_image: Vec<ProductImageDocument>,
    /// Attribute id to value.
    pub specification: BTreeMap<AttributeId, String>,
}

/// `GET /products/{slug}` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDocument {
    /// Product name.
    pub name: String,
    /// URL key.
    pub slug: String,
    /// Product identifier, unique across the catalog.
    pub pid: String,
    /// Free text.
    pub description: String,
    /// Active lines by order.
    pub product_line: Vec<ProductLineDocument>,
    /// Attribute name to value.
    pub attribute: BTreeMap<String, String>,
}

/// `GET /products/category/{slug}` entry.
///
/// `price` and `image` come from the product's first line and are absent when it has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategoryDocument {
    /// Product name.
    pub name: String,
    /// URL key.
    pub slug: String,
    /// Product identifier, unique across the catalog.
    pub pid: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Price of the first line.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::str_option"
    )]
    pub price: Option<Decimal>,
    /// Images of the first line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<ProductImageDocument>>,
}

/// Joins the media prefix and an image reference with exactly one `/` between them.
pub fn media_path(media_url: &str, reference: &str) -> String {
    if media_url.is_empty() {
        return reference.to_string();
    }
    format!(
        "{}/{}",
        media_url.trim_end_matches('/'),
        reference.trim_start_matches('/')
    )
}

/// Renders a `GET /categories` entry.
pub fn category_document(category: &Category) -> CategoryDocument {
    CategoryDocument {
        category: category.name.clone(),
        slug: category.slug.clone(),
    }
}

/// Renders an image with its url under `media_url`.
pub fn image_document(image: &ProductImage, media_url: &str) -> ProductImageDocument {
    ProductImageDocument {
        alternative_text: image.alternative_text.clone(),
        url: media_path(media_url, &image.url),
        order: image.order,
    }
}

fn image_documents(images: &[ProductImage], media_url: &str) -> Vec<ProductImageDocument> {
    images
        .iter()
        .map(|image| image_document(image, media_url))
        .collect()
}

/// Collapses resolved values into a map, later entries overwriting earlier ones.
fn flatten<K: Ord>(
    values: &[ResolvedAttributeValue],
    key: impl Fn(&ResolvedAttributeValue) -> K,
) -> BTreeMap<K, String> {
    values
        .iter()
        .map(|resolved| (key(resolved), resolved.value.attribute_value.clone()))
        .collect()
}

/// Renders a line with its images and specification.
pub fn product_line_document(graph: &ProductLineGraph, media_url: &str) -> ProductLineDocument {
    ProductLineDocument {
        price: graph.line.price,
        sku: graph.line.sku.clone(),
        stock_qty: graph.line.stock_qty,
        order: graph.line.order,
        product_image: image_documents(&graph.images, media_url),
        specification: flatten(&graph.attribute_values, |resolved| resolved.attribute.id),
    }
}

/// Renders a full product with its lines and attributes.
pub fn product_document(graph: &ProductGraph, media_url: &str) -> ProductDocument {
    ProductDocument {
        name: graph.product.name.clone(),
        slug: graph.product.slug.clone(),
        pid: graph.product.pid.clone(),
        description: graph.product.description.clone(),
        product_line: graph
            .lines
            .iter()
            .map(|line| product_line_document(line, media_url))
            .collect(),
        attribute: flatten(&graph.attribute_values, |resolved| {
            resolved.attribute.name.clone()
        }),
    }
}

/// Renders a category listing entry from the product's first line.
pub fn product_category_document(
    graph: &CategoryProductGraph,
    media_url: &str,
) -> ProductCategoryDocument {
    let first = graph.lines.first();
    ProductCategoryDocument {
        name: graph.product.name.clone(),
        slug: graph.product.slug.clone(),
        pid: graph.product.pid.clone(),
        created_at: graph.product.created_at,
        price: first.map(|line| line.line.price),
        image: first.map(|line| image_documents(&line.images, media_url)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        Attribute, AttributeValue, AttributeValueId, CategoryId, LineImages, Product, ProductId,
        ProductImageId, ProductLine, ProductLineId, ProductTypeId,
    };

    fn product() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Boot".to_string(),
            slug: "boot".to_string(),
            pid: "P1".to_string(),
            description: "Warm".to_string(),
            is_digital: false,
            is_active: true,
            category_id: CategoryId::new(1),
            product_type_id: ProductTypeId::new(1),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn line(id: i64, price: Decimal) -> ProductLine {
        ProductLine {
            id: ProductLineId::new(id),
            price,
            sku: format!("SKU-{}", id),
            stock_qty: 4,
            is_active: true,
            order: id as Order,
            weight: 1.0,
            product_id: ProductId::new(1),
            product_type_id: ProductTypeId::new(1),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn image(id: i64, line: i64, url: &str) -> ProductImage {
        ProductImage {
            id: ProductImageId::new(id),
            alternative_text: "alt".to_string(),
            url: url.to_string(),
            order: id as Order,
            product_line_id: ProductLineId::new(line),
        }
    }

    fn resolved(attribute: i64, name: &str, value: i64, text: &str) -> ResolvedAttributeValue {
        ResolvedAttributeValue {
            value: AttributeValue {
                id: AttributeValueId::new(value),
                attribute_value: text.to_string(),
                attribute_id: AttributeId::new(attribute),
            },
            attribute: Attribute {
                id: AttributeId::new(attribute),
                name: name.to_string(),
                description: String::new(),
            },
        }
    }

    #[test]
    fn category_document_renames_name() {
        let category = Category {
            id: CategoryId::new(3),
            name: "Shoes".to_string(),
            slug: "shoes".to_string(),
            is_active: true,
            parent_id: None,
            tree_id: 1,
            lft: 1,
            rght: 2,
            level: 0,
        };
        let json = serde_json::to_value(category_document(&category)).unwrap();
        assert_eq!(json, serde_json::json!({"category": "Shoes", "slug": "shoes"}));
    }

    #[test]
    fn media_paths() {
        assert_eq!(media_path("/media/", "a.jpg"), "/media/a.jpg");
        assert_eq!(media_path("/media", "/a.jpg"), "/media/a.jpg");
        assert_eq!(media_path("", "a.jpg"), "a.jpg");
    }

    #[test]
    fn product_document_flattens_attributes() {
        let graph = ProductGraph {
            product: product(),
            attribute_values: vec![
                resolved(1, "Color", 10, "Red"),
                resolved(2, "Size", 20, "Large"),
            ],
            lines: vec![ProductLineGraph {
                line: line(1, Decimal::new(1250, 2)),
                images: vec![image(1, 1, "a.jpg")],
                attribute_values: vec![
                    resolved(1, "Color", 10, "Red"),
                    resolved(1, "Color", 11, "Blue"),
                ],
            }],
        };
        let json = serde_json::to_value(product_document(&graph, DEFAULT_MEDIA_URL)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Boot",
                "slug": "boot",
                "pid": "P1",
                "description": "Warm",
                "product_line": [{
                    "price": "12.50",
                    "sku": "SKU-1",
                    "stock_qty": 4,
                    "order": 1,
                    "product_image": [
                        {"alternative_text": "alt", "url": "/media/a.jpg", "order": 1}
                    ],
                    "specification": {"1": "Blue"}
                }],
                "attribute": {"Color": "Red", "Size": "Large"}
            })
        );
    }

    #[test]
    fn category_listing_hoists_the_first_line() {
        let graph = CategoryProductGraph {
            product: product(),
            lines: vec![
                LineImages {
                    line: line(1, Decimal::new(1000, 2)),
                    images: vec![image(1, 1, "a.jpg"), image(2, 1, "b.jpg")],
                },
                LineImages {
                    line: line(2, Decimal::new(2000, 2)),
                    images: vec![image(3, 2, "c.jpg")],
                },
            ],
        };
        let json =
            serde_json::to_value(product_category_document(&graph, DEFAULT_MEDIA_URL)).unwrap();
        assert_eq!(json["price"], "10.00");
        assert_eq!(json["image"].as_array().unwrap().len(), 2);
        assert_eq!(json["image"][1]["url"], "/media/b.jpg");
        assert_eq!(json["created_at"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn category_listing_without_lines_omits_price_and_image() {
        let graph = CategoryProductGraph {
            product: product(),
            lines: vec![],
        };
        let json =
            serde_json::to_value(product_category_document(&graph, DEFAULT_MEDIA_URL)).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("price"));
        assert!(!object.contains_key("image"));
        assert_eq!(object.len(), 4);
    }
}
