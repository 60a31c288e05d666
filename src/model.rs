//! # Catalog Schema
//!
//! Entities of the product catalog, their typed identifiers, and the write-side inputs the
//! admin path accepts.
//!
//! ## Storage Model
//!
//! ```text
//! Category ──┬── Category (parent, nested-set numbered by name)
//!            └── Product ──┬── ProductLine ──┬── ProductImage (ordered per line)
//!                          │   (ordered)     └── AttributeValue (one per Attribute)
//!                          └── AttributeValue
//! ProductType ──┬── ProductType (parent)
//!               └── Attribute ── AttributeValue
//! ```
//!
//! Persisted rows (`Category`, `ProductLine`, ...) always carry their id and any value the
//! write path computes.  Inputs (`NewCategory`, `NewProductLine`, ...) are what the admin path
//! hands to a [`CatalogStore`](crate::CatalogStore); an input may leave its order unset.

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_derive::Ordered;

/// Sequential position of a row among its siblings.
pub type Order = i32;

/// Image reference stored when none is supplied.
pub const DEFAULT_IMAGE: &str = "test.jpg";

//////////////////////////////////////////////// Ids ///////////////////////////////////////////////////

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw row id.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw row id.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifies a [`Category`].
    CategoryId
);
id_type!(
    /// Identifies a [`Product`].
    ProductId
);
id_type!(
    /// Identifies a [`ProductType`].
    ProductTypeId
);
id_type!(
    /// Identifies an [`Attribute`].
    AttributeId
);
id_type!(
    /// Identifies an [`AttributeValue`].
    AttributeValueId
);
id_type!(
    /// Identifies a [`ProductLine`].
    ProductLineId
);
id_type!(
    /// Identifies a [`ProductImage`].
    ProductImageId
);

///////////////////////////////////////////// Category /////////////////////////////////////////////

/// A node in the category forest.
///
/// `tree_id`, `lft`, `rght` and `level` are the nested-set numbering maintained by the write
/// path: siblings are ordered by name and every descendant's bounds lie strictly inside its
/// ancestor's bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Row id.
    pub id: CategoryId,
    /// Display name; unique among categories.
    pub name: String,
    /// URL key.
    pub slug: String,
    /// Whether reads show the row.
    pub is_active: bool,
    /// Parent row; `None` for a root.
    pub parent_id: Option<CategoryId>,
    /// Index of the root's tree, by root name.
    pub tree_id: i32,
    /// Left nested-set bound.
    pub lft: i32,
    /// Right nested-set bound.
    pub rght: i32,
    /// Depth below the root.
    pub level: i32,
}

/// Input for creating or replacing a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    /// Display name; unique among categories.
    pub name: String,
    /// URL key.
    pub slug: String,
    /// Whether reads show the row; hidden by default.
    #[serde(default)]
    pub is_active: bool,
    /// Parent row; `None` for a root.
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

////////////////////////////////////////////// Product /////////////////////////////////////////////

/// A sellable item filed under a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Row id.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL key.
    pub slug: String,
    /// Product identifier, unique across the catalog.
    pub pid: String,
    /// Free text.
    pub description: String,
    /// Whether the product is delivered without shipping.
    pub is_digital: bool,
    /// Whether reads show the row.
    pub is_active: bool,
    /// Category the product is filed under.
    pub category_id: CategoryId,
    /// Product type.
    pub product_type_id: ProductTypeId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Display name.
    pub name: String,
    /// URL key.
    pub slug: String,
    /// Product identifier, unique across the catalog.
    pub pid: String,
    /// Free text.
    #[serde(default)]
    pub description: String,
    /// Whether the product is delivered without shipping.
    #[serde(default)]
    pub is_digital: bool,
    /// Whether reads show the row; hidden by default.
    #[serde(default)]
    pub is_active: bool,
    /// Category the product is filed under.
    pub category_id: CategoryId,
    /// Product type.
    pub product_type_id: ProductTypeId,
}

//////////////////////////////////////////// ProductType ///////////////////////////////////////////

/// A kind of product; types form a forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductType {
    /// Row id.
    pub id: ProductTypeId,
    /// Display name.
    pub name: String,
    /// Parent type; `None` for a root.
    pub parent_id: Option<ProductTypeId>,
}

/// Input for creating or replacing a product type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProductType {
    /// Display name.
    pub name: String,
    /// Parent type; `None` for a root.
    #[serde(default)]
    pub parent_id: Option<ProductTypeId>,
}

///////////////////////////////////////////// Attribute ////////////////////////////////////////////

/// An attribute axis such as Color or Size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attribute {
    /// Row id.
    pub id: AttributeId,
    /// Axis name, used as the key in product documents.
    pub name: String,
    /// Free text.
    pub description: String,
}

/// Input for creating an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttribute {
    /// Axis name, used as the key in product documents.
    pub name: String,
    /// Free text.
    #[serde(default)]
    pub description: String,
}

/// One value on an attribute axis, e.g. Red on Color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttributeValue {
    /// Row id.
    pub id: AttributeValueId,
    /// The value text.
    pub attribute_value: String,
    /// Attribute axis.
    pub attribute_id: AttributeId,
}

/// Input for creating an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttributeValue {
    /// The value text.
    pub attribute_value: String,
    /// Attribute axis.
    pub attribute_id: AttributeId,
}

/// An attribute value together with the attribute it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAttributeValue {
    /// The value.
    pub value: AttributeValue,
    /// Its axis.
    pub attribute: Attribute,
}

//////////////////////////////////////////// ProductLine ///////////////////////////////////////////

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductLine {
    /// Row id.
    pub id: ProductLineId,
    /// Unit price with at most two decimal places.
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    /// Stock keeping unit.
    pub sku: String,
    /// Units in stock.
    pub stock_qty: i32,
    /// Whether reads show the row.
    pub is_active: bool,
    /// Position among the rows sharing the parent.
    pub order: Order,
    /// Shipping weight.
    pub weight: f64,
    /// Owning product.
    pub product_id: ProductId,
    /// Product type of this line.
    pub product_type_id: ProductTypeId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for a product line; an unset `order` is assigned on first save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Ordered)]
#[ordered(unique_for = "product_id")]
pub struct NewProductLine {
    /// Unit price with at most two decimal places.
    pub price: Decimal,
    /// Stock keeping unit.
    pub sku: String,
    /// Units in stock.
    pub stock_qty: i32,
    /// Whether reads show the row; hidden by default.
    #[serde(default)]
    pub is_active: bool,
    /// Explicit position; the next free one when unset.
    #[serde(default)]
    pub order: Option<Order>,
    /// Shipping weight.
    pub weight: f64,
    /// Owning product.
    pub product_id: ProductId,
    /// Product type of this line.
    pub product_type_id: ProductTypeId,
}

/////////////////////////////////////////// ProductImage ///////////////////////////////////////////

/// An image of a product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductImage {
    /// Row id.
    pub id: ProductImageId,
    /// Alternative text.
    pub alternative_text: String,
    /// Media reference.
    pub url: String,
    /// Position among the rows sharing the parent.
    pub order: Order,
    /// Owning product line.
    pub product_line_id: ProductLineId,
}

/// Input for a product image; an unset `order` is assigned on first save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Ordered)]
#[ordered(unique_for = "product_line_id")]
pub struct NewProductImage {
    /// Alternative text.
    pub alternative_text: String,
    /// Media reference; a placeholder image when omitted.
    #[serde(default = "default_image")]
    pub url: String,
    /// Explicit position; the next free one when unset.
    #[serde(default)]
    pub order: Option<Order>,
    /// Owning product line.
    pub product_line_id: ProductLineId,
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}

/////////////////////////////////////////////// Joins //////////////////////////////////////////////

/// Edge between a product and one of its attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductAttributeValue {
    /// Owning product.
    pub product_id: ProductId,
    /// Attached attribute value.
    pub attribute_value_id: AttributeValueId,
}

/// Edge between a product line and one of its attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductLineAttributeValue {
    /// Owning product line.
    pub product_line_id: ProductLineId,
    /// Attached attribute value.
    pub attribute_value_id: AttributeValueId,
}

/// Edge between a product type and one of its attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductTypeAttribute {
    /// Product type.
    pub product_type_id: ProductTypeId,
    /// Attribute axis.
    pub attribute_id: AttributeId,
}

/// Request body for attaching an attribute value to a product or product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachAttributeValue {
    /// Attached attribute value.
    pub attribute_value_id: AttributeValueId,
}

/// Request body for attaching an attribute to a product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachAttribute {
    /// Attribute axis.
    pub attribute_id: AttributeId,
}

/////////////////////////////////////////////// Graphs /////////////////////////////////////////////

/// A product line with its images and attribute values, eagerly loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductLineGraph {
    /// The line.
    pub line: ProductLine,
    /// Images by order.
    pub images: Vec<ProductImage>,
    /// Attached values with their attributes.
    pub attribute_values: Vec<ResolvedAttributeValue>,
}

/// A product with everything the product document renders, eagerly loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductGraph {
    /// The product.
    pub product: Product,
    /// Attached values with their attributes.
    pub attribute_values: Vec<ResolvedAttributeValue>,
    /// Active lines by order.
    pub lines: Vec<ProductLineGraph>,
}

/// A product line with only its images.
#[derive(Debug, Clone, PartialEq)]
pub struct LineImages {
    /// The line.
    pub line: ProductLine,
    /// Images by order.
    pub images: Vec<ProductImage>,
}

/// A product with what the category listing renders, eagerly loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryProductGraph {
    /// The product.
    pub product: Product,
    /// Active lines by order.
    pub lines: Vec<LineImages>,
}
