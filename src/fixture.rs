//! YAML seed data.
//!
//! A fixture names rows instead of numbering them: products point at their category by slug
//! and at their product type by name, attribute values are written as `{attribute, value}`
//! pairs.  [`apply_fixture`] resolves those references and creates every row through the
//! [`CatalogStore`] write operations, so orders are assigned and validation runs exactly as for
//! the admin API.
//!
//! ```yaml
//! attributes:
//!   - name: Color
//!     values: [Red, Blue]
//! product_types:
//!   - name: Footwear
//!     attributes: [Color]
//! categories:
//!   - name: Shoes
//!     slug: shoes
//!     is_active: true
//! products:
//!   - name: Boot
//!     slug: boot
//!     pid: P1
//!     category: shoes
//!     product_type: Footwear
//!     is_active: true
//!     lines:
//!       - price: "12.50"
//!         sku: BOOT-RED
//!         stock_qty: 3
//!         is_active: true
//!         attribute_values:
//!           - { attribute: Color, value: Red }
//!         images:
//!           - alternative_text: front
//!             url: boot-front.jpg
//! ```

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    AttributeId, AttributeValueId, CatalogStore, CategoryId, DEFAULT_IMAGE, NewAttribute,
    NewAttributeValue, NewCategory, NewProduct, NewProductImage, NewProductLine, NewProductType,
    Order, ProductTypeId, StoreError,
};

//////////////////////////////////////////// FixtureError ////////////////////////////////////////////

/// Errors loading or applying a fixture.
#[derive(Debug)]
pub enum FixtureError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The document is not a valid fixture.
    Parse(serde_yml::Error),
    /// A name, slug or attribute value doesn't refer to anything defined earlier.
    UnknownReference {
        /// What kind of row was referred to.
        kind: &'static str,
        /// The unresolved name.
        name: String,
    },
    /// The store rejected a row.
    Store(StoreError),
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "cannot read fixture: {}", err),
            Self::Parse(err) => write!(f, "invalid fixture: {}", err),
            Self::UnknownReference { kind, name } => write!(f, "unknown {} '{}'", kind, name),
            Self::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FixtureError {}

impl From<std::io::Error> for FixtureError {
    fn from(err: std::io::Error) -> Self {
        FixtureError::Io(err)
    }
}

impl From<serde_yml::Error> for FixtureError {
    fn from(err: serde_yml::Error) -> Self {
        FixtureError::Parse(err)
    }
}

impl From<StoreError> for FixtureError {
    fn from(err: StoreError) -> Self {
        FixtureError::Store(err)
    }
}

////////////////////////////////////////////// Document //////////////////////////////////////////////

/// A YAML seed document.  Rows refer to each other by name, slug or pid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    /// Attribute axes with their values.
    #[serde(default)]
    pub attributes: Vec<AttributeFixture>,
    /// Product types, parents first.
    #[serde(default)]
    pub product_types: Vec<ProductTypeFixture>,
    /// Categories, parents first.
    #[serde(default)]
    pub categories: Vec<CategoryFixture>,
    /// Products with their lines and images.
    #[serde(default)]
    pub products: Vec<ProductFixture>,
}

/// An attribute axis and its values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeFixture {
    /// Display name.
    pub name: String,
    /// Free text.
    #[serde(default)]
    pub description: String,
    /// Values created on this axis.
    #[serde(default)]
    pub values: Vec<String>,
}

/// A product type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductTypeFixture {
    /// Display name.
    pub name: String,
    /// Name of a product type listed earlier.
    #[serde(default)]
    pub parent: Option<String>,
    /// Attribute names.
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// A category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryFixture {
    /// Display name.
    pub name: String,
    /// URL key.
    pub slug: String,
    /// Whether reads show the row.
    #[serde(default)]
    pub is_active: bool,
    /// Slug of a category listed earlier.
    #[serde(default)]
    pub parent: Option<String>,
}

/// One value on one attribute axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueRef {
    /// Attribute name.
    pub attribute: String,
    /// Value on that attribute.
    pub value: String,
}

/// A product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductFixture {
    /// Display name.
    pub name: String,
    /// URL key.
    pub slug: String,
    /// Product identifier, unique across the catalog.
    pub pid: String,
    /// Free text.
    #[serde(default)]
    pub description: String,
    /// Whether the product ships.
    #[serde(default)]
    pub is_digital: bool,
    /// Whether reads show the row.
    #[serde(default)]
    pub is_active: bool,
    /// Category slug.
    pub category: String,
    /// Product type name.
    pub product_type: String,
    /// Values attached to the product.
    #[serde(default)]
    pub attribute_values: Vec<ValueRef>,
    /// Lines, saved in listed order.
    #[serde(default)]
    pub lines: Vec<LineFixture>,
}

/// A product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineFixture {
    /// Unit price.
    pub price: Decimal,
    /// Stock keeping unit.
    pub sku: String,
    /// Units in stock.
    pub stock_qty: i32,
    /// Whether reads show the row.
    #[serde(default)]
    pub is_active: bool,
    /// Explicit order; the next free one when unset.
    #[serde(default)]
    pub order: Option<Order>,
    /// Shipping weight.
    #[serde(default)]
    pub weight: f64,
    /// Product type name; the product's when unset.
    #[serde(default)]
    pub product_type: Option<String>,
    /// Values attached to the line, at most one per attribute.
    #[serde(default)]
    pub attribute_values: Vec<ValueRef>,
    /// Images, saved in listed order.
    #[serde(default)]
    pub images: Vec<ImageFixture>,
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageFixture {
    /// Alternative text.
    pub alternative_text: String,
    /// Stored reference; the default image when unset.
    #[serde(default)]
    pub url: Option<String>,
    /// Explicit order; the next free one when unset.
    #[serde(default)]
    pub order: Option<Order>,
}

impl Fixture {
    /// Parses a fixture document.
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Reads and parses a fixture file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }
}

/// Number of rows created by [`apply_fixture`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSummary {
    /// Attributes created.
    pub attributes: usize,
    /// Attribute values created.
    pub attribute_values: usize,
    /// Product types created.
    pub product_types: usize,
    /// Categories created.
    pub categories: usize,
    /// Products created.
    pub products: usize,
    /// Product lines created.
    pub product_lines: usize,
    /// Product images created.
    pub product_images: usize,
}

/////////////////////////////////////////////// Apply ////////////////////////////////////////////////

#[derive(Default)]
struct Names {
    attributes: HashMap<String, AttributeId>,
    values: HashMap<(String, String), AttributeValueId>,
    product_types: HashMap<String, ProductTypeId>,
    categories: HashMap<String, CategoryId>,
}

fn lookup<K, V>(map: &HashMap<K, V>, key: &K, kind: &'static str, name: impl Into<String>) -> Result<V, FixtureError>
where
    K: std::hash::Hash + Eq,
    V: Copy,
{
    map.get(key).copied().ok_or_else(|| FixtureError::UnknownReference {
        kind,
        name: name.into(),
    })
}

impl Names {
    fn attribute(&self, name: &str) -> Result<AttributeId, FixtureError> {
        lookup(&self.attributes, &name.to_string(), "attribute", name)
    }

    fn value(&self, value: &ValueRef) -> Result<AttributeValueId, FixtureError> {
        lookup(
            &self.values,
            &(value.attribute.clone(), value.value.clone()),
            "attribute value",
            format!("{}={}", value.attribute, value.value),
        )
    }

    fn product_type(&self, name: &str) -> Result<ProductTypeId, FixtureError> {
        lookup(&self.product_types, &name.to_string(), "product type", name)
    }

    fn category(&self, slug: &str) -> Result<CategoryId, FixtureError> {
        lookup(&self.categories, &slug.to_string(), "category", slug)
    }
}

/// Creates every row of `fixture` in `store`.
///
/// Sections are applied in dependency order: attributes, product types, categories, products.
/// Within a section a row may only refer to rows listed before it.  The first failure stops the
/// run; rows created before it stay.
pub async fn apply_fixture<S: CatalogStore>(
    store: &S,
    fixture: &Fixture,
) -> Result<FixtureSummary, FixtureError> {
    let mut names = Names::default();
    let mut summary = FixtureSummary::default();

    for attribute in &fixture.attributes {
        let row = store
            .create_attribute(NewAttribute {
                name: attribute.name.clone(),
                description: attribute.description.clone(),
            })
            .await?;
        names.attributes.insert(row.name.clone(), row.id);
        summary.attributes += 1;
        for value in &attribute.values {
            let value_row = store
                .create_attribute_value(NewAttributeValue {
                    attribute_value: value.clone(),
                    attribute_id: row.id,
                })
                .await?;
            names
                .values
                .insert((row.name.clone(), value.clone()), value_row.id);
            summary.attribute_values += 1;
        }
    }

    for product_type in &fixture.product_types {
        let parent_id = match &product_type.parent {
            Some(parent) => Some(names.product_type(parent)?),
            None => None,
        };
        let row = store
            .create_product_type(NewProductType {
                name: product_type.name.clone(),
                parent_id,
            })
            .await?;
        for attribute in &product_type.attributes {
            store
                .attach_product_type_attribute(row.id, names.attribute(attribute)?)
                .await?;
        }
        names.product_types.insert(row.name, row.id);
        summary.product_types += 1;
    }

    for category in &fixture.categories {
        let parent_id = match &category.parent {
            Some(parent) => Some(names.category(parent)?),
            None => None,
        };
        let row = store
            .create_category(NewCategory {
                name: category.name.clone(),
                slug: category.slug.clone(),
                is_active: category.is_active,
                parent_id,
            })
            .await?;
        names.categories.insert(row.slug, row.id);
        summary.categories += 1;
    }

    for product in &fixture.products {
        let product_type_id = names.product_type(&product.product_type)?;
        let row = store
            .create_product(NewProduct {
                name: product.name.clone(),
                slug: product.slug.clone(),
                pid: product.pid.clone(),
                description: product.description.clone(),
                is_digital: product.is_digital,
                is_active: product.is_active,
                category_id: names.category(&product.category)?,
                product_type_id,
            })
            .await?;
        summary.products += 1;
        for value in &product.attribute_values {
            store
                .attach_product_attribute_value(row.id, names.value(value)?)
                .await?;
        }

        for line in &product.lines {
            let line_type = match &line.product_type {
                Some(name) => names.product_type(name)?,
                None => product_type_id,
            };
            let line_row = store
                .create_product_line(NewProductLine {
                    price: line.price,
                    sku: line.sku.clone(),
                    stock_qty: line.stock_qty,
                    is_active: line.is_active,
                    order: line.order,
                    weight: line.weight,
                    product_id: row.id,
                    product_type_id: line_type,
                })
                .await?;
            summary.product_lines += 1;
            for value in &line.attribute_values {
                store
                    .attach_line_attribute_value(line_row.id, names.value(value)?)
                    .await?;
            }
            for image in &line.images {
                store
                    .create_product_image(NewProductImage {
                        alternative_text: image.alternative_text.clone(),
                        url: image
                            .url
                            .clone()
                            .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
                        order: image.order,
                        product_line_id: line_row.id,
                    })
                    .await?;
                summary.product_images += 1;
            }
        }
    }

    info!(
        categories = summary.categories,
        products = summary.products,
        product_lines = summary.product_lines,
        "fixture applied"
    );
    Ok(summary)
}
