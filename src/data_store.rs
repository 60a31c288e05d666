//! # Catalog Storage Abstraction
//!
//! This module defines the `CatalogStore` trait, the single seam between the HTTP layers and
//! persistence, and `InMemoryCatalogStore`, a mutex-guarded implementation used by tests and by
//! `storefrontd` when no database is configured.  The PostgreSQL implementation lives in
//! [`crate::sql`].
//!
//! ## Write Path
//!
//! Every write operation follows the same sequence before anything is persisted:
//!
//! ```text
//! field checks (Validate) ─→ referenced rows exist ─→ assign order ─→ uniqueness checks ─→ write
//! ```
//!
//! A failure at any step returns an error and leaves the store untouched.
//!
//! ## Read Path
//!
//! Reads return eagerly loaded graphs (`ProductGraph`, `CategoryProductGraph`) holding only
//! active products and active product lines, with lines and images sorted by order.
//!
//! ## Usage Examples
//!
//! ```rust
//! # use storefront::{CatalogStore, InMemoryCatalogStore, NewCategory};
//! # tokio_test_block_on(async {
//! let store = InMemoryCatalogStore::new();
//! let category = store
//!     .create_category(NewCategory {
//!         name: "Shoes".to_string(),
//!         slug: "shoes".to_string(),
//!         is_active: true,
//!         parent_id: None,
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(category.lft, 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::ordering::assign_order;
use crate::tree::{TreeNode, creates_cycle, number_forest};
use crate::validate::{
    AttachOutcome, Validate, ValidationError, check_line_attribute, check_sibling_order,
    normalize_price,
};
use crate::{
    Attribute, AttributeId, AttributeValue, AttributeValueId, Category, CategoryId,
    CategoryProductGraph, LineImages, NewAttribute, NewAttributeValue, NewCategory, NewProduct,
    NewProductImage, NewProductLine, NewProductType, Product, ProductAttributeValue, ProductGraph,
    ProductId, ProductImage, ProductImageId, ProductLine, ProductLineGraph, ProductLineId,
    ProductType, ProductTypeAttribute, ProductTypeId, ResolvedAttributeValue, StoreError,
};

/// Result type for catalog store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage interface of the catalog.
///
/// Write operations validate before persisting and reject the whole write on any violation.
/// Read operations never fail because a slug is unknown; they return empty collections.
///
/// # Error Handling
///
/// - `NotFound`: the row being updated, or a row the write refers to, doesn't exist
/// - `AlreadyExists`: a unique key (category name/slug, product pid, join pair) is taken
/// - `Validation`: an invariant would break (duplicate order, duplicate attribute axis, ...)
/// - `Internal`: the backend failed
pub trait CatalogStore: Send + Sync + 'static {
    // Categories

    /// Creates a category and renumbers the category forest.
    fn create_category(
        &self,
        category: NewCategory,
    ) -> impl Future<Output = StoreResult<Category>> + Send;

    /// Replaces a category's fields and renumbers the category forest.
    ///
    /// # Returns
    /// * `Err(StoreError::Validation(ValidationError::ParentCycle))` - The new parent is the
    ///   category itself or one of its descendants
    fn update_category(
        &self,
        id: CategoryId,
        category: NewCategory,
    ) -> impl Future<Output = StoreResult<Category>> + Send;

    /// Lists active categories depth-first, siblings by name.
    fn list_active_categories(&self) -> impl Future<Output = StoreResult<Vec<Category>>> + Send;

    // Product types and attributes

    /// Creates a product type.  A parent, when given, must exist.
    fn create_product_type(
        &self,
        product_type: NewProductType,
    ) -> impl Future<Output = StoreResult<ProductType>> + Send;

    /// Replaces a product type.  Re-parenting below itself is a `ParentCycle`.
    fn update_product_type(
        &self,
        id: ProductTypeId,
        product_type: NewProductType,
    ) -> impl Future<Output = StoreResult<ProductType>> + Send;

    /// Declares that products of a type carry an attribute.
    fn attach_product_type_attribute(
        &self,
        product_type_id: ProductTypeId,
        attribute_id: AttributeId,
    ) -> impl Future<Output = StoreResult<ProductTypeAttribute>> + Send;

    /// Creates an attribute axis.
    fn create_attribute(
        &self,
        attribute: NewAttribute,
    ) -> impl Future<Output = StoreResult<Attribute>> + Send;

    /// Creates a value on an existing attribute axis.
    fn create_attribute_value(
        &self,
        value: NewAttributeValue,
    ) -> impl Future<Output = StoreResult<AttributeValue>> + Send;

    // Products

    /// Creates a product.  `pid` is unique; a taken one is `AlreadyExists`.
    fn create_product(
        &self,
        product: NewProduct,
    ) -> impl Future<Output = StoreResult<Product>> + Send;

    /// Replaces a product.
    fn update_product(
        &self,
        id: ProductId,
        product: NewProduct,
    ) -> impl Future<Output = StoreResult<Product>> + Send;

    /// Attaches an attribute value to a product.
    fn attach_product_attribute_value(
        &self,
        product_id: ProductId,
        attribute_value_id: AttributeValueId,
    ) -> impl Future<Output = StoreResult<ProductAttributeValue>> + Send;

    // Product lines

    /// Creates a product line, assigning the next order among the product's lines when the
    /// input has none.
    ///
    /// # Returns
    /// * `Ok(ProductLine)` - The persisted line, order filled in
    /// * `Err(StoreError::Validation(ValidationError::DuplicateOrder { .. }))` - Another line of
    ///   the same product holds the order
    /// * `Err(StoreError::NotFound)` - The product or product type doesn't exist
    fn create_product_line(
        &self,
        line: NewProductLine,
    ) -> impl Future<Output = StoreResult<ProductLine>> + Send;

    /// Replaces a product line's fields.  An unset order keeps the stored one.
    fn update_product_line(
        &self,
        id: ProductLineId,
        line: NewProductLine,
    ) -> impl Future<Output = StoreResult<ProductLine>> + Send;

    /// Attaches an attribute value to a product line.
    ///
    /// # Returns
    /// * `Ok(AttachOutcome::Attached)` - The edge was written
    /// * `Ok(AttachOutcome::AlreadyAttached)` - The identical edge existed; nothing changed
    /// * `Err(StoreError::Validation(ValidationError::DuplicateAttribute { .. }))` - The line
    ///   already has another value of the same attribute
    fn attach_line_attribute_value(
        &self,
        product_line_id: ProductLineId,
        attribute_value_id: AttributeValueId,
    ) -> impl Future<Output = StoreResult<AttachOutcome>> + Send;

    // Product images

    /// Creates a product image, assigning the next order among the line's images when the
    /// input has none.
    fn create_product_image(
        &self,
        image: NewProductImage,
    ) -> impl Future<Output = StoreResult<ProductImage>> + Send;

    /// Replaces a product image's fields.  An unset order keeps the stored one.
    fn update_product_image(
        &self,
        id: ProductImageId,
        image: NewProductImage,
    ) -> impl Future<Output = StoreResult<ProductImage>> + Send;

    // Reads

    /// Loads the active products with `slug`, with attribute values, active lines, images and
    /// line attribute values.
    fn active_products_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = StoreResult<Vec<ProductGraph>>> + Send;

    /// Loads the active products of the category with `slug`, with active lines and images.
    fn active_products_by_category_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = StoreResult<Vec<CategoryProductGraph>>> + Send;
}

////////////////////////////////////////////// Tables //////////////////////////////////////////////

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    categories: BTreeMap<CategoryId, Category>,
    product_types: BTreeMap<ProductTypeId, ProductType>,
    product_type_attributes: BTreeSet<(ProductTypeId, AttributeId)>,
    attributes: BTreeMap<AttributeId, Attribute>,
    attribute_values: BTreeMap<AttributeValueId, AttributeValue>,
    products: BTreeMap<ProductId, Product>,
    product_attribute_values: BTreeSet<(ProductId, AttributeValueId)>,
    product_lines: BTreeMap<ProductLineId, ProductLine>,
    line_attribute_values: BTreeSet<(ProductLineId, AttributeValueId)>,
    product_images: BTreeMap<ProductImageId, ProductImage>,
}

fn require(found: bool) -> StoreResult<()> {
    if found {
        Ok(())
    } else {
        Err(StoreError::NotFound)
    }
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_category_keys(&self, category: &NewCategory, own: Option<CategoryId>) -> StoreResult<()> {
        let taken = self.categories.values().any(|existing| {
            Some(existing.id) != own
                && (existing.name == category.name || existing.slug == category.slug)
        });
        if taken {
            return Err(StoreError::AlreadyExists);
        }
        if let Some(parent) = category.parent_id {
            require(self.categories.contains_key(&parent))?;
        }
        Ok(())
    }

    fn renumber_categories(&mut self) {
        let positions = {
            let nodes: Vec<_> = self
                .categories
                .values()
                .map(|category| TreeNode {
                    id: category.id,
                    parent: category.parent_id,
                    name: category.name.as_str(),
                })
                .collect();
            number_forest(&nodes)
        };
        for (id, position) in positions {
            if let Some(category) = self.categories.get_mut(&id) {
                category.tree_id = position.tree_id;
                category.lft = position.lft;
                category.rght = position.rght;
                category.level = position.level;
            }
        }
    }

    fn create_category(&mut self, category: NewCategory) -> StoreResult<Category> {
        category.validate()?;
        self.check_category_keys(&category, None)?;
        let id = CategoryId::new(self.next_id());
        self.categories.insert(
            id,
            Category {
                id,
                name: category.name,
                slug: category.slug,
                is_active: category.is_active,
                parent_id: category.parent_id,
                tree_id: 0,
                lft: 0,
                rght: 0,
                level: 0,
            },
        );
        self.renumber_categories();
        self.categories.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    fn update_category(&mut self, id: CategoryId, category: NewCategory) -> StoreResult<Category> {
        category.validate()?;
        require(self.categories.contains_key(&id))?;
        self.check_category_keys(&category, Some(id))?;
        if creates_cycle(id, category.parent_id, |node| {
            self.categories.get(&node).and_then(|c| c.parent_id)
        }) {
            return Err(ValidationError::ParentCycle.into());
        }
        if let Some(existing) = self.categories.get_mut(&id) {
            existing.name = category.name;
            existing.slug = category.slug;
            existing.is_active = category.is_active;
            existing.parent_id = category.parent_id;
        }
        self.renumber_categories();
        self.categories.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    fn create_product_type(&mut self, product_type: NewProductType) -> StoreResult<ProductType> {
        product_type.validate()?;
        if let Some(parent) = product_type.parent_id {
            require(self.product_types.contains_key(&parent))?;
        }
        let id = ProductTypeId::new(self.next_id());
        let row = ProductType {
            id,
            name: product_type.name,
            parent_id: product_type.parent_id,
        };
        self.product_types.insert(id, row.clone());
        Ok(row)
    }

    fn update_product_type(
        &mut self,
        id: ProductTypeId,
        product_type: NewProductType,
    ) -> StoreResult<ProductType> {
        product_type.validate()?;
        require(self.product_types.contains_key(&id))?;
        if let Some(parent) = product_type.parent_id {
            require(self.product_types.contains_key(&parent))?;
        }
        if creates_cycle(id, product_type.parent_id, |node| {
            self.product_types.get(&node).and_then(|t| t.parent_id)
        }) {
            return Err(ValidationError::ParentCycle.into());
        }
        let row = ProductType {
            id,
            name: product_type.name,
            parent_id: product_type.parent_id,
        };
        self.product_types.insert(id, row.clone());
        Ok(row)
    }

    fn attach_product_type_attribute(
        &mut self,
        product_type_id: ProductTypeId,
        attribute_id: AttributeId,
    ) -> StoreResult<ProductTypeAttribute> {
        require(self.product_types.contains_key(&product_type_id))?;
        require(self.attributes.contains_key(&attribute_id))?;
        if !self
            .product_type_attributes
            .insert((product_type_id, attribute_id))
        {
            return Err(StoreError::AlreadyExists);
        }
        Ok(ProductTypeAttribute {
            product_type_id,
            attribute_id,
        })
    }

    fn create_attribute(&mut self, attribute: NewAttribute) -> StoreResult<Attribute> {
        attribute.validate()?;
        let id = AttributeId::new(self.next_id());
        let row = Attribute {
            id,
            name: attribute.name,
            description: attribute.description,
        };
        self.attributes.insert(id, row.clone());
        Ok(row)
    }

    fn create_attribute_value(&mut self, value: NewAttributeValue) -> StoreResult<AttributeValue> {
        value.validate()?;
        require(self.attributes.contains_key(&value.attribute_id))?;
        let id = AttributeValueId::new(self.next_id());
        let row = AttributeValue {
            id,
            attribute_value: value.attribute_value,
            attribute_id: value.attribute_id,
        };
        self.attribute_values.insert(id, row.clone());
        Ok(row)
    }

    fn check_product_refs(&self, product: &NewProduct, own: Option<ProductId>) -> StoreResult<()> {
        if self
            .products
            .values()
            .any(|existing| Some(existing.id) != own && existing.pid == product.pid)
        {
            return Err(StoreError::AlreadyExists);
        }
        require(self.categories.contains_key(&product.category_id))?;
        require(self.product_types.contains_key(&product.product_type_id))
    }

    fn create_product(&mut self, product: NewProduct) -> StoreResult<Product> {
        product.validate()?;
        self.check_product_refs(&product, None)?;
        let id = ProductId::new(self.next_id());
        let row = Product {
            id,
            name: product.name,
            slug: product.slug,
            pid: product.pid,
            description: product.description,
            is_digital: product.is_digital,
            is_active: product.is_active,
            category_id: product.category_id,
            product_type_id: product.product_type_id,
            created_at: Utc::now(),
        };
        self.products.insert(id, row.clone());
        Ok(row)
    }

    fn update_product(&mut self, id: ProductId, product: NewProduct) -> StoreResult<Product> {
        product.validate()?;
        let created_at = self
            .products
            .get(&id)
            .map(|existing| existing.created_at)
            .ok_or(StoreError::NotFound)?;
        self.check_product_refs(&product, Some(id))?;
        let row = Product {
            id,
            name: product.name,
            slug: product.slug,
            pid: product.pid,
            description: product.description,
            is_digital: product.is_digital,
            is_active: product.is_active,
            category_id: product.category_id,
            product_type_id: product.product_type_id,
            created_at,
        };
        self.products.insert(id, row.clone());
        Ok(row)
    }

    fn attach_product_attribute_value(
        &mut self,
        product_id: ProductId,
        attribute_value_id: AttributeValueId,
    ) -> StoreResult<ProductAttributeValue> {
        require(self.products.contains_key(&product_id))?;
        require(self.attribute_values.contains_key(&attribute_value_id))?;
        if !self
            .product_attribute_values
            .insert((product_id, attribute_value_id))
        {
            return Err(StoreError::AlreadyExists);
        }
        Ok(ProductAttributeValue {
            product_id,
            attribute_value_id,
        })
    }

    fn line_siblings(&self, product_id: ProductId) -> Vec<(ProductLineId, crate::Order)> {
        self.product_lines
            .values()
            .filter(|line| line.product_id == product_id)
            .map(|line| (line.id, line.order))
            .collect()
    }

    fn save_product_line(
        &mut self,
        id: Option<ProductLineId>,
        mut line: NewProductLine,
    ) -> StoreResult<ProductLine> {
        line.validate()?;
        let existing = match id {
            Some(id) => Some(self.product_lines.get(&id).cloned().ok_or(StoreError::NotFound)?),
            None => None,
        };
        require(self.products.contains_key(&line.product_id))?;
        require(self.product_types.contains_key(&line.product_type_id))?;
        if line.order.is_none() {
            line.order = existing.as_ref().map(|existing| existing.order);
        }
        let siblings = self.line_siblings(line.product_id);
        let order = assign_order(&mut line, siblings.iter().map(|(_, order)| *order));
        check_sibling_order(order, id, siblings)?;

        let id = match id {
            Some(id) => id,
            None => ProductLineId::new(self.next_id()),
        };
        let row = ProductLine {
            id,
            price: normalize_price(line.price),
            sku: line.sku,
            stock_qty: line.stock_qty,
            is_active: line.is_active,
            order,
            weight: line.weight,
            product_id: line.product_id,
            product_type_id: line.product_type_id,
            created_at: existing.map(|existing| existing.created_at).unwrap_or_else(Utc::now),
        };
        self.product_lines.insert(id, row.clone());
        Ok(row)
    }

    fn attach_line_attribute_value(
        &mut self,
        product_line_id: ProductLineId,
        attribute_value_id: AttributeValueId,
    ) -> StoreResult<AttachOutcome> {
        require(self.product_lines.contains_key(&product_line_id))?;
        let attribute = self
            .attribute_values
            .get(&attribute_value_id)
            .map(|value| value.attribute_id)
            .ok_or(StoreError::NotFound)?;
        let attached = self
            .line_attribute_values
            .iter()
            .filter(|(line, _)| *line == product_line_id)
            .filter_map(|(_, value)| {
                self.attribute_values
                    .get(value)
                    .map(|value| (value.id, value.attribute_id))
            });
        let outcome = check_line_attribute(attribute_value_id, attribute, attached)?;
        if outcome == AttachOutcome::Attached {
            self.line_attribute_values
                .insert((product_line_id, attribute_value_id));
        }
        Ok(outcome)
    }

    fn save_product_image(
        &mut self,
        id: Option<ProductImageId>,
        mut image: NewProductImage,
    ) -> StoreResult<ProductImage> {
        image.validate()?;
        if let Some(id) = id {
            let existing = self.product_images.get(&id).ok_or(StoreError::NotFound)?;
            if image.order.is_none() {
                image.order = Some(existing.order);
            }
        }
        require(self.product_lines.contains_key(&image.product_line_id))?;
        let siblings: Vec<_> = self
            .product_images
            .values()
            .filter(|existing| existing.product_line_id == image.product_line_id)
            .map(|existing| (existing.id, existing.order))
            .collect();
        let order = assign_order(&mut image, siblings.iter().map(|(_, order)| *order));
        check_sibling_order(order, id, siblings)?;

        let id = match id {
            Some(id) => id,
            None => ProductImageId::new(self.next_id()),
        };
        let row = ProductImage {
            id,
            alternative_text: image.alternative_text,
            url: image.url,
            order,
            product_line_id: image.product_line_id,
        };
        self.product_images.insert(id, row.clone());
        Ok(row)
    }

    fn list_active_categories(&self) -> Vec<Category> {
        let mut categories: Vec<_> = self
            .categories
            .values()
            .filter(|category| category.is_active)
            .cloned()
            .collect();
        categories.sort_by_key(|category| (category.tree_id, category.lft));
        categories
    }

    fn resolve(&self, value_id: &AttributeValueId) -> Option<ResolvedAttributeValue> {
        let value = self.attribute_values.get(value_id)?;
        let attribute = self.attributes.get(&value.attribute_id)?;
        Some(ResolvedAttributeValue {
            value: value.clone(),
            attribute: attribute.clone(),
        })
    }

    fn active_lines(&self, product_id: ProductId) -> Vec<ProductLine> {
        let mut lines: Vec<_> = self
            .product_lines
            .values()
            .filter(|line| line.product_id == product_id && line.is_active)
            .cloned()
            .collect();
        lines.sort_by_key(|line| (line.order, line.id));
        lines
    }

    fn images(&self, product_line_id: ProductLineId) -> Vec<ProductImage> {
        let mut images: Vec<_> = self
            .product_images
            .values()
            .filter(|image| image.product_line_id == product_line_id)
            .cloned()
            .collect();
        images.sort_by_key(|image| (image.order, image.id));
        images
    }

    fn active_products_by_slug(&self, slug: &str) -> Vec<ProductGraph> {
        self.products
            .values()
            .filter(|product| product.is_active && product.slug == slug)
            .map(|product| ProductGraph {
                product: product.clone(),
                attribute_values: self
                    .product_attribute_values
                    .iter()
                    .filter(|(owner, _)| *owner == product.id)
                    .filter_map(|(_, value)| self.resolve(value))
                    .collect(),
                lines: self
                    .active_lines(product.id)
                    .into_iter()
                    .map(|line| ProductLineGraph {
                        images: self.images(line.id),
                        attribute_values: self
                            .line_attribute_values
                            .iter()
                            .filter(|(owner, _)| *owner == line.id)
                            .filter_map(|(_, value)| self.resolve(value))
                            .collect(),
                        line,
                    })
                    .collect(),
            })
            .collect()
    }

    fn active_products_by_category_slug(&self, slug: &str) -> Vec<CategoryProductGraph> {
        let categories: BTreeSet<CategoryId> = self
            .categories
            .values()
            .filter(|category| category.slug == slug)
            .map(|category| category.id)
            .collect();
        self.products
            .values()
            .filter(|product| product.is_active && categories.contains(&product.category_id))
            .map(|product| CategoryProductGraph {
                product: product.clone(),
                lines: self
                    .active_lines(product.id)
                    .into_iter()
                    .map(|line| LineImages {
                        images: self.images(line.id),
                        line,
                    })
                    .collect(),
            })
            .collect()
    }
}

//////////////////////////////////////// InMemoryCatalogStore ////////////////////////////////////////

/// Thread-safe in-memory catalog.  All writes are serialised behind one mutex, so the
/// read-validate-write sequence of every operation is atomic.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    tables: Mutex<Tables>,
}

impl InMemoryCatalogStore {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Internal("catalog lock poisoned".to_string()))
    }
}

impl CatalogStore for InMemoryCatalogStore {
    async fn create_category(&self, category: NewCategory) -> StoreResult<Category> {
        self.tables()?.create_category(category)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        category: NewCategory,
    ) -> StoreResult<Category> {
        self.tables()?.update_category(id, category)
    }

    async fn list_active_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.tables()?.list_active_categories())
    }

    async fn create_product_type(&self, product_type: NewProductType) -> StoreResult<ProductType> {
        self.tables()?.create_product_type(product_type)
    }

    async fn update_product_type(
        &self,
        id: ProductTypeId,
        product_type: NewProductType,
    ) -> StoreResult<ProductType> {
        self.tables()?.update_product_type(id, product_type)
    }

    async fn attach_product_type_attribute(
        &self,
        product_type_id: ProductTypeId,
        attribute_id: AttributeId,
    ) -> StoreResult<ProductTypeAttribute> {
        self.tables()?
            .attach_product_type_attribute(product_type_id, attribute_id)
    }

    async fn create_attribute(&self, attribute: NewAttribute) -> StoreResult<Attribute> {
        self.tables()?.create_attribute(attribute)
    }

    async fn create_attribute_value(&self, value: NewAttributeValue) -> StoreResult<AttributeValue> {
        self.tables()?.create_attribute_value(value)
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        self.tables()?.create_product(product)
    }

    async fn update_product(&self, id: ProductId, product: NewProduct) -> StoreResult<Product> {
        self.tables()?.update_product(id, product)
    }

    async fn attach_product_attribute_value(
        &self,
        product_id: ProductId,
        attribute_value_id: AttributeValueId,
    ) -> StoreResult<ProductAttributeValue> {
        self.tables()?
            .attach_product_attribute_value(product_id, attribute_value_id)
    }

    async fn create_product_line(&self, line: NewProductLine) -> StoreResult<ProductLine> {
        self.tables()?.save_product_line(None, line)
    }

    async fn update_product_line(
        &self,
        id: ProductLineId,
        line: NewProductLine,
    ) -> StoreResult<ProductLine> {
        self.tables()?.save_product_line(Some(id), line)
    }

    async fn attach_line_attribute_value(
        &self,
        product_line_id: ProductLineId,
        attribute_value_id: AttributeValueId,
    ) -> StoreResult<AttachOutcome> {
        self.tables()?
            .attach_line_attribute_value(product_line_id, attribute_value_id)
    }

    async fn create_product_image(&self, image: NewProductImage) -> StoreResult<ProductImage> {
        self.tables()?.save_product_image(None, image)
    }

    async fn update_product_image(
        &self,
        id: ProductImageId,
        image: NewProductImage,
    ) -> StoreResult<ProductImage> {
        self.tables()?.save_product_image(Some(id), image)
    }

    async fn active_products_by_slug(&self, slug: &str) -> StoreResult<Vec<ProductGraph>> {
        Ok(self.tables()?.active_products_by_slug(slug))
    }

    async fn active_products_by_category_slug(
        &self,
        slug: &str,
    ) -> StoreResult<Vec<CategoryProductGraph>> {
        Ok(self.tables()?.active_products_by_category_slug(slug))
    }
}
