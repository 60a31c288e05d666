use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use super::{SqlResult, attribute, category, product, product_image, product_line, product_type};
use crate::ordering::assign_order;
use crate::tree::creates_cycle;
use crate::validate::{
    AttachOutcome, Validate, ValidationError, check_line_attribute, check_sibling_order,
    normalize_price,
};
use crate::{
    Attribute, AttributeId, AttributeValue, AttributeValueId, CatalogStore, Category, CategoryId,
    CategoryProductGraph, LineImages, NewAttribute, NewAttributeValue, NewCategory, NewProduct,
    NewProductImage, NewProductLine, NewProductType, Product, ProductAttributeValue, ProductGraph,
    ProductId, ProductImage, ProductImageId, ProductLine, ProductLineGraph, ProductLineId,
    ProductType, ProductTypeAttribute, ProductTypeId, StoreError,
};

/// PostgreSQL-backed catalog.
///
/// Each write runs in its own transaction.  Writers that assign or check orders first lock the
/// parent row (`SELECT ... FOR UPDATE`), so the check-then-write sequence holds under
/// concurrency; the unique indexes on `(parent, "order")` back this up.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    /// Wraps an existing pool.  Migrations must already have run.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url`.
    pub async fn connect(database_url: &str) -> SqlResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn begin(&self) -> SqlResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    async fn save_category(
        &self,
        id: Option<CategoryId>,
        category: NewCategory,
    ) -> SqlResult<Category> {
        category.validate()?;
        let mut tx = self.begin().await?;
        category::lock(&mut tx).await?;
        let id = match id {
            Some(id) => {
                let parents = category::parent_map(&mut tx).await?;
                if creates_cycle(id, category.parent_id, |node| parents.get(&node).copied()) {
                    return Err(ValidationError::ParentCycle.into());
                }
                if !category::update(&mut tx, id, &category).await? {
                    return Err(StoreError::NotFound);
                }
                id
            }
            None => category::insert(&mut tx, &category).await?,
        };
        category::renumber(&mut tx).await?;
        let row = category::get(&mut tx, id).await?.ok_or(StoreError::NotFound)?;
        tx.commit().await?;
        debug!(category = %row.id, slug = %row.slug, "saved category");
        Ok(row)
    }

    async fn save_product_line(
        &self,
        id: Option<ProductLineId>,
        mut line: NewProductLine,
    ) -> SqlResult<ProductLine> {
        line.validate()?;
        let mut tx = self.begin().await?;
        if !product::lock(&mut tx, line.product_id).await? {
            return Err(StoreError::NotFound);
        }
        if let Some(id) = id {
            let existing = product_line::get(&mut tx, id)
                .await?
                .ok_or(StoreError::NotFound)?;
            if line.order.is_none() {
                line.order = Some(existing.order);
            }
        }
        let siblings = product_line::sibling_orders(&mut tx, line.product_id).await?;
        let order = assign_order(&mut line, siblings.iter().map(|(_, order)| *order));
        check_sibling_order(order, id, siblings)?;

        let price = normalize_price(line.price);
        let row = match id {
            Some(id) => product_line::update(&mut tx, id, &line, price, order)
                .await?
                .ok_or(StoreError::NotFound)?,
            None => product_line::insert(&mut tx, &line, price, order).await?,
        };
        tx.commit().await?;
        debug!(product_line = %row.id, product = %row.product_id, order = row.order, "saved product line");
        Ok(row)
    }

    async fn save_product_image(
        &self,
        id: Option<ProductImageId>,
        mut image: NewProductImage,
    ) -> SqlResult<ProductImage> {
        image.validate()?;
        let mut tx = self.begin().await?;
        if !product_line::lock(&mut tx, image.product_line_id).await? {
            return Err(StoreError::NotFound);
        }
        if let Some(id) = id {
            let existing = product_image::get(&mut tx, id)
                .await?
                .ok_or(StoreError::NotFound)?;
            if image.order.is_none() {
                image.order = Some(existing.order);
            }
        }
        let siblings = product_image::sibling_orders(&mut tx, image.product_line_id).await?;
        let order = assign_order(&mut image, siblings.iter().map(|(_, order)| *order));
        check_sibling_order(order, id, siblings)?;

        let row = match id {
            Some(id) => product_image::update(&mut tx, id, &image, order)
                .await?
                .ok_or(StoreError::NotFound)?,
            None => product_image::insert(&mut tx, &image, order).await?,
        };
        tx.commit().await?;
        debug!(product_image = %row.id, product_line = %row.product_line_id, order = row.order, "saved product image");
        Ok(row)
    }
}

fn group_by<K: std::hash::Hash + Eq, V>(pairs: Vec<(K, V)>) -> HashMap<K, Vec<V>> {
    let mut groups: HashMap<K, Vec<V>> = HashMap::new();
    for (key, value) in pairs {
        groups.entry(key).or_default().push(value);
    }
    groups
}

impl CatalogStore for PgCatalogStore {
    async fn create_category(&self, category: NewCategory) -> SqlResult<Category> {
        self.save_category(None, category).await
    }

    async fn update_category(&self, id: CategoryId, category: NewCategory) -> SqlResult<Category> {
        self.save_category(Some(id), category).await
    }

    async fn list_active_categories(&self) -> SqlResult<Vec<Category>> {
        let mut tx = self.begin().await?;
        let categories = category::list_active(&mut tx).await?;
        tx.commit().await?;
        Ok(categories)
    }

    async fn create_product_type(&self, product_type: NewProductType) -> SqlResult<ProductType> {
        product_type.validate()?;
        let mut tx = self.begin().await?;
        let row = product_type::insert(&mut tx, &product_type).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn update_product_type(
        &self,
        id: ProductTypeId,
        product_type: NewProductType,
    ) -> SqlResult<ProductType> {
        product_type.validate()?;
        let mut tx = self.begin().await?;
        product_type::lock(&mut tx).await?;
        let parents = product_type::parent_map(&mut tx).await?;
        if creates_cycle(id, product_type.parent_id, |node| parents.get(&node).copied()) {
            return Err(ValidationError::ParentCycle.into());
        }
        let row = product_type::update(&mut tx, id, &product_type)
            .await?
            .ok_or(StoreError::NotFound)?;
        tx.commit().await?;
        Ok(row)
    }

    async fn attach_product_type_attribute(
        &self,
        product_type_id: ProductTypeId,
        attribute_id: AttributeId,
    ) -> SqlResult<ProductTypeAttribute> {
        let mut tx = self.begin().await?;
        let row = product_type::attach_attribute(&mut tx, product_type_id, attribute_id).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn create_attribute(&self, new: NewAttribute) -> SqlResult<Attribute> {
        new.validate()?;
        let mut tx = self.begin().await?;
        let row = attribute::insert(&mut tx, &new).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn create_attribute_value(&self, value: NewAttributeValue) -> SqlResult<AttributeValue> {
        value.validate()?;
        let mut tx = self.begin().await?;
        let row = attribute::insert_value(&mut tx, &value).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn create_product(&self, new: NewProduct) -> SqlResult<Product> {
        new.validate()?;
        let mut tx = self.begin().await?;
        let row = product::insert(&mut tx, &new).await?;
        tx.commit().await?;
        debug!(product = %row.id, pid = %row.pid, "created product");
        Ok(row)
    }

    async fn update_product(&self, id: ProductId, new: NewProduct) -> SqlResult<Product> {
        new.validate()?;
        let mut tx = self.begin().await?;
        let row = product::update(&mut tx, id, &new)
            .await?
            .ok_or(StoreError::NotFound)?;
        tx.commit().await?;
        Ok(row)
    }

    async fn attach_product_attribute_value(
        &self,
        product_id: ProductId,
        attribute_value_id: AttributeValueId,
    ) -> SqlResult<ProductAttributeValue> {
        let mut tx = self.begin().await?;
        let row = product::attach_attribute_value(&mut tx, product_id, attribute_value_id).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn create_product_line(&self, line: NewProductLine) -> SqlResult<ProductLine> {
        self.save_product_line(None, line).await
    }

    async fn update_product_line(
        &self,
        id: ProductLineId,
        line: NewProductLine,
    ) -> SqlResult<ProductLine> {
        self.save_product_line(Some(id), line).await
    }

    async fn attach_line_attribute_value(
        &self,
        product_line_id: ProductLineId,
        attribute_value_id: AttributeValueId,
    ) -> SqlResult<AttachOutcome> {
        let mut tx = self.begin().await?;
        if !product_line::lock(&mut tx, product_line_id).await? {
            return Err(StoreError::NotFound);
        }
        let attribute = attribute::attribute_of(&mut tx, attribute_value_id)
            .await?
            .ok_or(StoreError::NotFound)?;
        let attached = product_line::attached_values(&mut tx, product_line_id).await?;
        let outcome = check_line_attribute(attribute_value_id, attribute, attached)?;
        if outcome == AttachOutcome::Attached {
            product_line::attach_attribute_value(&mut tx, product_line_id, attribute_value_id)
                .await?;
        }
        tx.commit().await?;
        Ok(outcome)
    }

    async fn create_product_image(&self, image: NewProductImage) -> SqlResult<ProductImage> {
        self.save_product_image(None, image).await
    }

    async fn update_product_image(
        &self,
        id: ProductImageId,
        image: NewProductImage,
    ) -> SqlResult<ProductImage> {
        self.save_product_image(Some(id), image).await
    }

    async fn active_products_by_slug(&self, slug: &str) -> SqlResult<Vec<ProductGraph>> {
        let mut tx = self.begin().await?;
        let products = product::list_active_by_slug(&mut tx, slug).await?;
        let product_ids: Vec<_> = products.iter().map(|product| product.id).collect();
        let mut product_values =
            group_by(attribute::for_products(&mut tx, &product_ids).await?);
        let lines = product_line::list_active_for_products(&mut tx, &product_ids).await?;
        let line_ids: Vec<_> = lines.iter().map(|line| line.id).collect();
        let mut images = group_by(
            product_image::list_for_lines(&mut tx, &line_ids)
                .await?
                .into_iter()
                .map(|image| (image.product_line_id, image))
                .collect(),
        );
        let mut line_values = group_by(attribute::for_product_lines(&mut tx, &line_ids).await?);
        tx.commit().await?;

        let mut lines_by_product = group_by(
            lines
                .into_iter()
                .map(|line| {
                    let graph = ProductLineGraph {
                        images: images.remove(&line.id).unwrap_or_default(),
                        attribute_values: line_values.remove(&line.id).unwrap_or_default(),
                        line,
                    };
                    (graph.line.product_id, graph)
                })
                .collect(),
        );
        Ok(products
            .into_iter()
            .map(|product| ProductGraph {
                attribute_values: product_values.remove(&product.id).unwrap_or_default(),
                lines: lines_by_product.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect())
    }

    async fn active_products_by_category_slug(
        &self,
        slug: &str,
    ) -> SqlResult<Vec<CategoryProductGraph>> {
        let mut tx = self.begin().await?;
        let products = product::list_active_by_category_slug(&mut tx, slug).await?;
        let product_ids: Vec<_> = products.iter().map(|product| product.id).collect();
        let lines = product_line::list_active_for_products(&mut tx, &product_ids).await?;
        let line_ids: Vec<_> = lines.iter().map(|line| line.id).collect();
        let mut images = group_by(
            product_image::list_for_lines(&mut tx, &line_ids)
                .await?
                .into_iter()
                .map(|image| (image.product_line_id, image))
                .collect(),
        );
        tx.commit().await?;

        let mut lines_by_product = group_by(
            lines
                .into_iter()
                .map(|line| {
                    let images = images.remove(&line.id).unwrap_or_default();
                    (line.product_id, LineImages { line, images })
                })
                .collect(),
        );
        Ok(products
            .into_iter()
            .map(|product| CategoryProductGraph {
                lines: lines_by_product.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect())
    }
}
