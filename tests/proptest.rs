use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;
use rust_decimal::Decimal;

use storefront::{
    AttributeId, AttributeValueId, CatalogStore, InMemoryCatalogStore, NewAttribute,
    NewAttributeValue, NewCategory, NewProduct, NewProductImage, NewProductLine, NewProductType,
    Order, ProductLine, StoreError, ValidationError, next_order, next_order_for,
};

/// A store holding one active product with one line, ready for images and attributes.
struct Fixture {
    store: InMemoryCatalogStore,
    line: ProductLine,
}

impl Fixture {
    async fn new() -> Self {
        let store = InMemoryCatalogStore::new();
        let category = store
            .create_category(NewCategory {
                name: "Lamps".to_string(),
                slug: "lamps".to_string(),
                is_active: true,
                parent_id: None,
            })
            .await
            .unwrap();
        let product_type = store
            .create_product_type(NewProductType {
                name: "Lighting".to_string(),
                parent_id: None,
            })
            .await
            .unwrap();
        let product = store
            .create_product(NewProduct {
                name: "Desk lamp".to_string(),
                slug: "desk-lamp".to_string(),
                pid: "LAMP-1".to_string(),
                description: String::new(),
                is_digital: false,
                is_active: true,
                category_id: category.id,
                product_type_id: product_type.id,
            })
            .await
            .unwrap();
        let line = store
            .create_product_line(NewProductLine {
                price: Decimal::new(2999, 2),
                sku: "LAMP-1-A".to_string(),
                stock_qty: 3,
                is_active: true,
                order: None,
                weight: 0.8,
                product_id: product.id,
                product_type_id: product_type.id,
            })
            .await
            .unwrap();
        Self { store, line }
    }
}

mod strategies {
    use super::*;

    /// Sibling orders as the store would hold them: non-negative and distinct.
    pub fn sibling_orders_strategy() -> impl Strategy<Value = BTreeSet<Order>> {
        prop::collection::btree_set(0..1000i32, 0..20)
    }

    /// A sequence of image saves, each with an optional explicit order.
    pub fn image_orders_strategy() -> impl Strategy<Value = Vec<Option<Order>>> {
        prop::collection::vec(prop::option::of(1..8i32), 1..16)
    }

    /// A sequence of (attribute, value) picks over three attributes of three values each.
    pub fn attribute_picks_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
        prop::collection::vec((0..3usize, 0..3usize), 1..12)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn next_order_exceeds_every_sibling(orders in strategies::sibling_orders_strategy()) {
        let next = next_order(orders.iter().copied());
        prop_assert!(orders.iter().all(|order| *order < next));
        prop_assert!(!orders.contains(&next));
        if orders.is_empty() {
            prop_assert_eq!(next, 1);
        }
    }

    #[test]
    fn next_order_is_scoped_to_parent(
        rows in prop::collection::vec((0..4u8, 0..100i32), 0..30),
        parent in 0..4u8,
    ) {
        let expected = next_order(
            rows.iter().filter(|(p, _)| *p == parent).map(|(_, order)| *order),
        );
        let next = next_order_for(&parent, rows.iter().map(|(p, order)| (p, *order)));
        prop_assert_eq!(next, expected);
    }

    #[test]
    fn image_orders_stay_unique_per_line(orders in strategies::image_orders_strategy()) {
        tokio::runtime::Runtime::new().unwrap().block_on(async {
            let fixture = Fixture::new().await;
            let mut held = BTreeSet::new();

            for (index, order) in orders.iter().enumerate() {
                let result = fixture
                    .store
                    .create_product_image(NewProductImage {
                        alternative_text: format!("image {}", index),
                        url: format!("{}.jpg", index),
                        order: *order,
                        product_line_id: fixture.line.id,
                    })
                    .await;
                match (order, result) {
                    (Some(order), Err(err)) => {
                        prop_assert!(held.contains(order));
                        prop_assert_eq!(
                            err,
                            StoreError::Validation(ValidationError::DuplicateOrder { order: *order })
                        );
                    }
                    (_, Ok(image)) => {
                        prop_assert!(held.insert(image.order));
                        if order.is_none() {
                            prop_assert!(held.iter().all(|held| *held <= image.order));
                        }
                    }
                    (None, Err(err)) => prop_assert!(false, "auto-ordered save failed: {}", err),
                }
            }

            let products = fixture.store.active_products_by_slug("desk-lamp").await.unwrap();
            let mut images: Vec<Order> = products[0].lines[0]
                .images
                .iter()
                .map(|image| image.order)
                .collect();
            images.sort();
            prop_assert_eq!(images, held.into_iter().collect::<Vec<_>>());
            Ok(())
        }).unwrap()
    }

    #[test]
    fn one_value_per_attribute(picks in strategies::attribute_picks_strategy()) {
        tokio::runtime::Runtime::new().unwrap().block_on(async {
            let fixture = Fixture::new().await;
            let mut values: Vec<Vec<AttributeValueId>> = Vec::new();
            let mut attributes: Vec<AttributeId> = Vec::new();
            for name in ["Color", "Size", "Finish"] {
                let attribute = fixture
                    .store
                    .create_attribute(NewAttribute {
                        name: name.to_string(),
                        description: String::new(),
                    })
                    .await
                    .unwrap();
                let mut axis = Vec::new();
                for value in 0..3 {
                    let value = fixture
                        .store
                        .create_attribute_value(NewAttributeValue {
                            attribute_value: format!("{} {}", name, value),
                            attribute_id: attribute.id,
                        })
                        .await
                        .unwrap();
                    axis.push(value.id);
                }
                attributes.push(attribute.id);
                values.push(axis);
            }

            let mut chosen: HashMap<usize, usize> = HashMap::new();
            for (attribute, value) in picks {
                let result = fixture
                    .store
                    .attach_line_attribute_value(fixture.line.id, values[attribute][value])
                    .await;
                match chosen.get(&attribute) {
                    None => {
                        prop_assert!(result.is_ok());
                        chosen.insert(attribute, value);
                    }
                    Some(existing) if *existing == value => prop_assert!(result.is_ok()),
                    Some(_) => prop_assert_eq!(
                        result,
                        Err(StoreError::Validation(ValidationError::DuplicateAttribute {
                            attribute: attributes[attribute],
                        }))
                    ),
                }
            }

            let products = fixture.store.active_products_by_slug("desk-lamp").await.unwrap();
            let attached = &products[0].lines[0].attribute_values;
            prop_assert_eq!(attached.len(), chosen.len());
            let axes: BTreeSet<_> = attached.iter().map(|value| value.attribute.id).collect();
            prop_assert_eq!(axes.len(), attached.len());
            Ok(())
        }).unwrap()
    }
}
