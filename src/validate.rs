//! Pre-commit checks run by the write path.
//!
//! Every check is a pure function over the row being written and the rows the store already
//! holds.  Stores run them before persisting anything, so a failed check leaves no trace.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::{
    AttributeId, AttributeValueId, NewAttribute, NewAttributeValue, NewCategory, NewProduct,
    NewProductImage, NewProductLine, NewProductType, Order,
};

static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern compiles"));

const PRICE_PLACES: u32 = 2;
const PRICE_DIGITS: u32 = 5;

////////////////////////////////////////// ValidationError //////////////////////////////////////////

/// A write that would break a catalog invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Another row under the same parent already holds this order.
    DuplicateOrder {
        /// The contested order.
        order: Order,
    },
    /// The product line already has a value on this attribute axis.
    DuplicateAttribute {
        /// The attribute that is already covered.
        attribute: AttributeId,
    },
    /// A required text field is empty.
    Blank {
        /// Field name.
        field: &'static str,
    },
    /// A text field exceeds its maximum length.
    TooLong {
        /// Field name.
        field: &'static str,
        /// Maximum number of characters.
        max: usize,
    },
    /// A slug contains characters other than letters, digits, `-` and `_`.
    InvalidSlug {
        /// Field name.
        field: &'static str,
    },
    /// A numeric field is negative.
    Negative {
        /// Field name.
        field: &'static str,
    },
    /// A price has more than two decimal places.
    PricePlaces,
    /// A price has more than five digits.
    PriceDigits,
    /// The requested parent is the row itself or one of its descendants.
    ParentCycle,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateOrder { .. } => write!(f, "Duplicate value."),
            Self::DuplicateAttribute { .. } => write!(f, "Duplicate attribute exists"),
            Self::Blank { field } => write!(f, "{}: this field may not be blank", field),
            Self::TooLong { field, max } => {
                write!(f, "{}: ensure this field has no more than {} characters", field, max)
            }
            Self::InvalidSlug { field } => write!(
                f,
                "{}: enter a valid slug consisting of letters, numbers, underscores or hyphens",
                field
            ),
            Self::Negative { field } => write!(f, "{}: ensure this value is not negative", field),
            Self::PricePlaces => write!(
                f,
                "price: ensure that there are no more than {} decimal places",
                PRICE_PLACES
            ),
            Self::PriceDigits => write!(
                f,
                "price: ensure that there are no more than {} digits in total",
                PRICE_DIGITS
            ),
            Self::ParentCycle => write!(f, "parent: a node cannot be its own ancestor"),
        }
    }
}

impl std::error::Error for ValidationError {}

/////////////////////////////////////////// uniqueness /////////////////////////////////////////////

/// Rejects `order` when a sibling other than `own_id` already holds it.
///
/// `siblings` must already be restricted to rows sharing the parent.  Passing the id of the row
/// being updated as `own_id` lets an unchanged row be saved again.
pub fn check_sibling_order<I: PartialEq>(
    order: Order,
    own_id: Option<I>,
    siblings: impl IntoIterator<Item = (I, Order)>,
) -> Result<(), ValidationError> {
    for (id, sibling_order) in siblings {
        if own_id.as_ref() != Some(&id) && sibling_order == order {
            return Err(ValidationError::DuplicateOrder { order });
        }
    }
    Ok(())
}

/// What attaching an attribute value to a product line amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// The edge is new and may be written.
    Attached,
    /// The identical edge already exists; nothing needs writing.
    AlreadyAttached,
}

/// Checks attaching `value` (on axis `attribute`) to a line whose current values are
/// `attached`, given as (value, attribute) pairs.
pub fn check_line_attribute(
    value: AttributeValueId,
    attribute: AttributeId,
    attached: impl IntoIterator<Item = (AttributeValueId, AttributeId)>,
) -> Result<AttachOutcome, ValidationError> {
    let attached: Vec<_> = attached.into_iter().collect();
    if attached.iter().any(|(existing, _)| *existing == value) {
        return Ok(AttachOutcome::AlreadyAttached);
    }
    if attached.iter().any(|(_, axis)| *axis == attribute) {
        return Err(ValidationError::DuplicateAttribute { attribute });
    }
    Ok(AttachOutcome::Attached)
}

///////////////////////////////////////////// fields ///////////////////////////////////////////////

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    check_len(field, value, max)
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

fn check_slug(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    check_len(field, value, max)?;
    if !SLUG.is_match(value) {
        return Err(ValidationError::InvalidSlug { field });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(())
}

/// Checks that `price` fits a decimal with two places and five digits.
pub fn check_price(price: Decimal) -> Result<(), ValidationError> {
    if price.normalize().scale() > PRICE_PLACES {
        return Err(ValidationError::PricePlaces);
    }
    if price.abs() >= Decimal::from(10i64.pow(PRICE_DIGITS - PRICE_PLACES)) {
        return Err(ValidationError::PriceDigits);
    }
    Ok(())
}

/// Returns `price` at the two-place scale it is stored and rendered with.
pub fn normalize_price(price: Decimal) -> Decimal {
    let mut price = price.round_dp(PRICE_PLACES);
    price.rescale(PRICE_PLACES);
    price
}

/// Field-level checks of a write-side row.
pub trait Validate {
    /// Checks the row in isolation, without looking at other rows.
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for NewCategory {
    fn validate(&self) -> Result<(), ValidationError> {
        check_text("name", &self.name, 235)?;
        check_slug("slug", &self.slug, 255)
    }
}

impl Validate for NewProduct {
    fn validate(&self) -> Result<(), ValidationError> {
        check_text("name", &self.name, 100)?;
        check_slug("slug", &self.slug, 255)?;
        check_text("pid", &self.pid, 10)
    }
}

impl Validate for NewProductType {
    fn validate(&self) -> Result<(), ValidationError> {
        check_text("name", &self.name, 100)
    }
}

impl Validate for NewAttribute {
    fn validate(&self) -> Result<(), ValidationError> {
        check_text("name", &self.name, 100)
    }
}

impl Validate for NewAttributeValue {
    fn validate(&self) -> Result<(), ValidationError> {
        check_text("attribute_value", &self.attribute_value, 100)
    }
}

impl Validate for NewProductLine {
    fn validate(&self) -> Result<(), ValidationError> {
        check_price(self.price)?;
        check_text("sku", &self.sku, 100)?;
        check_non_negative("stock_qty", self.stock_qty.into())?;
        if let Some(order) = self.order {
            check_non_negative("order", order.into())?;
        }
        Ok(())
    }
}

impl Validate for NewProductImage {
    fn validate(&self) -> Result<(), ValidationError> {
        check_text("alternative_text", &self.alternative_text, 100)?;
        check_text("url", &self.url, 100)?;
        if let Some(order) = self.order {
            check_non_negative("order", order.into())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CategoryId, ProductId, ProductLineId, ProductTypeId};

    fn category(name: &str, slug: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            slug: slug.to_string(),
            is_active: true,
            parent_id: None,
        }
    }

    fn line(price: Decimal) -> NewProductLine {
        NewProductLine {
            price,
            sku: "SKU-1".to_string(),
            stock_qty: 10,
            is_active: true,
            order: None,
            weight: 0.5,
            product_id: ProductId::new(1),
            product_type_id: ProductTypeId::new(1),
        }
    }

    #[test]
    fn distinct_orders_pass() {
        let siblings = [(ProductLineId::new(1), 1), (ProductLineId::new(2), 2)];
        assert_eq!(check_sibling_order(3, None, siblings), Ok(()));
    }

    #[test]
    fn duplicate_order_is_rejected() {
        let siblings = [(ProductLineId::new(1), 1), (ProductLineId::new(2), 2)];
        let err = check_sibling_order(2, None, siblings).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateOrder { order: 2 });
        assert_eq!(err.to_string(), "Duplicate value.");
    }

    #[test]
    fn resaving_a_row_does_not_conflict_with_itself() {
        let siblings = [(ProductLineId::new(1), 1), (ProductLineId::new(2), 2)];
        assert_eq!(
            check_sibling_order(2, Some(ProductLineId::new(2)), siblings),
            Ok(())
        );
        assert_eq!(
            check_sibling_order(2, Some(ProductLineId::new(1)), siblings),
            Err(ValidationError::DuplicateOrder { order: 2 })
        );
    }

    #[test]
    fn second_value_on_an_axis_is_rejected() {
        let color = AttributeId::new(1);
        let size = AttributeId::new(2);
        let red = AttributeValueId::new(10);
        let blue = AttributeValueId::new(11);
        let large = AttributeValueId::new(20);
        let attached = [(red, color)];

        let err = check_line_attribute(blue, color, attached).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateAttribute { attribute: color });
        assert_eq!(err.to_string(), "Duplicate attribute exists");

        assert_eq!(
            check_line_attribute(large, size, attached),
            Ok(AttachOutcome::Attached)
        );
    }

    #[test]
    fn identical_edge_is_a_no_op() {
        let color = AttributeId::new(1);
        let red = AttributeValueId::new(10);
        assert_eq!(
            check_line_attribute(red, color, [(red, color)]),
            Ok(AttachOutcome::AlreadyAttached)
        );
    }

    #[test]
    fn slugs() {
        assert_eq!(category("Shoes", "shoes_2-b").validate(), Ok(()));
        assert_eq!(
            category("Shoes", "no spaces").validate(),
            Err(ValidationError::InvalidSlug { field: "slug" })
        );
        assert_eq!(
            category("Shoes", "").validate(),
            Err(ValidationError::InvalidSlug { field: "slug" })
        );
    }

    #[test]
    fn names() {
        assert_eq!(
            category("  ", "x").validate(),
            Err(ValidationError::Blank { field: "name" })
        );
        assert_eq!(
            category(&"n".repeat(236), "x").validate(),
            Err(ValidationError::TooLong {
                field: "name",
                max: 235
            })
        );
    }

    #[test]
    fn prices() {
        assert_eq!(line(Decimal::new(99999, 2)).validate(), Ok(()));
        assert_eq!(line(Decimal::new(1250, 3)).validate(), Ok(()));
        assert_eq!(
            line(Decimal::new(100000, 2)).validate(),
            Err(ValidationError::PriceDigits)
        );
        assert_eq!(
            line(Decimal::new(12345, 3)).validate(),
            Err(ValidationError::PricePlaces)
        );
    }

    #[test]
    fn prices_are_rendered_with_two_places() {
        assert_eq!(normalize_price(Decimal::new(125, 1)).to_string(), "12.50");
        assert_eq!(normalize_price(Decimal::from(3)).to_string(), "3.00");
    }

    #[test]
    fn negative_order_is_rejected() {
        let mut row = line(Decimal::new(100, 2));
        row.order = Some(-1);
        assert_eq!(
            row.validate(),
            Err(ValidationError::Negative { field: "order" })
        );
    }

    #[test]
    fn product_pid_length() {
        let product = NewProduct {
            name: "Boot".to_string(),
            slug: "boot".to_string(),
            pid: "01234567890".to_string(),
            description: String::new(),
            is_digital: false,
            is_active: true,
            category_id: CategoryId::new(1),
            product_type_id: ProductTypeId::new(1),
        };
        assert_eq!(
            product.validate(),
            Err(ValidationError::TooLong {
                field: "pid",
                max: 10
            })
        );
    }
}
