//! The entity contract used for in-memory evaluation.
//!
//! Predicate leaves and sort descriptors name fields; an [`Entity`] maps a
//! field name to a [`Value`]. The trait is usually derived with
//! `#[derive(Entity)]` from `quarry-macros`.

use crate::value::{Timestamp, Value};

/// A type whose fields can be read by name for predicate evaluation and sorting.
///
/// # Derive Usage
///
/// ```ignore
/// use quarry_macros::Entity;
///
/// #[derive(Entity)]
/// struct Product {
///     #[query(String)]
///     category: String,
///     #[query(Number)]
///     price: u32,
///     #[query(Bool)]
///     active: bool,
/// }
///
/// assert_eq!(Product::PRICE, "price");
/// ```
///
/// # Manual Implementation
///
/// ```
/// use quarry::{Entity, Number, Value};
///
/// struct Product {
///     category: String,
///     price: u32,
/// }
///
/// impl Entity for Product {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "category" => Value::String(&self.category),
///             "price" => Value::Number(Number::from(self.price)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Entity {
    /// Returns the value of `field`, or [`Value::None`] if it is null or unknown.
    fn field_value(&self, field: &str) -> Value<'_>;

    /// Function-pointer form of [`Entity::field_value`].
    fn accessor<'a>(item: &'a Self, field: &str) -> Value<'a>
    where
        Self: Sized,
    {
        item.field_value(field)
    }
}

impl<T: Entity + ?Sized> Entity for &T {
    fn field_value(&self, field: &str) -> Value<'_> {
        (**self).field_value(field)
    }
}

/// Maps an enum to a stable discriminant for `#[query(Enum)]` fields.
///
/// Use explicit values rather than declaration order so stored
/// specifications keep their meaning when variants are added.
pub trait EntityEnum {
    fn discriminant(&self) -> u32;
}

/// Converts a datetime-like type to a [`Timestamp`] for `#[query(Timestamp)]` fields.
pub trait EntityTimestamp {
    fn timestamp(&self) -> Timestamp;
}

impl EntityTimestamp for i64 {
    fn timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl EntityTimestamp for Timestamp {
    fn timestamp(&self) -> Timestamp {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Number;

    struct Item {
        name: String,
        count: i32,
    }

    impl Entity for Item {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "name" => Value::String(&self.name),
                "count" => Value::Number(Number::from(self.count)),
                _ => Value::None,
            }
        }
    }

    #[test]
    fn manual_impl_and_accessor() {
        let item = Item {
            name: "bolt".to_string(),
            count: 3,
        };
        assert_eq!(item.field_value("name"), Value::String("bolt"));
        assert_eq!(Item::accessor(&item, "count"), Value::Number(Number::I64(3)));
        assert_eq!(item.field_value("missing"), Value::None);
    }

    #[test]
    fn references_forward_to_the_entity() {
        let item = Item {
            name: "nut".to_string(),
            count: 1,
        };
        let by_ref = &item;
        assert_eq!(Entity::field_value(&by_ref, "name"), Value::String("nut"));
    }

    #[test]
    fn timestamp_helpers() {
        assert_eq!(5i64.timestamp(), Timestamp(5));
        assert_eq!(Timestamp(9).timestamp(), Timestamp(9));
    }
}
