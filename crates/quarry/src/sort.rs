//! Multi-level sort chains.
//!
//! A [`SortChain`] is an ordered list of [`SortDescriptor`]s. The first
//! descriptor is the primary key; each following one only breaks ties among
//! candidates equal under every descriptor before it, which reproduces tuple
//! ordering on `(k1, ±k2, ±k3, …)`.
//!
//! Null placement is decided by a per-descriptor null rank that is compared
//! before the value and is never flipped by the direction:
//!
//! | Policy | null rank | non-null rank |
//! |--------|-----------|---------------|
//! | `NullsFirst` | 0 | 1 |
//! | `NullsLast` | 1 | 0 |
//!
//! With `Unspecified`, null compares greater than every value and the
//! direction applies to it like any other value.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{Result, SpecError};
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl Direction {
    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }

    /// Short form used in display output: `asc` or `desc`.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where null values go for one sort level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    #[default]
    Unspecified,
    NullsFirst,
    NullsLast,
}

/// One level of a multi-level ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    /// Field the level sorts by.
    pub key: String,
    pub direction: Direction,
    #[serde(default)]
    pub nulls: NullPolicy,
}

impl SortDescriptor {
    /// Creates a descriptor with no null policy.
    pub fn new(key: impl Into<String>, direction: Direction) -> Self {
        SortDescriptor {
            key: key.into(),
            direction,
            nulls: NullPolicy::Unspecified,
        }
    }

    /// Creates an ascending descriptor.
    pub fn asc(key: impl Into<String>) -> Self {
        SortDescriptor::new(key, Direction::Ascending)
    }

    /// Creates a descending descriptor.
    pub fn desc(key: impl Into<String>) -> Self {
        SortDescriptor::new(key, Direction::Descending)
    }

    /// Sets where nulls go at this level.
    pub fn with_nulls(mut self, nulls: NullPolicy) -> Self {
        self.nulls = nulls;
        self
    }

    /// Rank compared ahead of the value. `None` under `Unspecified`.
    pub fn null_rank(&self, value: &Value<'_>) -> Option<u8> {
        match (self.nulls, value.is_none()) {
            (NullPolicy::Unspecified, _) => None,
            (NullPolicy::NullsFirst, true) | (NullPolicy::NullsLast, false) => Some(0),
            (NullPolicy::NullsFirst, false) | (NullPolicy::NullsLast, true) => Some(1),
        }
    }

    /// Compares two field values at this level as `(null_rank, value)`.
    pub fn compare_values(&self, a: &Value<'_>, b: &Value<'_>) -> Ordering {
        self.null_rank(a)
            .cmp(&self.null_rank(b))
            .then_with(|| self.direction.apply(compare_values(a, b)))
    }

    /// Compares two entities at this level.
    pub fn compare<T: Entity + ?Sized>(&self, a: &T, b: &T) -> Ordering {
        self.compare_values(&a.field_value(&self.key), &b.field_value(&self.key))
    }
}

impl fmt::Display for SortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.direction)?;
        match self.nulls {
            NullPolicy::Unspecified => Ok(()),
            NullPolicy::NullsFirst => f.write_str(" nulls first"),
            NullPolicy::NullsLast => f.write_str(" nulls last"),
        }
    }
}

/// Total order over field values used for sorting.
///
/// Values of one type compare naturally, with NaN above every number. Values
/// of different types order by type: string, number, timestamp, enum, bool,
/// then null, so null compares greater than any value.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a.total_cmp(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Enum(a), Value::Enum(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value<'_>) -> u8 {
    match value {
        Value::String(_) => 0,
        Value::Number(_) => 1,
        Value::Timestamp(_) => 2,
        Value::Enum(_) => 3,
        Value::Bool(_) => 4,
        Value::None => 5,
    }
}

/// An ordered sequence of sort descriptors.
///
/// ```
/// use quarry::{Direction, SortChain};
///
/// # fn main() -> quarry::Result<()> {
/// let chain = SortChain::new()
///     .order_by("category", Direction::Ascending)?
///     .then_by("price", Direction::Descending)?
///     .nulls_last()?;
///
/// assert_eq!(chain.to_string(), "category asc, price desc nulls last");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortChain {
    descriptors: Vec<SortDescriptor>,
}

impl SortChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        SortChain::default()
    }

    /// Builds a chain from descriptors, validating every key.
    pub fn from_descriptors(descriptors: Vec<SortDescriptor>) -> Result<Self> {
        if descriptors.iter().any(|d| d.key.is_empty()) {
            return Err(SpecError::NullArgument {
                argument: "sort key",
            });
        }
        Ok(SortChain { descriptors })
    }

    /// Resets the chain to a single primary descriptor.
    pub fn order_by(mut self, key: impl Into<String>, direction: Direction) -> Result<Self> {
        let descriptor = Self::descriptor(key, direction)?;
        self.descriptors.clear();
        self.descriptors.push(descriptor);
        Ok(self)
    }

    /// Appends a tie-breaking descriptor.
    pub fn then_by(mut self, key: impl Into<String>, direction: Direction) -> Result<Self> {
        if self.descriptors.is_empty() {
            return Err(SpecError::MissingPrimarySort {
                operation: "then_by()",
            });
        }
        let descriptor = Self::descriptor(key, direction)?;
        self.descriptors.push(descriptor);
        Ok(self)
    }

    /// Puts nulls first for the most recently added descriptor.
    pub fn nulls_first(self) -> Result<Self> {
        self.set_last_nulls(NullPolicy::NullsFirst, "nulls_first()")
    }

    /// Puts nulls last for the most recently added descriptor.
    pub fn nulls_last(self) -> Result<Self> {
        self.set_last_nulls(NullPolicy::NullsLast, "nulls_last()")
    }

    fn set_last_nulls(mut self, nulls: NullPolicy, operation: &'static str) -> Result<Self> {
        let last = self
            .descriptors
            .last_mut()
            .ok_or(SpecError::MissingPrimarySort { operation })?;
        last.nulls = nulls;
        Ok(self)
    }

    fn descriptor(key: impl Into<String>, direction: Direction) -> Result<SortDescriptor> {
        let key = key.into();
        if key.is_empty() {
            return Err(SpecError::NullArgument {
                argument: "sort key",
            });
        }
        Ok(SortDescriptor::new(key, direction))
    }

    /// Returns the descriptors, primary first.
    pub fn descriptors(&self) -> &[SortDescriptor] {
        &self.descriptors
    }

    /// Returns `true` if no sort is set.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Returns the number of sort levels.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Lexicographic comparison over every level.
    pub fn compare<T: Entity + ?Sized>(&self, a: &T, b: &T) -> Ordering {
        compare_by_descriptors(&self.descriptors, a, b)
    }

    /// Stable sort of `items` by this chain.
    pub fn sort<T: Entity>(&self, items: &mut [T]) {
        if !self.is_empty() {
            items.sort_by(|a, b| self.compare(a, b));
        }
    }
}

impl fmt::Display for SortChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, descriptor) in self.descriptors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{descriptor}")?;
        }
        Ok(())
    }
}

/// Compares two entities using `descriptors` as successive tie-breakers.
pub fn compare_by_descriptors<T: Entity + ?Sized>(
    descriptors: &[SortDescriptor],
    a: &T,
    b: &T,
) -> Ordering {
    for descriptor in descriptors {
        let ordering = descriptor.compare(a, b);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        category: &'static str,
        price: i64,
        rating: Option<i64>,
    }

    impl Entity for Item {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "category" => Value::String(self.category),
                "price" => Value::Number(Number::I64(self.price)),
                "rating" => self.rating.map(Number::I64).into(),
                _ => Value::None,
            }
        }
    }

    fn item(category: &'static str, price: i64, rating: Option<i64>) -> Item {
        Item {
            category,
            price,
            rating,
        }
    }

    #[test]
    fn direction_apply() {
        assert_eq!(Direction::Ascending.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Direction::Descending.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Direction::Descending.apply(Ordering::Equal), Ordering::Equal);
    }

    #[test]
    fn compare_values_by_type() {
        assert_eq!(
            compare_values(&Value::String("a"), &Value::String("b")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Bool(false), &Value::Bool(true)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::None, &Value::String("a")),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&Value::String("a"), &Value::Number(Number::I64(1))),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Bool(true), &Value::Number(Number::I64(1))),
            Ordering::Greater
        );
    }

    #[derive(Debug)]
    struct Reading {
        id: usize,
        weight: f64,
    }

    impl Entity for Reading {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "weight" => Value::Number(Number::F64(self.weight)),
                _ => Value::None,
            }
        }
    }

    #[test]
    fn nan_does_not_disturb_the_other_values() {
        let mut readings: Vec<Reading> = (0..200)
            .map(|id| Reading {
                id,
                weight: if id % 4 == 1 {
                    f64::NAN
                } else {
                    ((id * 7919) % 211) as f64 - 100.5
                },
            })
            .collect();

        for direction in [Direction::Ascending, Direction::Descending] {
            let chain = SortChain::new().order_by("weight", direction).unwrap();
            chain.sort(&mut readings);

            let numbers: Vec<f64> = readings
                .iter()
                .map(|r| r.weight)
                .filter(|w| !w.is_nan())
                .collect();
            assert_eq!(numbers.len(), 150);
            assert!(
                numbers
                    .windows(2)
                    .all(|w| direction.apply(w[0].total_cmp(&w[1])).is_le()),
                "{direction} order broken by NaN"
            );

            let nans_at = readings.iter().position(|r| r.weight.is_nan()).unwrap();
            let nan_block = match direction {
                Direction::Ascending => &readings[nans_at..],
                Direction::Descending => &readings[..50],
            };
            assert!(nan_block.iter().all(|r| r.weight.is_nan()));
            assert!(nan_block.windows(2).all(|w| w[0].id < w[1].id));
        }
    }

    #[test]
    fn then_by_requires_primary() {
        let err = SortChain::new().then_by("price", Direction::Ascending).unwrap_err();
        assert!(matches!(
            err,
            SpecError::MissingPrimarySort {
                operation: "then_by()"
            }
        ));
        assert!(SortChain::new().nulls_first().is_err());
        assert!(SortChain::new().nulls_last().is_err());
    }

    #[test]
    fn empty_key_is_null_argument() {
        assert!(matches!(
            SortChain::new().order_by("", Direction::Ascending),
            Err(SpecError::NullArgument { argument: "sort key" })
        ));
    }

    #[test]
    fn order_by_resets_the_chain() {
        let chain = SortChain::new()
            .order_by("price", Direction::Ascending)
            .and_then(|c| c.then_by("category", Direction::Ascending))
            .and_then(|c| c.order_by("rating", Direction::Descending))
            .unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.descriptors()[0], SortDescriptor::desc("rating"));
    }

    #[test]
    fn null_policy_applies_to_last_descriptor_only() {
        let chain = SortChain::new()
            .order_by("category", Direction::Ascending)
            .and_then(|c| c.then_by("rating", Direction::Descending))
            .and_then(SortChain::nulls_first)
            .unwrap();
        assert_eq!(chain.descriptors()[0].nulls, NullPolicy::Unspecified);
        assert_eq!(chain.descriptors()[1].nulls, NullPolicy::NullsFirst);
    }

    #[test]
    fn three_levels_are_lexicographic() {
        let mut items = vec![
            item("b", 10, Some(1)),
            item("a", 5, Some(2)),
            item("a", 7, Some(1)),
            item("a", 7, Some(0)),
            item("b", 12, Some(3)),
        ];
        let chain = SortChain::new()
            .order_by("category", Direction::Ascending)
            .and_then(|c| c.then_by("price", Direction::Descending))
            .and_then(|c| c.then_by("rating", Direction::Ascending))
            .unwrap();

        chain.sort(&mut items);

        let keys: Vec<_> = items.iter().map(|i| (i.category, i.price, i.rating)).collect();
        assert_eq!(
            keys,
            [
                ("a", 7, Some(0)),
                ("a", 7, Some(1)),
                ("a", 5, Some(2)),
                ("b", 12, Some(3)),
                ("b", 10, Some(1)),
            ]
        );
    }

    #[test]
    fn nulls_first_ignores_direction() {
        for direction in [Direction::Ascending, Direction::Descending] {
            let mut items = vec![
                item("a", 1, Some(3)),
                item("a", 2, None),
                item("a", 3, Some(1)),
                item("a", 4, None),
            ];
            let chain = SortChain::new()
                .order_by("rating", direction)
                .and_then(SortChain::nulls_first)
                .unwrap();
            chain.sort(&mut items);

            assert!(items[0].rating.is_none() && items[1].rating.is_none());
            assert!(items[2..].iter().all(|i| i.rating.is_some()));
            // Stable among nulls.
            assert_eq!((items[0].price, items[1].price), (2, 4));
        }
    }

    #[test]
    fn nulls_last_ignores_direction() {
        for direction in [Direction::Ascending, Direction::Descending] {
            let mut items = vec![item("a", 1, None), item("a", 2, Some(5)), item("a", 3, Some(9))];
            let chain = SortChain::new()
                .order_by("rating", direction)
                .and_then(SortChain::nulls_last)
                .unwrap();
            chain.sort(&mut items);
            assert_eq!(items[2].rating, None);
        }
    }

    #[test]
    fn unspecified_nulls_follow_direction() {
        let mut items = vec![item("a", 1, None), item("a", 2, Some(5))];
        let desc = SortChain::new().order_by("rating", Direction::Descending).unwrap();
        desc.sort(&mut items);
        assert_eq!(items[0].rating, None);

        let asc = SortChain::new().order_by("rating", Direction::Ascending).unwrap();
        asc.sort(&mut items);
        assert_eq!(items[1].rating, None);
    }

    #[test]
    fn display_lists_levels() {
        let chain = SortChain::new()
            .order_by("category", Direction::Ascending)
            .and_then(|c| c.then_by("rating", Direction::Descending))
            .and_then(SortChain::nulls_first)
            .unwrap();
        assert_eq!(chain.to_string(), "category asc, rating desc nulls first");
    }
}
