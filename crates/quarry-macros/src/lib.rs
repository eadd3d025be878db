//! Proc macros for quarry.
//!
//! - [`Entity`] - Generate an `Entity` impl and field name constants
//!
//! # Examples
//!
//! For working examples, see `quarry/tests/entity_derive.rs`.

mod entity;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `quarry::Entity` for structs with named fields.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `String` | String field (`String`, `&str`, anything `AsRef<str>`) |
/// | `Number` | Numeric field (any primitive integer or float) |
/// | `Timestamp` | Timestamp field, requires an `EntityTimestamp` impl |
/// | `Enum` | Enum field, requires an `EntityEnum` impl |
/// | `Bool` | Boolean field |
/// | `nullable` | The field is an `Option` of the declared kind; `None` reads as null |
/// | `relation` | Name constant only, for `include()`; not readable by predicates |
/// | `skip` | Exclude this field |
/// | `rename = "..."` | Use a custom name in queries |
/// | `ty = "..."` | Kind as a string, for kinds that are keywords (`"enum"`, `"bool"`) |
///
/// Fields without a `#[query]` attribute are ignored.
///
/// # Generated Code
///
/// 1. A name constant per field (e.g. `Product::UNIT_PRICE`)
/// 2. `Entity::field_value()`, returning `Value::None` for unknown names
///
/// # Example
///
/// ```ignore
/// use quarry::{Clause, Direction, Specification};
/// use quarry_macros::Entity;
///
/// #[derive(Entity)]
/// struct Product {
///     #[query(String)]
///     category: String,
///     #[query(Number, nullable)]
///     price: Option<u32>,
///     #[query(relation)]
///     supplier: Supplier,
/// }
///
/// let spec = Specification::<Product>::builder()
///     .where_(Clause::gt(Product::PRICE, 100))?
///     .order_by(Product::CATEGORY, Direction::Ascending)?
///     .include(Product::SUPPLIER)?
///     .build();
/// ```
#[proc_macro_derive(Entity, attributes(query))]
pub fn entity_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::entity_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
