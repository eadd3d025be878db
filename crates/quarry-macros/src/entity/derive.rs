//! Implementation of `#[derive(Entity)]`.
//!
//! Generates field name constants and an `Entity` impl that maps each
//! annotated field to a `quarry::Value`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_query_attrs, FieldKind};

pub fn entity_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Entity can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Entity can only be derived for structs",
            ))
        }
    };

    let mut field_arms: Vec<TokenStream> = Vec::new();
    let mut constants: Vec<TokenStream> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_query_attrs(&field.attrs)?;
        if attrs.skip || (attrs.kind.is_none() && !attrs.relation) {
            continue;
        }

        let query_name = attrs.rename.unwrap_or_else(|| field_name.to_string());
        let const_name = format_ident!("{}", to_screaming_snake_case(&query_name));
        let doc = if attrs.relation {
            format!("Eager-load path for `{field_name}`.")
        } else {
            format!("Query name of `{field_name}`.")
        };
        constants.push(quote! {
            #[doc = #doc]
            pub const #const_name: &'static str = #query_name;
        });

        let Some(kind) = attrs.kind else {
            continue;
        };
        let read = value_expr(kind);
        let arm = if attrs.nullable {
            quote! {
                #query_name => match &self.#field_name {
                    ::core::option::Option::Some(value) => #read,
                    ::core::option::Option::None => ::quarry::Value::None,
                },
            }
        } else {
            quote! {
                #query_name => {
                    let value = &self.#field_name;
                    #read
                }
            }
        };
        field_arms.push(arm);
    }

    Ok(quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#constants)*
        }

        impl #impl_generics ::quarry::Entity for #struct_name #ty_generics #where_clause {
            fn field_value(&self, field: &str) -> ::quarry::Value<'_> {
                match field {
                    #(#field_arms)*
                    _ => ::quarry::Value::None,
                }
            }
        }
    })
}

/// Reads `value: &FieldType` as a `quarry::Value`.
fn value_expr(kind: FieldKind) -> TokenStream {
    match kind {
        FieldKind::String => quote! {
            ::quarry::Value::String(::core::convert::AsRef::<str>::as_ref(value))
        },
        FieldKind::Number => quote! {
            ::quarry::Value::Number(::quarry::Number::from(*value))
        },
        FieldKind::Timestamp => quote! {
            ::quarry::Value::Timestamp(::quarry::EntityTimestamp::timestamp(value))
        },
        FieldKind::Enum => quote! {
            ::quarry::Value::Enum(::quarry::EntityEnum::discriminant(value))
        },
        FieldKind::Bool => quote! {
            ::quarry::Value::Bool(*value)
        },
    }
}

fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == '.' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_alphanumeric();
        }
    }

    result
}
