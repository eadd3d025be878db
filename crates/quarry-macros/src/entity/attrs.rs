//! Attribute parsing for the Entity derive macro.
//!
//! Parses the `#[query(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Ident, Lit, LitStr, Meta, Result, Token,
};

const KIND_NAMES: &str = "String, Number, Timestamp, Enum, Bool";

/// How a field is exposed to predicates and sort descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Timestamp,
    Enum,
    Bool,
}

impl FieldKind {
    fn parse(name: &str, span: Span) -> Result<Self> {
        match name {
            "String" | "string" => Ok(FieldKind::String),
            "Number" | "number" => Ok(FieldKind::Number),
            "Timestamp" | "timestamp" => Ok(FieldKind::Timestamp),
            "Enum" | "enum" | "enumeration" => Ok(FieldKind::Enum),
            "Bool" | "bool" | "boolean" => Ok(FieldKind::Bool),
            other => Err(Error::new(
                span,
                format!("unknown field kind '{other}'. Expected one of: {KIND_NAMES}"),
            )),
        }
    }

    fn from_ident(ident: &Ident) -> Result<Self> {
        FieldKind::parse(&ident.to_string(), ident.span())
    }
}

/// Field-level attributes from `#[query(...)]`.
#[derive(Debug, Clone)]
pub struct QueryAttr {
    pub kind: Option<FieldKind>,
    /// The field is an `Option<_>`; `None` reads as a null value.
    pub nullable: bool,
    /// The field is a relation: it gets a name constant for eager loading
    /// but is not readable by predicates.
    pub relation: bool,
    pub skip: bool,
    pub rename: Option<String>,
    pub span: Span,
}

impl Default for QueryAttr {
    fn default() -> Self {
        QueryAttr {
            kind: None,
            nullable: false,
            relation: false,
            skip: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl QueryAttr {
    fn validate(self) -> Result<Self> {
        if self.relation && self.kind.is_some() {
            return Err(Error::new(
                self.span,
                "a relation cannot also declare a field kind",
            ));
        }
        if self.nullable && self.kind.is_none() {
            return Err(Error::new(
                self.span,
                format!("nullable requires a field kind: {KIND_NAMES}"),
            ));
        }
        Ok(self)
    }
}

fn string_value(expr: &Expr, key: &str) -> Result<LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.clone()),
        _ => Err(Error::new(
            expr.span(),
            format!("{key} must be a string literal"),
        )),
    }
}

impl Parse for QueryAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = QueryAttr {
            span: input.span(),
            ..QueryAttr::default()
        };

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::Path(p) if p.is_ident("nullable") => attr.nullable = true,
                Meta::Path(p) if p.is_ident("relation") => attr.relation = true,
                Meta::Path(p) => {
                    let ident = p.get_ident().ok_or_else(|| {
                        Error::new(
                            p.span(),
                            format!("expected {KIND_NAMES}, nullable, relation or skip"),
                        )
                    })?;
                    attr.kind = Some(FieldKind::from_ident(ident)?);
                    attr.span = ident.span();
                }

                // `ty = "..."` covers kinds that collide with keywords.
                Meta::NameValue(nv) if nv.path.is_ident("ty") => {
                    let s = string_value(&nv.value, "ty")?;
                    attr.kind = Some(FieldKind::parse(&s.value(), s.span())?);
                    attr.span = s.span();
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    attr.rename = Some(string_value(&nv.value, "rename")?.value());
                }
                Meta::NameValue(nv) => {
                    return Err(Error::new(
                        nv.path.span(),
                        "unknown attribute. Expected: rename or ty",
                    ));
                }

                Meta::List(_) => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown query attribute. Expected a field kind, nullable, relation, skip, rename = \"...\" or ty = \"...\"",
                    ));
                }
            }
        }

        attr.validate()
    }
}

/// Extracts `#[query(...)]` from a field's attributes.
pub fn parse_query_attrs(attrs: &[Attribute]) -> Result<QueryAttr> {
    for attr in attrs {
        if attr.path().is_ident("query") {
            return attr.parse_args::<QueryAttr>();
        }
    }
    Ok(QueryAttr::default())
}
