//! `#[derive(Entity)]`: field constants and an `Entity` impl from
//! `#[query(...)]` annotations.

mod attrs;
mod derive;

pub use derive::entity_derive_impl;
