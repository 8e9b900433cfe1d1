//! Domain types shared across storefront crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; handlers only use it for query parsing.

pub mod catalog;
pub mod pagination;
