//! Service plumbing shared by storefront binaries: configuration loading,
//! tracing setup, HTTP middleware, health probes and serialization helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
