//! Request identity for storefront services.
//!
//! The gateway authenticates users and forwards their id in a header; anonymous
//! shoppers are tracked through the cart-session cookie. This crate provides the
//! extractors for the former and the cookie builders for the latter.

pub mod cookie;
pub mod identity;
