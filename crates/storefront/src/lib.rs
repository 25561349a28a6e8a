//! Storefront GraphQL catalog: fetches best-selling products and maps them
//! into [`giftwise_core::Product`] values.

pub mod client;
pub mod graphql;

pub use client::{StorefrontClient, StorefrontClientError};
