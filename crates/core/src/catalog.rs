use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::product::Product;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("catalog responded with status {0}")]
    Status(u16),
    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
    #[error("catalog query rejected: {0}")]
    Query(String),
}

/// Read-only source of candidate products, best sellers first.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_products(&self, limit: usize) -> Result<Vec<Product>, CatalogError>;
}

/// Products fetched for one request, indexed by handle.
#[derive(Default)]
pub struct Catalog {
    products: Vec<Product>,
    by_handle: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        // later duplicates shadow earlier ones
        let by_handle = products
            .iter()
            .enumerate()
            .map(|(index, product)| (product.handle.clone(), index))
            .collect();
        Self { products, by_handle }
    }

    pub fn find(&self, handle: &str) -> Option<&Product> {
        self.by_handle.get(handle).map(|index| &self.products[*index])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn handles(&self) -> Vec<&str> {
        self.products.iter().map(|product| product.handle.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
