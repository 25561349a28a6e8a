//! Storefront API query and response mapping

use giftwise_core::{CatalogError, Product};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PRODUCTS_QUERY: &str = r#"
query GiftFinderProducts($first: Int!) {
  products(first: $first, sortKey: BEST_SELLING) {
    edges {
      node {
        id
        title
        handle
        vendor
        productType
        tags
        description(truncateAt: 160)
        priceRange { minVariantPrice { amount currencyCode } }
        images(first: 1) { edges { node { url altText } } }
      }
    }
  }
}"#;

#[derive(Debug, Serialize)]
pub struct ProductsRequest {
    pub query: &'static str,
    pub variables: ProductsVariables,
}

#[derive(Debug, Serialize)]
pub struct ProductsVariables {
    pub first: usize,
}

impl ProductsRequest {
    pub fn new(first: usize) -> Self {
        Self { query: PRODUCTS_QUERY, variables: ProductsVariables { first } }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub data: Option<ProductsData>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductsData {
    #[serde(default)]
    pub products: Option<Connection<ProductNode>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub vendor: String,
    pub product_type: String,
    pub tags: Vec<String>,
    pub description: String,
    pub price_range: Option<PriceRange>,
    pub images: Option<Connection<ImageNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_variant_price: Option<Money>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    #[serde(default)]
    pub amount: Value,
    #[serde(default)]
    pub currency_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageNode {
    pub url: Option<String>,
}

/// Maps a decoded response to products. A response carrying only errors is a
/// rejected query; a response with data but no products is an empty catalog.
pub fn products_from_response(
    response: ProductsResponse,
    default_currency: &str,
) -> Result<Vec<Product>, CatalogError> {
    let products = match (response.data, response.errors) {
        (Some(data), _) => data.products,
        (None, Some(errors)) if !errors.is_empty() => {
            let messages: Vec<String> = errors.into_iter().map(|error| error.message).collect();
            return Err(CatalogError::Query(messages.join("; ")));
        }
        (None, _) => None,
    };

    Ok(products
        .map(|connection| connection.edges)
        .unwrap_or_default()
        .into_iter()
        .map(|edge| product_from_node(edge.node, default_currency))
        .collect())
}

fn product_from_node(node: ProductNode, default_currency: &str) -> Product {
    let price = node.price_range.and_then(|range| range.min_variant_price);
    let amount = price.as_ref().map(|money| parse_amount(&money.amount)).unwrap_or(0.0);
    let currency = price
        .and_then(|money| money.currency_code)
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| default_currency.to_string());
    let image = node
        .images
        .and_then(|images| images.edges.into_iter().next())
        .and_then(|edge| edge.node.url)
        .filter(|url| !url.is_empty());

    Product {
        id: node.id,
        handle: node.handle,
        title: node.title,
        vendor: node.vendor,
        product_type: node.product_type,
        tags: node.tags,
        description: node.description,
        price: amount,
        currency,
        image,
    }
}

/// Storefront money amounts arrive as decimal strings; anything unreadable is 0.
fn parse_amount(value: &Value) -> f64 {
    let amount = match value {
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Number(number) => number.as_f64(),
        _ => None,
    };
    amount.filter(|amount| amount.is_finite()).unwrap_or(0.0)
}
