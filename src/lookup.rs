//! Consigner account lookup against the commerce platform
//!
//! Item SKUs follow the pattern `{account}-{item number}`. The lookup pulls
//! every variant under an account prefix and reports the highest item
//! number so a new intake knows where its numbering starts.

use crate::config::Config;
use crate::error::{IntakeError, Result};
use consign_common::types::{AccountItem, AccountSummary};
use serde::Deserialize;
use serde_json::json;

const API_VERSION: &str = "2024-01";

pub struct ShopifyLookup {
    client: reqwest::Client,
    store_url: String,
    access_token: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GraphQlResponse {
    data: Option<GraphQlData>,
    errors: Option<serde_json::Value>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct GraphQlData {
    product_variants: Connection,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Connection {
    edges: Vec<Edge>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Edge {
    node: VariantNode,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct VariantNode {
    sku: String,
    price: String,
    inventory_quantity: i64,
    product: ProductNode,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ProductNode {
    title: String,
}

impl ShopifyLookup {
    pub fn from_config(config: &Config) -> Result<Self> {
        let (store_url, access_token) = config.shopify_credentials()?;
        Ok(Self {
            client: reqwest::Client::new(),
            store_url,
            access_token,
        })
    }

    /// Search all variants under an account prefix and summarize them.
    pub async fn search_account(&self, account_number: &str) -> Result<AccountSummary> {
        let query = format!(
            r#"{{
  productVariants(first: 250, query: "sku:{}-*") {{
    edges {{
      node {{
        sku
        price
        inventoryQuantity
        product {{ title }}
      }}
    }}
  }}
}}"#,
            account_number
        );

        let url = format!(
            "https://{}/admin/api/{}/graphql.json",
            self.store_url, API_VERSION
        );

        let response = self
            .client
            .post(&url)
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| IntakeError::ApiCall(format!("Shopify request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(IntakeError::ApiCall(format!(
                "Shopify API error: HTTP {}",
                response.status()
            )));
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| IntakeError::ApiParse(format!("Shopify response: {}", e)))?;

        if let Some(errors) = body.errors {
            return Err(IntakeError::ApiCall(format!("GraphQL error: {}", errors)));
        }

        let edges = body.data.unwrap_or_default().product_variants.edges;
        let summary = summarize_variants(account_number, edges)?;
        Ok(summary)
    }
}

fn summarize_variants(account_number: &str, edges: Vec<Edge>) -> Result<AccountSummary> {
    let mut items: Vec<AccountItem> = edges
        .into_iter()
        .filter_map(|edge| {
            let node = edge.node;
            // SKUs that do not parse as "{account}-{number}" are ignored
            let item_number: u32 = node.sku.split('-').nth(1)?.parse().ok()?;
            Some(AccountItem {
                sku: node.sku,
                item_number,
                price: node.price,
                title: node.product.title,
                qty: node.inventory_quantity,
            })
        })
        .collect();

    if items.is_empty() {
        return Err(IntakeError::AccountNotFound(account_number.to_string()));
    }

    items.sort_by_key(|item| item.item_number);
    let highest = items.last().map(|item| item.item_number).unwrap_or(0);

    Ok(AccountSummary {
        account_number: account_number.to_string(),
        highest_item_number: highest,
        next_item_number: highest + 1,
        total_items: items.len(),
        items,
    })
}
