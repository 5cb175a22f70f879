use async_trait::async_trait;
use shared::{domain::ItemId, protocol::Item};

use crate::{
    error::ClientError,
    http::{items_route, HttpStorefront},
};

pub const DESCRIPTION_PLACEHOLDER: &str = "No description available";

#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Items in the order the backend returns them.
    async fn list_items(&self) -> Result<Vec<Item>, ClientError>;
}

#[async_trait]
impl CatalogApi for HttpStorefront {
    async fn list_items(&self) -> Result<Vec<Item>, ClientError> {
        let items: Option<Vec<Item>> = self
            .get_json(items_route(), None, "failed to fetch items")
            .await?;
        Ok(items.unwrap_or_default())
    }
}

/// An item as the catalog screen shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price_label: String,
}

impl From<&Item> for CatalogEntry {
    fn from(item: &Item) -> Self {
        let description = item
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(DESCRIPTION_PLACEHOLDER);
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: description.to_string(),
            price_label: price_label(item.price),
        }
    }
}

/// `10` renders as `₹10`, `12.5` as `₹12.5`.
pub fn price_label(price: f64) -> String {
    format!("₹{price}")
}
