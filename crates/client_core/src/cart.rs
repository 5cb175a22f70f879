use async_trait::async_trait;
use shared::{
    domain::ItemId,
    protocol::{AddToCartRequest, CartSnapshot},
};

use crate::{
    error::ClientError,
    http::{carts_route, HttpStorefront},
    session::AuthToken,
};

#[async_trait]
pub trait CartApi: Send + Sync {
    /// Side effect only; the cart state the backend echoes back is ignored.
    async fn add_to_cart(&self, item_id: &ItemId, token: &AuthToken) -> Result<(), ClientError>;

    async fn get_cart(&self, token: &AuthToken) -> Result<CartSnapshot, ClientError>;
}

#[async_trait]
impl CartApi for HttpStorefront {
    async fn add_to_cart(&self, item_id: &ItemId, token: &AuthToken) -> Result<(), ClientError> {
        self.post_json(
            carts_route(),
            Some(token),
            &AddToCartRequest {
                item_id: item_id.clone(),
            },
            "failed to add item to cart",
        )
        .await
    }

    async fn get_cart(&self, token: &AuthToken) -> Result<CartSnapshot, ClientError> {
        self.get_json(carts_route(), Some(token), "failed to fetch cart items")
            .await
    }
}

/// One line per cart entry, as shown when the user views the cart.
pub fn describe_cart(cart: &CartSnapshot) -> Vec<String> {
    let cart_id = cart
        .cart_id
        .as_ref()
        .map_or_else(|| "none".to_string(), ToString::to_string);
    cart.items
        .iter()
        .map(|line| format!("cart_id: {cart_id}, item_id: {}", line.item_id))
        .collect()
}
