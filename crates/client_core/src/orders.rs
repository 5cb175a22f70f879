use async_trait::async_trait;
use shared::{
    domain::CartId,
    protocol::{CreateOrderRequest, OrderSummary},
};
use tracing::{debug, info};

use crate::{
    cart::CartApi,
    error::ClientError,
    http::{orders_route, HttpStorefront},
    session::AuthToken,
};

#[async_trait]
pub trait OrderApi: CartApi {
    async fn create_order(&self, cart_id: &CartId, token: &AuthToken) -> Result<(), ClientError>;

    async fn list_orders(&self, token: &AuthToken) -> Result<Vec<OrderSummary>, ClientError>;

    /// Fetches the cart, then orders it. Returns the cart id the order was
    /// placed against.
    ///
    /// The two calls are not atomic: the cart can change between them and the
    /// order is still created for whatever the backend holds under that id.
    async fn checkout(&self, token: &AuthToken) -> Result<CartId, ClientError> {
        let cart = self.get_cart(token).await?;
        let Some(cart_id) = cart.cart_id else {
            debug!("checkout aborted: no cart");
            return Err(ClientError::NoCart);
        };
        self.create_order(&cart_id, token).await?;
        info!(%cart_id, "order placed");
        Ok(cart_id)
    }
}

#[async_trait]
impl OrderApi for HttpStorefront {
    async fn create_order(&self, cart_id: &CartId, token: &AuthToken) -> Result<(), ClientError> {
        self.post_json(
            orders_route(),
            Some(token),
            &CreateOrderRequest {
                cart_id: cart_id.clone(),
            },
            "failed to create order",
        )
        .await
    }

    async fn list_orders(&self, token: &AuthToken) -> Result<Vec<OrderSummary>, ClientError> {
        // An empty history may arrive as `null`.
        let orders: Option<Vec<OrderSummary>> = self
            .get_json(orders_route(), Some(token), "failed to fetch orders")
            .await?;
        Ok(orders.unwrap_or_default())
    }
}

pub fn describe_orders(orders: &[OrderSummary]) -> Vec<String> {
    orders
        .iter()
        .map(|order| format!("Order id: {}", order.id))
        .collect()
}
