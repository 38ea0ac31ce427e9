use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::{Cart, CartLine};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CartRequest {
    #[serde(default)]
    pub cart: Vec<CartLine>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    #[serde(default)]
    pub cart: Vec<CartLine>,
    pub item_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveFromCartRequest {
    #[serde(default)]
    pub cart: Vec<CartLine>,
    pub item_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartSummary {
    pub cart: Cart,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub count: u64,
}

impl From<Cart> for CartSummary {
    fn from(cart: Cart) -> Self {
        Self {
            total: cart.total(),
            count: cart.count(),
            cart,
        }
    }
}
