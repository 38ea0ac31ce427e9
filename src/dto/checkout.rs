use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{cart::CartLine, models::PaymentMethod};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub cart: Vec<CartLine>,
    /// One of `paytm`, `gpay`, `phonepe`, `upi`.
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentMethodOption {
    pub id: PaymentMethod,
    pub name: String,
}

impl From<PaymentMethod> for PaymentMethodOption {
    fn from(method: PaymentMethod) -> Self {
        Self {
            id: method,
            name: method.display_name().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutLine {
    pub name: String,
    pub quantity: u32,
    #[schema(value_type = String)]
    pub amount: Decimal,
}

/// What the checkout page shows for a given cart.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckoutView {
    EmptyCart {
        message: String,
        redirect_to: String,
    },
    Ready {
        lines: Vec<CheckoutLine>,
        #[schema(value_type = String)]
        total: Decimal,
        payment_methods: Vec<PaymentMethodOption>,
    },
}
