use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{cart::CartLine, models::PaymentMethod};

/// Raw receipt payload as it arrives from the client. Every field is optional
/// so a missing order id renders a notice instead of a rejection.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReceiptRequest {
    #[serde(default)]
    pub order_id: Option<Uuid>,
    #[serde(default)]
    pub cart: Option<Vec<CartLine>>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct ReceiptLine {
    pub name: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub quantity: u32,
    #[schema(value_type = String)]
    pub amount: Decimal,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReceiptView {
    Completed {
        order_id: Uuid,
        order_ref: String,
        payment_method: PaymentMethod,
        payment_method_name: String,
        lines: Vec<ReceiptLine>,
        #[schema(value_type = String)]
        total_paid: Decimal,
        message: String,
    },
    InvalidAccess {
        message: String,
        redirect_to: String,
    },
}
