//! Validated payloads passed between steps of the ordering flow.
//!
//! Raw request bodies are converted with `TryFrom` at the boundary, so the
//! services only ever see well-formed handoffs.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    cart::{Cart, CartError},
    dto::{cart::CartRequest, receipt::ReceiptRequest},
    models::PaymentMethod,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandoffError {
    #[error("no order information found")]
    MissingOrderId,

    #[error("handoff is missing `{0}`")]
    MissingField(&'static str),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("total {claimed} does not match cart total {actual}")]
    TotalMismatch { claimed: Decimal, actual: Decimal },
}

/// Cart → checkout.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CheckoutHandoff {
    pub cart: Cart,
}

impl TryFrom<CartRequest> for CheckoutHandoff {
    type Error = CartError;

    fn try_from(req: CartRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            cart: Cart::try_from(req.cart)?,
        })
    }
}

/// Checkout → receipt.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReceiptHandoff {
    pub order_id: Uuid,
    pub cart: Cart,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub payment_method: PaymentMethod,
}

impl TryFrom<ReceiptRequest> for ReceiptHandoff {
    type Error = HandoffError;

    fn try_from(req: ReceiptRequest) -> Result<Self, Self::Error> {
        let order_id = req.order_id.ok_or(HandoffError::MissingOrderId)?;
        let cart = Cart::try_from(req.cart.ok_or(HandoffError::MissingField("cart"))?)?;
        let total = req.total.ok_or(HandoffError::MissingField("total"))?;
        let payment_method = req
            .payment_method
            .ok_or(HandoffError::MissingField("payment_method"))?;

        let actual = cart.total();
        if total != actual {
            return Err(HandoffError::TotalMismatch {
                claimed: total,
                actual,
            });
        }

        Ok(Self {
            order_id,
            cart,
            total,
            payment_method,
        })
    }
}

impl From<ReceiptHandoff> for ReceiptRequest {
    fn from(handoff: ReceiptHandoff) -> Self {
        Self {
            order_id: Some(handoff.order_id),
            cart: Some(handoff.cart.into()),
            total: Some(handoff.total),
            payment_method: Some(handoff.payment_method),
        }
    }
}
