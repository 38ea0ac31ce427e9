//! Session-local cart.
//!
//! The cart is never stored on the server. Clients send it with every request
//! that needs it and receive the updated value back, so ownership moves with
//! each handoff.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::CatalogItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub quantity: u32,
}

impl CartLine {
    pub fn amount(&self) -> Decimal {
        self.item.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Most units of one item a single order may hold.
pub const MAX_QUANTITY: u32 = 1_000;

// `menu_items.price` is NUMERIC(10,2) and `orders.total_amount` NUMERIC(12,2).
const MAX_PRICE_CENTS: i64 = 99_999_999_99;
const MAX_TOTAL_CENTS: i64 = 9_999_999_999_99;
const PRICE_SCALE: u32 = 2;

pub fn max_unit_price() -> Decimal {
    Decimal::new(MAX_PRICE_CENTS, PRICE_SCALE)
}

pub fn max_total() -> Decimal {
    Decimal::new(MAX_TOTAL_CENTS, PRICE_SCALE)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity for item {0} must be greater than 0")]
    ZeroQuantity(Uuid),

    #[error("quantity for item {0} must not exceed {max}", max = MAX_QUANTITY)]
    QuantityTooLarge(Uuid),

    #[error("price for item {0} must not be negative")]
    NegativePrice(Uuid),

    #[error("price for item {0} exceeds {max}", max = max_unit_price())]
    PriceTooLarge(Uuid),

    #[error("price for item {0} has more than two decimal places")]
    PricePrecision(Uuid),

    #[error("item {0} appears more than once in the cart")]
    DuplicateLine(Uuid),

    #[error("cart total exceeds {max}", max = max_total())]
    TotalTooLarge,
}

fn check_price(item: &CatalogItem) -> Result<(), CartError> {
    if item.price < Decimal::ZERO {
        return Err(CartError::NegativePrice(item.id));
    }
    if item.price > max_unit_price() {
        return Err(CartError::PriceTooLarge(item.id));
    }
    if item.price.normalize().scale() > PRICE_SCALE {
        return Err(CartError::PricePrecision(item.id));
    }
    Ok(())
}

/// Ordered cart lines, at most one per catalog item.
///
/// Every price fits the menu's money column, every quantity lies in
/// `1..=MAX_QUANTITY` and the total fits the order's money column, so line
/// amounts and totals never overflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct Cart {
    #[schema(value_type = Vec<CartLine>)]
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `item` and returns the confirmation shown to the user.
    /// The cart is left unchanged when the extra unit would break a limit.
    pub fn add(&mut self, item: CatalogItem) -> Result<String, CartError> {
        check_price(&item)?;
        if self.total().saturating_add(item.price) > max_total() {
            return Err(CartError::TotalTooLarge);
        }

        let message = format!("{} added to cart", item.name);
        match self.lines.iter_mut().find(|line| line.item.id == item.id) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(1)
                    .filter(|quantity| *quantity <= MAX_QUANTITY)
                    .ok_or(CartError::QuantityTooLarge(item.id))?;
            }
            None => self.lines.push(CartLine { item, quantity: 1 }),
        }
        Ok(message)
    }

    /// Drops the whole line for `item_id`. Returns whether a line was removed.
    pub fn remove(&mut self, item_id: Uuid) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.item.id != item_id);
        self.lines.len() != before
    }

    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |sum, line| sum.saturating_add(line.amount()))
    }

    pub fn count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl TryFrom<Vec<CartLine>> for Cart {
    type Error = CartError;

    fn try_from(lines: Vec<CartLine>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(lines.len());
        for line in &lines {
            if line.quantity == 0 {
                return Err(CartError::ZeroQuantity(line.item.id));
            }
            if line.quantity > MAX_QUANTITY {
                return Err(CartError::QuantityTooLarge(line.item.id));
            }
            check_price(&line.item)?;
            if !seen.insert(line.item.id) {
                return Err(CartError::DuplicateLine(line.item.id));
            }
        }

        let cart = Self { lines };
        if cart.total() > max_total() {
            return Err(CartError::TotalTooLarge);
        }
        Ok(cart)
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
