use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub use crate::entity::enums::{Category, PaymentMethod, PaymentStatus};
use crate::entity::{menu_items, order_items, orders, users};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A purchasable menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogItem {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[schema(value_type = String, example = "50.00")]
    pub price: Decimal,
    pub category: Category,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    pub fn amount(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<menu_items::Model> for CatalogItem {
    fn from(model: menu_items::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            image_url: model.image_url,
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            total_amount: model.total_amount,
            payment_method: model.payment_method,
            payment_status: model.payment_status,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<order_items::Model> for OrderLine {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            menu_item_id: model.menu_item_id,
            quantity: model.quantity,
            price: model.price,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
