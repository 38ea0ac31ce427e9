use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    cart::Cart,
    dto::orders::{OrderList, OrderWithLines},
    entity::{
        order_items::{self, ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{self, ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderLine, PaymentMethod, PaymentStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
};

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderLine {
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

impl NewOrderLine {
    /// One line per cart line, priced at the cart's unit price.
    pub fn for_cart(order_id: Uuid, cart: &Cart) -> AppResult<Vec<Self>> {
        cart.lines()
            .iter()
            .map(|line| {
                let quantity = i32::try_from(line.quantity).map_err(|_| {
                    AppError::BadRequest(format!("quantity too large for item {}", line.item.id))
                })?;
                Ok(Self {
                    order_id,
                    menu_item_id: line.item.id,
                    quantity,
                    price: line.item.price,
                })
            })
            .collect()
    }
}

/// Persistence for orders and their lines.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> AppResult<Order>;

    async fn create_order_lines(&self, lines: Vec<NewOrderLine>) -> AppResult<Vec<OrderLine>>;

    /// Writes the order, then its lines. Stores without transactions leave
    /// the order behind if the line insert fails.
    async fn place_order(&self, order: NewOrder, cart: &Cart) -> AppResult<OrderWithLines> {
        let order = self.create_order(order).await?;
        let lines = NewOrderLine::for_cart(order.id, cart)?;
        let items = self.create_order_lines(lines).await?;
        Ok(OrderWithLines { order, items })
    }
}

pub struct SeaOrmOrderStore<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SeaOrmOrderStore<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

async fn insert_order<C: ConnectionTrait>(db: &C, new: NewOrder) -> Result<orders::Model, DbErr> {
    OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(new.user_id),
        total_amount: Set(new.total_amount),
        payment_method: Set(new.payment_method),
        payment_status: Set(new.payment_status),
        created_at: NotSet,
    }
    .insert(db)
    .await
}

async fn insert_lines<C: ConnectionTrait>(
    db: &C,
    lines: Vec<NewOrderLine>,
) -> Result<Vec<order_items::Model>, DbErr> {
    let mut inserted = Vec::with_capacity(lines.len());
    for line in lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(line.order_id),
            menu_item_id: Set(line.menu_item_id),
            quantity: Set(line.quantity),
            price: Set(line.price),
            created_at: NotSet,
        }
        .insert(db)
        .await?;
        inserted.push(item);
    }
    Ok(inserted)
}

#[async_trait]
impl OrderStore for SeaOrmOrderStore<'_> {
    async fn create_order(&self, order: NewOrder) -> AppResult<Order> {
        Ok(insert_order(self.db, order).await?.into())
    }

    async fn create_order_lines(&self, lines: Vec<NewOrderLine>) -> AppResult<Vec<OrderLine>> {
        let inserted = insert_lines(self.db, lines).await?;
        Ok(inserted.into_iter().map(OrderLine::from).collect())
    }

    // Both inserts share one transaction so a failed line insert leaves no
    // orphaned order.
    async fn place_order(&self, order: NewOrder, cart: &Cart) -> AppResult<OrderWithLines> {
        let txn = self.db.begin().await?;

        let order = insert_order(&txn, order).await?;
        let lines = NewOrderLine::for_cart(order.id, cart)?;
        let items = insert_lines(&txn, lines).await?;

        txn.commit().await?;

        Ok(OrderWithLines {
            order: order.into(),
            items: items.into_iter().map(OrderLine::from).collect(),
        })
    }
}

pub async fn list_orders(
    db: &DatabaseConnection,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(db).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(db)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    db: &DatabaseConnection,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithLines>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(db)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(OrderLine::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithLines {
            order: order.into(),
            items,
        },
        Some(Meta::empty()),
    ))
}
