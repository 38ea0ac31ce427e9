use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderList, OrderWithLines},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/{id}", get(get_order))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("sort_order" = Option<String>, Query, description = "asc or desc by creation time, default desc")
    ),
    responses(
        (status = 200, description = "Orders of the current user", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state.orm, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with its lines", body = ApiResponse<OrderWithLines>),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithLines>>> {
    let resp = order_service::get_order(&state.orm, &user, id).await?;
    Ok(Json(resp))
}
