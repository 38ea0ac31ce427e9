use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::cart::{AddToCartRequest, CartRequest, CartSummary, RemoveFromCartRequest},
    error::AppResult,
    response::ApiResponse,
    services::{cart_service, menu_service::SeaOrmCatalog},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items", post(add_to_cart))
        .route("/items/remove", post(remove_from_cart))
        .route("/summary", post(cart_summary))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Updated cart with confirmation message", body = ApiResponse<CartSummary>),
        (status = 400, description = "Invalid cart or unknown item"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let catalog = SeaOrmCatalog::new(&state.orm);
    let resp = cart_service::add_to_cart(&catalog, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/items/remove",
    request_body = RemoveFromCartRequest,
    responses(
        (status = 200, description = "Updated cart", body = ApiResponse<CartSummary>),
        (status = 404, description = "Item not in cart"),
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    Json(payload): Json<RemoveFromCartRequest>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    Ok(Json(cart_service::remove_from_cart(payload)?))
}

#[utoipa::path(
    post,
    path = "/api/cart/summary",
    request_body = CartRequest,
    responses(
        (status = 200, description = "Cart total and item count", body = ApiResponse<CartSummary>),
        (status = 400, description = "Invalid cart"),
    ),
    tag = "Cart"
)]
pub async fn cart_summary(
    Json(payload): Json<CartRequest>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    Ok(Json(cart_service::summarize(payload)?))
}
