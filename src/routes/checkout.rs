use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::{
        cart::CartRequest,
        checkout::{CheckoutRequest, CheckoutView},
    },
    error::AppResult,
    handoff::ReceiptHandoff,
    middleware::auth::Session,
    response::ApiResponse,
    services::checkout_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout))
        .route("/preview", post(preview))
}

#[utoipa::path(
    post,
    path = "/api/checkout/preview",
    request_body = CartRequest,
    responses(
        (status = 200, description = "Checkout summary or empty-cart notice", body = ApiResponse<CheckoutView>),
        (status = 400, description = "Invalid cart"),
    ),
    tag = "Checkout"
)]
pub async fn preview(Json(payload): Json<CartRequest>) -> AppResult<Json<ApiResponse<CheckoutView>>> {
    Ok(Json(checkout_service::checkout_preview(payload)?))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order placed; receipt handoff", body = ApiResponse<ReceiptHandoff>),
        (status = 400, description = "Empty cart or no payment method"),
        (status = 401, description = "Not signed in"),
        (status = 402, description = "Payment declined"),
        (status = 409, description = "A checkout is already in progress"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<ReceiptHandoff>>> {
    let resp = checkout_service::checkout(&state, &session, payload).await?;
    Ok(Json(resp))
}
