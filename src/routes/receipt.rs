use axum::{Json, Router, routing::post};

use crate::{
    dto::receipt::{ReceiptRequest, ReceiptView},
    response::ApiResponse,
    services::receipt_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(view_receipt))
}

#[utoipa::path(
    post,
    path = "/api/receipt",
    request_body(content = ReceiptRequest, description = "Handoff returned by checkout; may be omitted"),
    responses(
        (status = 200, description = "Completed receipt or invalid-access notice", body = ApiResponse<ReceiptView>)
    ),
    tag = "Receipt"
)]
pub async fn view_receipt(payload: Option<Json<ReceiptRequest>>) -> Json<ApiResponse<ReceiptView>> {
    Json(receipt_service::view_receipt(payload.map(|Json(p)| p)))
}
