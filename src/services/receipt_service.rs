use crate::{
    dto::receipt::{ReceiptLine, ReceiptRequest, ReceiptView},
    handoff::ReceiptHandoff,
    response::ApiResponse,
    services::checkout_service::MENU_PATH,
};

pub const THANK_YOU_MESSAGE: &str =
    "Thank you for your order! Your food will be prepared shortly.";
pub const INVALID_ACCESS_MESSAGE: &str = "No order information found.";

/// Upper-cased first eight characters of the order id.
pub fn order_ref(handoff: &ReceiptHandoff) -> String {
    handoff
        .order_id
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase()
}

pub fn render(handoff: &ReceiptHandoff) -> ReceiptView {
    ReceiptView::Completed {
        order_id: handoff.order_id,
        order_ref: order_ref(handoff),
        payment_method: handoff.payment_method,
        payment_method_name: handoff.payment_method.display_name().to_string(),
        lines: handoff
            .cart
            .lines()
            .iter()
            .map(|line| ReceiptLine {
                name: line.item.name.clone(),
                price: line.item.price,
                quantity: line.quantity,
                amount: line.amount(),
            })
            .collect(),
        total_paid: handoff.total,
        message: THANK_YOU_MESSAGE.to_string(),
    }
}

/// Renders whatever the client handed over. Anything that does not form a
/// valid handoff renders the invalid-access notice.
pub fn view_receipt(payload: Option<ReceiptRequest>) -> ApiResponse<ReceiptView> {
    let payload = payload.unwrap_or_default();
    match ReceiptHandoff::try_from(payload) {
        Ok(handoff) => ApiResponse::success("Order Successful!", render(&handoff), None),
        Err(err) => {
            tracing::debug!(error = %err, "receipt requested without a valid handoff");
            ApiResponse::success(
                "Invalid Access",
                ReceiptView::InvalidAccess {
                    message: INVALID_ACCESS_MESSAGE.to_string(),
                    redirect_to: MENU_PATH.to_string(),
                },
                None,
            )
        }
    }
}
