use uuid::Uuid;

use crate::{
    cart::Cart,
    dto::cart::{AddToCartRequest, CartRequest, CartSummary, RemoveFromCartRequest},
    error::{AppError, AppResult},
    response::ApiResponse,
    services::menu_service::CatalogStore,
};

/// Adds one unit of a menu item to the cart carried in the request.
pub async fn add_to_cart<C>(
    catalog: &C,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartSummary>>
where
    C: CatalogStore + ?Sized,
{
    let mut cart = Cart::try_from(payload.cart)?;
    let item = catalog
        .get_item(payload.item_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let message = cart.add(item)?;
    tracing::debug!(item_id = %payload.item_id, count = cart.count(), "cart updated");

    Ok(ApiResponse::success(message, CartSummary::from(cart), None))
}

pub fn remove_from_cart(payload: RemoveFromCartRequest) -> AppResult<ApiResponse<CartSummary>> {
    let mut cart = Cart::try_from(payload.cart)?;
    if !cart.remove(payload.item_id) {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::success(
        "Removed from cart",
        CartSummary::from(cart),
        None,
    ))
}

pub fn summarize(payload: CartRequest) -> AppResult<ApiResponse<CartSummary>> {
    let cart = Cart::try_from(payload.cart)?;
    Ok(ApiResponse::success("OK", CartSummary::from(cart), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cart::{CartError, CartLine, MAX_QUANTITY, tests::item},
        services::menu_service::tests::FakeCatalog,
    };
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn add_twice_through_handoff_increments_quantity() {
        let dosa = item("Masala Dosa", dec!(50));
        let catalog = FakeCatalog::new(vec![dosa.clone()]);

        let first = add_to_cart(
            &catalog,
            AddToCartRequest {
                cart: vec![],
                item_id: dosa.id,
            },
        )
        .await
        .unwrap();
        assert_eq!(first.message, "Masala Dosa added to cart");

        let cart: Vec<_> = first.data.unwrap().cart.into();
        let second = add_to_cart(
            &catalog,
            AddToCartRequest {
                cart,
                item_id: dosa.id,
            },
        )
        .await
        .unwrap();

        let summary = second.data.unwrap();
        assert_eq!(summary.cart.len(), 1);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total, dec!(100));
        assert_eq!(summary.cart.lines()[0].item.id, dosa.id);
    }

    #[tokio::test]
    async fn adding_unknown_item_is_rejected() {
        let catalog = FakeCatalog::new(vec![]);
        let err = add_to_cart(
            &catalog,
            AddToCartRequest {
                cart: vec![],
                item_id: Uuid::new_v4(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn adding_past_quantity_cap_is_rejected() {
        let dosa = item("Masala Dosa", dec!(50));
        let catalog = FakeCatalog::new(vec![dosa.clone()]);

        for quantity in [u32::MAX, MAX_QUANTITY] {
            let err = add_to_cart(
                &catalog,
                AddToCartRequest {
                    cart: vec![CartLine {
                        item: dosa.clone(),
                        quantity,
                    }],
                    item_id: dosa.id,
                },
            )
            .await
            .unwrap_err();
            assert!(matches!(
                err,
                AppError::InvalidCart(CartError::QuantityTooLarge(id)) if id == dosa.id
            ));
        }
    }

    #[test]
    fn removing_absent_line_is_not_found() {
        let err = remove_from_cart(RemoveFromCartRequest {
            cart: vec![],
            item_id: Uuid::new_v4(),
        })
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
