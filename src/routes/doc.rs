use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::CartLine,
    dto::{
        auth::{LoginRequest, LoginResponse, MeResponse, RegisterRequest},
        cart::{AddToCartRequest, CartRequest, CartSummary, RemoveFromCartRequest},
        checkout::{CheckoutLine, CheckoutRequest, CheckoutView, PaymentMethodOption},
        menu::MenuList,
        orders::{OrderList, OrderWithLines},
        receipt::{ReceiptLine, ReceiptRequest, ReceiptView},
    },
    handoff::ReceiptHandoff,
    models::{CatalogItem, Category, Order, OrderLine, PaymentMethod, PaymentStatus, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, checkout, health, menu, orders, params, receipt},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        menu::list_menu,
        menu::get_menu_item,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::cart_summary,
        checkout::preview,
        checkout::checkout,
        receipt::view_receipt,
        orders::list_orders,
        orders::get_order
    ),
    components(
        schemas(
            User,
            CatalogItem,
            Category,
            PaymentMethod,
            PaymentStatus,
            Order,
            OrderLine,
            CartLine,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            MeResponse,
            CartRequest,
            AddToCartRequest,
            RemoveFromCartRequest,
            CartSummary,
            CheckoutRequest,
            CheckoutLine,
            CheckoutView,
            PaymentMethodOption,
            ReceiptHandoff,
            ReceiptRequest,
            ReceiptLine,
            ReceiptView,
            MenuList,
            OrderList,
            OrderWithLines,
            params::Pagination,
            health::HealthData,
            Meta,
            ApiResponse<MenuList>,
            ApiResponse<CartSummary>,
            ApiResponse<ReceiptHandoff>,
            ApiResponse<ReceiptView>,
            ApiResponse<OrderWithLines>,
            ApiResponse<OrderList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Sign-up, sign-in and sign-out"),
        (name = "Menu", description = "Canteen menu"),
        (name = "Cart", description = "Stateless cart operations"),
        (name = "Checkout", description = "Payment and order placement"),
        (name = "Receipt", description = "Receipt rendering"),
        (name = "Orders", description = "Order history"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
