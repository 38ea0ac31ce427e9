use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    cart::{Cart, CartLine},
    dto::{
        cart::CartRequest,
        checkout::{CheckoutLine, CheckoutRequest, CheckoutView, PaymentMethodOption},
    },
    error::{AppError, AppResult},
    handoff::{CheckoutHandoff, ReceiptHandoff},
    middleware::auth::{IdentityProvider, Session},
    models::{PaymentMethod, PaymentStatus},
    payment::{PaymentGateway, PaymentOutcome},
    response::{ApiResponse, Meta},
    services::{
        menu_service::{CatalogStore, SeaOrmCatalog},
        order_service::{NewOrder, OrderStore, SeaOrmOrderStore},
    },
    state::AppState,
};

pub const MENU_PATH: &str = "/menu";
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty. Add items to proceed.";
pub const NO_PAYMENT_METHOD_MESSAGE: &str = "Please select a payment method";

/// Checks the submission preconditions without touching any collaborator.
pub fn validate(cart: &Cart, method: Option<PaymentMethod>) -> AppResult<PaymentMethod> {
    if cart.is_empty() {
        return Err(AppError::BadRequest(EMPTY_CART_MESSAGE.to_string()));
    }
    method.ok_or_else(|| AppError::BadRequest(NO_PAYMENT_METHOD_MESSAGE.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Processing,
    Succeeded,
}

/// One order submission: charge, resolve the user, persist order and lines.
///
/// A declined charge or a failed write puts the flow back to `Idle` so the
/// same instance can be resubmitted. `Succeeded` is final.
pub struct CheckoutFlow<'a, G: ?Sized, I: ?Sized, S: ?Sized> {
    gateway: &'a G,
    identity: &'a I,
    orders: &'a S,
    state: FlowState,
}

impl<'a, G, I, S> CheckoutFlow<'a, G, I, S>
where
    G: PaymentGateway + ?Sized,
    I: IdentityProvider + ?Sized,
    S: OrderStore + ?Sized,
{
    pub fn new(gateway: &'a G, identity: &'a I, orders: &'a S) -> Self {
        Self {
            gateway,
            identity,
            orders,
            state: FlowState::Idle,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub async fn submit(
        &mut self,
        cart: &Cart,
        method: Option<PaymentMethod>,
    ) -> AppResult<ReceiptHandoff> {
        match self.state {
            FlowState::Idle => {}
            FlowState::Processing => return Err(AppError::CheckoutInProgress),
            FlowState::Succeeded => {
                return Err(AppError::BadRequest("order has already been placed".to_string()));
            }
        }

        let method = validate(cart, method)?;

        self.state = FlowState::Processing;
        let result = self.process(cart, method).await;
        self.state = match result {
            Ok(_) => FlowState::Succeeded,
            Err(_) => FlowState::Idle,
        };
        result
    }

    async fn process(&self, cart: &Cart, method: PaymentMethod) -> AppResult<ReceiptHandoff> {
        let total = cart.total();

        if let PaymentOutcome::Declined { reason } = self.gateway.charge(total, method).await {
            tracing::warn!(%total, %method, "payment declined");
            return Err(AppError::PaymentFailed(reason));
        }

        let user_id = self
            .identity
            .current_user()
            .await
            .ok_or(AppError::Unauthorized)?;

        let placed = self
            .orders
            .place_order(
                NewOrder {
                    user_id,
                    total_amount: total,
                    payment_method: method,
                    payment_status: PaymentStatus::Completed,
                },
                cart,
            )
            .await?;

        tracing::info!(
            order_id = %placed.order.id,
            %user_id,
            %total,
            %method,
            lines = placed.items.len(),
            "order placed"
        );

        Ok(ReceiptHandoff {
            order_id: placed.order.id,
            cart: cart.clone(),
            total,
            payment_method: method,
        })
    }
}

/// Users with a submission underway. Holding an [`InFlightGuard`] reserves
/// the user's slot until the guard drops.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    users: Arc<Mutex<HashSet<Uuid>>>,
}

impl InFlight {
    pub fn try_acquire(&self, user_id: Uuid) -> AppResult<InFlightGuard> {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        if !users.insert(user_id) {
            return Err(AppError::CheckoutInProgress);
        }
        Ok(InFlightGuard {
            users: Arc::clone(&self.users),
            user_id,
        })
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    users: Arc<Mutex<HashSet<Uuid>>>,
    user_id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.users
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.user_id);
    }
}

fn parse_payment_method(raw: Option<&str>) -> AppResult<Option<PaymentMethod>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(id) => id.parse().map(Some).map_err(AppError::BadRequest),
    }
}

pub fn preview(handoff: CheckoutHandoff) -> CheckoutView {
    let cart = handoff.cart;
    if cart.is_empty() {
        return CheckoutView::EmptyCart {
            message: EMPTY_CART_MESSAGE.to_string(),
            redirect_to: MENU_PATH.to_string(),
        };
    }

    CheckoutView::Ready {
        lines: cart
            .lines()
            .iter()
            .map(|line| CheckoutLine {
                name: line.item.name.clone(),
                quantity: line.quantity,
                amount: line.amount(),
            })
            .collect(),
        total: cart.total(),
        payment_methods: PaymentMethod::ALL
            .into_iter()
            .map(PaymentMethodOption::from)
            .collect(),
    }
}

pub fn checkout_preview(payload: CartRequest) -> AppResult<ApiResponse<CheckoutView>> {
    let handoff = CheckoutHandoff::try_from(payload)?;
    Ok(ApiResponse::success("OK", preview(handoff), None))
}

/// Rebuilds the cart from the catalog's current entries. Client-supplied
/// names and prices are discarded; the quantities are kept.
pub async fn reprice<C>(catalog: &C, cart: Cart) -> AppResult<Cart>
where
    C: CatalogStore + ?Sized,
{
    let mut lines = Vec::with_capacity(cart.len());
    for line in Vec::<CartLine>::from(cart) {
        let item = catalog.get_item(line.item.id).await?.ok_or_else(|| {
            AppError::BadRequest(format!("menu item {} is not available", line.item.id))
        })?;
        lines.push(CartLine {
            item,
            quantity: line.quantity,
        });
    }
    Ok(Cart::try_from(lines)?)
}

/// Validates the request, prices it from the catalog and runs one flow.
/// Nothing is charged unless the cart, the payment method and every catalog
/// lookup check out.
pub async fn submit_checkout<C, G, S>(
    catalog: &C,
    gateway: &G,
    session: &Session,
    orders: &S,
    in_flight: &InFlight,
    payload: CheckoutRequest,
) -> AppResult<ReceiptHandoff>
where
    C: CatalogStore + ?Sized,
    G: PaymentGateway + ?Sized,
    S: OrderStore + ?Sized,
{
    let handoff = CheckoutHandoff::try_from(CartRequest { cart: payload.cart })?;
    let method = parse_payment_method(payload.payment_method.as_deref())?;

    validate(&handoff.cart, method)?;

    let _guard = session
        .user()
        .map(|user| in_flight.try_acquire(user.user_id))
        .transpose()?;

    let cart = reprice(catalog, handoff.cart).await?;

    let mut flow = CheckoutFlow::new(gateway, session, orders);
    flow.submit(&cart, method).await
}

pub async fn checkout(
    state: &AppState,
    session: &Session,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<ReceiptHandoff>> {
    let catalog = SeaOrmCatalog::new(&state.orm);
    let orders = SeaOrmOrderStore::new(&state.orm);
    let receipt = submit_checkout(
        &catalog,
        state.gateway.as_ref(),
        session,
        &orders,
        &state.in_flight,
        payload,
    )
    .await?;

    audit::record(
        &state.pool,
        AuditAction::Checkout,
        session.user().map(|u| u.user_id),
        Some(serde_json::json!({
            "order_id": receipt.order_id,
            "payment_method": receipt.payment_method,
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment successful",
        receipt,
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        cart::{CartError, tests::item},
        models::CatalogItem,
        services::{menu_service::tests::FakeCatalog, order_service::tests::FakeOrderStore},
    };

    struct FixedGateway {
        approve: bool,
        calls: AtomicUsize,
        charged: Mutex<Vec<Decimal>>,
    }

    impl FixedGateway {
        fn approving() -> Self {
            Self {
                approve: true,
                calls: AtomicUsize::new(0),
                charged: Mutex::new(Vec::new()),
            }
        }

        fn declining() -> Self {
            Self {
                approve: false,
                ..Self::approving()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn charged(&self) -> Vec<Decimal> {
            self.charged.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for FixedGateway {
        async fn charge(&self, amount: Decimal, _method: PaymentMethod) -> PaymentOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.charged.lock().unwrap().push(amount);
            if self.approve {
                PaymentOutcome::Approved
            } else {
                PaymentOutcome::Declined {
                    reason: "Payment failed".into(),
                }
            }
        }
    }

    fn scenario_cart() -> (Cart, CatalogItem, CatalogItem) {
        let a = item("a", dec!(50));
        let b = item("b", dec!(30));
        let mut cart = Cart::new();
        cart.add(a.clone()).unwrap();
        cart.add(a.clone()).unwrap();
        cart.add(b.clone()).unwrap();
        (cart, a, b)
    }

    #[tokio::test]
    async fn approved_payment_persists_one_order_with_matching_lines() {
        let (cart, a, b) = scenario_cart();
        let gateway = FixedGateway::approving();
        let session = Session::authenticated(Uuid::new_v4());
        let store = FakeOrderStore::default();

        let mut flow = CheckoutFlow::new(&gateway, &session, &store);
        let receipt = flow.submit(&cart, Some(PaymentMethod::Upi)).await.unwrap();

        assert_eq!(flow.state(), FlowState::Succeeded);
        let orders = store.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].total_amount, dec!(130));
        assert_eq!(orders[0].payment_method, PaymentMethod::Upi);
        assert_eq!(orders[0].payment_status, PaymentStatus::Completed);

        let lines = store.lines();
        assert_eq!(lines.len(), cart.len());
        let got: Vec<_> = lines
            .iter()
            .map(|l| (l.menu_item_id, l.quantity, l.price, l.order_id))
            .collect();
        assert_eq!(
            got,
            vec![
                (a.id, 2, dec!(50), orders[0].id),
                (b.id, 1, dec!(30), orders[0].id),
            ]
        );
        let line_sum: Decimal = lines.iter().map(|l| l.amount()).sum();
        assert_eq!(line_sum, orders[0].total_amount);

        assert_eq!(receipt.order_id, orders[0].id);
        assert_eq!(receipt.total, dec!(130));
        assert_eq!(receipt.cart, cart);
    }

    #[tokio::test]
    async fn missing_payment_method_touches_nothing() {
        let (cart, _, _) = scenario_cart();
        let gateway = FixedGateway::approving();
        let session = Session::authenticated(Uuid::new_v4());
        let store = FakeOrderStore::default();

        let mut flow = CheckoutFlow::new(&gateway, &session, &store);
        let err = flow.submit(&cart, None).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(ref m) if m == NO_PAYMENT_METHOD_MESSAGE));
        assert_eq!(gateway.calls(), 0);
        assert_eq!(store.calls(), 0);
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test]
    async fn empty_cart_touches_nothing() {
        let gateway = FixedGateway::approving();
        let session = Session::authenticated(Uuid::new_v4());
        let store = FakeOrderStore::default();

        let mut flow = CheckoutFlow::new(&gateway, &session, &store);
        let err = flow
            .submit(&Cart::new(), Some(PaymentMethod::Gpay))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(ref m) if m == EMPTY_CART_MESSAGE));
        assert_eq!(gateway.calls(), 0);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn declined_payment_writes_nothing_and_allows_retry() {
        let (cart, _, _) = scenario_cart();
        let declining = FixedGateway::declining();
        let session = Session::authenticated(Uuid::new_v4());
        let store = FakeOrderStore::default();

        let mut flow = CheckoutFlow::new(&declining, &session, &store);
        let err = flow
            .submit(&cart, Some(PaymentMethod::Paytm))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PaymentFailed(_)));
        assert_eq!(flow.state(), FlowState::Idle);
        assert_eq!(store.calls(), 0);
        assert!(store.orders().is_empty());
        assert!(store.lines().is_empty());

        let err = flow
            .submit(&cart, Some(PaymentMethod::Phonepe))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PaymentFailed(_)));
        assert_eq!(declining.calls(), 2);
    }

    #[tokio::test]
    async fn anonymous_session_fails_after_charge_without_writes() {
        let (cart, _, _) = scenario_cart();
        let gateway = FixedGateway::approving();
        let session = Session::anonymous();
        let store = FakeOrderStore::default();

        let mut flow = CheckoutFlow::new(&gateway, &session, &store);
        let err = flow.submit(&cart, Some(PaymentMethod::Upi)).await.unwrap_err();

        assert!(matches!(err, AppError::Unauthorized));
        assert_eq!(gateway.calls(), 1);
        assert_eq!(store.calls(), 0);
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test]
    async fn order_insert_failure_is_surfaced() {
        let (cart, _, _) = scenario_cart();
        let gateway = FixedGateway::approving();
        let session = Session::authenticated(Uuid::new_v4());
        let store = FakeOrderStore {
            fail_orders: true,
            ..Default::default()
        };

        let mut flow = CheckoutFlow::new(&gateway, &session, &store);
        let err = flow.submit(&cart, Some(PaymentMethod::Upi)).await.unwrap_err();

        assert!(err.to_string().contains("orders insert rejected"));
        assert_eq!(store.calls(), 1);
        assert!(store.lines().is_empty());
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test]
    async fn line_insert_failure_leaves_order_in_non_transactional_store() {
        let (cart, _, _) = scenario_cart();
        let gateway = FixedGateway::approving();
        let session = Session::authenticated(Uuid::new_v4());
        let store = FakeOrderStore {
            fail_lines: true,
            ..Default::default()
        };

        let mut flow = CheckoutFlow::new(&gateway, &session, &store);
        let err = flow.submit(&cart, Some(PaymentMethod::Upi)).await.unwrap_err();

        assert!(err.to_string().contains("order_items insert rejected"));
        assert_eq!(store.orders().len(), 1);
        assert!(store.lines().is_empty());
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test]
    async fn succeeded_flow_rejects_resubmission() {
        let (cart, _, _) = scenario_cart();
        let gateway = FixedGateway::approving();
        let session = Session::authenticated(Uuid::new_v4());
        let store = FakeOrderStore::default();

        let mut flow = CheckoutFlow::new(&gateway, &session, &store);
        flow.submit(&cart, Some(PaymentMethod::Upi)).await.unwrap();
        let err = flow.submit(&cart, Some(PaymentMethod::Upi)).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(store.orders().len(), 1);
        assert_eq!(gateway.calls(), 1);
    }

    #[test]
    fn in_flight_rejects_duplicate_until_guard_drops() {
        let registry = InFlight::default();
        let user = Uuid::new_v4();

        let guard = registry.try_acquire(user).unwrap();
        assert!(matches!(
            registry.try_acquire(user),
            Err(AppError::CheckoutInProgress)
        ));
        assert!(registry.try_acquire(Uuid::new_v4()).is_ok());

        drop(guard);
        assert!(registry.try_acquire(user).is_ok());
    }

    fn request(lines: Vec<CartLine>, method: &str) -> CheckoutRequest {
        CheckoutRequest {
            cart: lines,
            payment_method: Some(method.to_string()),
        }
    }

    fn line(item: &CatalogItem, quantity: u32) -> CartLine {
        CartLine {
            item: item.clone(),
            quantity,
        }
    }

    #[tokio::test]
    async fn tampered_price_is_replaced_by_catalog_price() {
        let a = item("a", dec!(50));
        let b = item("b", dec!(30));
        let catalog = FakeCatalog::new(vec![a.clone(), b.clone()]);
        let gateway = FixedGateway::approving();
        let session = Session::authenticated(Uuid::new_v4());
        let store = FakeOrderStore::default();

        let mut cheap = a.clone();
        cheap.price = dec!(0.01);
        cheap.name = "renamed".into();
        let receipt = submit_checkout(
            &catalog,
            &gateway,
            &session,
            &store,
            &InFlight::default(),
            request(vec![line(&cheap, 2), line(&b, 1)], "upi"),
        )
        .await
        .unwrap();

        assert_eq!(gateway.charged(), vec![dec!(130)]);
        assert_eq!(receipt.total, dec!(130));
        assert_eq!(receipt.cart.lines()[0].item, a);
        assert_eq!(store.orders()[0].total_amount, dec!(130));
        let prices: Vec<_> = store.lines().iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![dec!(50), dec!(30)]);
    }

    #[tokio::test]
    async fn unknown_menu_item_is_rejected_before_charge() {
        let a = item("a", dec!(50));
        let catalog = FakeCatalog::new(vec![a.clone()]);
        let gateway = FixedGateway::approving();
        let session = Session::authenticated(Uuid::new_v4());
        let store = FakeOrderStore::default();
        let ghost = item("ghost", dec!(15));

        let err = submit_checkout(
            &catalog,
            &gateway,
            &session,
            &store,
            &InFlight::default(),
            request(vec![line(&a, 1), line(&ghost, 1)], "paytm"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains(&ghost.id.to_string())));
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(gateway.calls(), 0);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn oversized_quantity_is_rejected_before_charge() {
        let a = item("a", dec!(50));
        let catalog = FakeCatalog::new(vec![a.clone()]);
        let gateway = FixedGateway::approving();
        let session = Session::authenticated(Uuid::new_v4());
        let store = FakeOrderStore::default();

        let err = submit_checkout(
            &catalog,
            &gateway,
            &session,
            &store,
            &InFlight::default(),
            request(vec![line(&a, i32::MAX as u32 + 1)], "upi"),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            AppError::InvalidCart(CartError::QuantityTooLarge(_))
        ));
        assert_eq!(gateway.calls(), 0);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn declined_and_anonymous_checkouts_map_to_their_statuses() {
        let a = item("a", dec!(50));
        let catalog = FakeCatalog::new(vec![a.clone()]);
        let store = FakeOrderStore::default();
        let in_flight = InFlight::default();

        let err = submit_checkout(
            &catalog,
            &FixedGateway::declining(),
            &Session::authenticated(Uuid::new_v4()),
            &store,
            &in_flight,
            request(vec![line(&a, 1)], "gpay"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::PAYMENT_REQUIRED);

        let err = submit_checkout(
            &catalog,
            &FixedGateway::approving(),
            &Session::anonymous(),
            &store,
            &in_flight,
            request(vec![line(&a, 1)], "gpay"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn checkout_holds_the_user_slot_only_while_running() {
        let a = item("a", dec!(50));
        let catalog = FakeCatalog::new(vec![a.clone()]);
        let gateway = FixedGateway::approving();
        let user = Uuid::new_v4();
        let session = Session::authenticated(user);
        let store = FakeOrderStore::default();
        let in_flight = InFlight::default();

        let held = in_flight.try_acquire(user).unwrap();
        let err = submit_checkout(
            &catalog,
            &gateway,
            &session,
            &store,
            &in_flight,
            request(vec![line(&a, 1)], "upi"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::CheckoutInProgress));
        assert_eq!(gateway.calls(), 0);
        drop(held);

        submit_checkout(
            &catalog,
            &gateway,
            &session,
            &store,
            &in_flight,
            request(vec![line(&a, 1)], "upi"),
        )
        .await
        .unwrap();
        assert!(in_flight.try_acquire(user).is_ok());
    }

    #[test]
    fn payment_method_parsing() {
        assert_eq!(parse_payment_method(None).unwrap(), None);
        assert_eq!(parse_payment_method(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_payment_method(Some("phonepe")).unwrap(),
            Some(PaymentMethod::Phonepe)
        );
        assert!(matches!(
            parse_payment_method(Some("cash")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn empty_cart_preview_offers_way_back_to_menu() {
        let view = preview(CheckoutHandoff { cart: Cart::new() });
        match view {
            CheckoutView::EmptyCart { redirect_to, .. } => assert_eq!(redirect_to, MENU_PATH),
            other => panic!("expected empty cart view, got {other:?}"),
        }
    }

    #[test]
    fn preview_lists_lines_total_and_methods() {
        let (cart, _, _) = scenario_cart();
        match preview(CheckoutHandoff { cart }) {
            CheckoutView::Ready {
                lines,
                total,
                payment_methods,
            } => {
                assert_eq!(lines.len(), 2);
                assert_eq!(lines[0].amount, dec!(100));
                assert_eq!(total, dec!(130));
                let names: Vec<_> = payment_methods.iter().map(|m| m.name.as_str()).collect();
                assert_eq!(names, vec!["Paytm", "Google Pay", "PhonePe", "UPI"]);
            }
            other => panic!("expected ready view, got {other:?}"),
        }
    }
}
