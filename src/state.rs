use std::sync::Arc;

use crate::{
    db::{DbPool, OrmConn, create_orm_conn},
    payment::PaymentGateway,
    services::checkout_service::InFlight,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub gateway: Arc<dyn PaymentGateway>,
    pub in_flight: InFlight,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        gateway: Arc<dyn PaymentGateway>,
        jwt_secret: impl Into<Arc<str>>,
    ) -> Self {
        let orm = create_orm_conn(&pool);
        Self {
            pool,
            orm,
            gateway,
            in_flight: InFlight::default(),
            jwt_secret: jwt_secret.into(),
        }
    }
}
