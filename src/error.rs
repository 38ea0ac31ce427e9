use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    cart::CartError,
    response::{ApiResponse, Meta},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Invalid cart: {0}")]
    InvalidCart(#[from] CartError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    PaymentFailed(String),

    #[error("A checkout is already in progress")]
    CheckoutInProgress,

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Database error: {0}")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::InvalidCart(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::PaymentFailed(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::CheckoutInProgress => StatusCode::CONFLICT,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
