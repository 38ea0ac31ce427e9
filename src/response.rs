use serde::Serialize;
use utoipa::ToSchema;

/// Paging information attached to list responses.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
    pub total_pages: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
            total_pages: Some(total_pages),
        }
    }

    /// Unpaginated listing: a single page holding every row.
    pub fn list(total: i64) -> Self {
        Self::new(1, total, total)
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
            total_pages: None,
        }
    }
}

/// JSON envelope shared by every endpoint, errors included.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}
