use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

/// Events appended to `audit_logs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Register,
    Login,
    Logout,
    Checkout,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Register => "user_register",
            AuditAction::Login => "user_login",
            AuditAction::Logout => "user_logout",
            AuditAction::Checkout => "checkout",
        }
    }

    /// Table the event is about.
    pub fn resource(self) -> &'static str {
        match self {
            AuditAction::Register | AuditAction::Login | AuditAction::Logout => "users",
            AuditAction::Checkout => "orders",
        }
    }
}

pub async fn write(
    pool: &DbPool,
    action: AuditAction,
    user_id: Option<Uuid>,
    metadata: Option<Value>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(action.as_str())
    .bind(action.resource())
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Like [`write`], but a failed insert is only logged. Auditing never fails
/// the request that triggered it.
pub async fn record(
    pool: &DbPool,
    action: AuditAction,
    user_id: Option<Uuid>,
    metadata: Option<Value>,
) {
    if let Err(err) = write(pool, action, user_id, metadata).await {
        tracing::warn!(error = %err, action = action.as_str(), "audit log failed");
    }
}
