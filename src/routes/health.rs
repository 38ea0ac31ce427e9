use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    db::DbPool,
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    /// `ok`, or `degraded` when the database does not answer.
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
}

async fn database_reachable(pool: &DbPool) -> bool {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(error = %err, "database health probe failed");
            false
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    let database_up = database_reachable(&state.pool).await;
    let data = HealthData {
        status: if database_up { "ok" } else { "degraded" }.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database_up { "up" } else { "down" }.to_string(),
    };

    Json(ApiResponse::success(
        "Health check",
        data,
        Some(Meta::empty()),
    ))
}
