use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::auth::{LoginRequest, LoginResponse, MeResponse, RegisterRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    services::auth_service::{login_user, me as current_user, register_user, sign_out},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Register user", body = ApiResponse<User>),
        (status = 400, description = "Invalid input or email taken")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = register_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = login_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not signed in")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<ApiResponse<serde_json::Value>> {
    Json(sign_out(&state, &user).await)
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<MeResponse>),
        (status = 401, description = "Not signed in")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(user: AuthUser) -> Json<ApiResponse<MeResponse>> {
    Json(current_user(&user))
}
