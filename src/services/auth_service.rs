use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::auth::{LoginRequest, LoginResponse, MeResponse, RegisterRequest},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, TOKEN_TTL_HOURS, issue_token},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("a valid email is required".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest { email, password } = payload;
    let email = email.trim().to_lowercase();
    validate_credentials(&email, &password)?;

    let exist = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let user: User = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(hash_password(&password)?),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?
    .into();

    audit::record(
        &state.pool,
        AuditAction::Register,
        Some(user.id),
        Some(serde_json::json!({ "email": user.email })),
    )
    .await;

    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();

    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let token = issue_token(user.id, &state.jwt_secret)?;

    audit::record(&state.pool, AuditAction::Login, Some(user.id), None).await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: TOKEN_TTL_HOURS * 3600,
        },
        Some(Meta::empty()),
    ))
}

/// Tokens are stateless; signing out records the event and the client drops
/// its token.
pub async fn sign_out(state: &AppState, user: &AuthUser) -> ApiResponse<serde_json::Value> {
    audit::record(&state.pool, AuditAction::Logout, Some(user.user_id), None).await;
    tracing::info!(user_id = %user.user_id, "signed out");

    ApiResponse::success("Signed out", serde_json::json!({}), Some(Meta::empty()))
}

pub fn me(user: &AuthUser) -> ApiResponse<MeResponse> {
    ApiResponse::success(
        "OK",
        MeResponse {
            user_id: user.user_id,
        },
        None,
    )
}
