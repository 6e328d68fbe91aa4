use axum::{extract::State, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{jwt::SessionUser, password, AuthenticatedUser},
    error::{AppError, AppResult},
    models::User,
    schema::users::dsl,
    state::AppState,
};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: SessionUser,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = normalize_email(&payload.email);

    let user: Option<User> = {
        let mut conn = state.db()?;
        dsl::users
            .filter(dsl::email.eq(&email))
            .first(&mut conn)
            .optional()?
    };

    // unknown email and wrong password answer the same way
    let Some(user) = user else {
        tracing::info!("login rejected: unknown email");
        return Err(AppError::invalid_credentials());
    };

    let valid = password::verify_password(&payload.password, &user.password_hash)
        .unwrap_or_else(|err| {
            tracing::warn!(user_id = %user.id, error = %err, "stored password hash is unreadable");
            false
        });
    if !valid {
        tracing::info!(user_id = %user.id, "login rejected: wrong password");
        return Err(AppError::invalid_credentials());
    }

    let session = SessionUser {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    };
    let access_token = state.jwt.generate_token(&session)?;

    tracing::info!(user_id = %session.id, role = %session.role, "login succeeded");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.expires_in_seconds(),
        user: session,
    }))
}

pub async fn me(user: AuthenticatedUser) -> Json<SessionUser> {
    Json(SessionUser {
        id: user.user_id,
        email: user.email,
        name: user.name,
        role: user.role,
    })
}
