use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{password, AuthenticatedUser, SESSION_COOKIE_NAME},
    error::{AppError, AppResult},
    models::User,
    schema::users,
    state::AppState,
};

#[derive(Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub role: String,
}

#[derive(Serialize)]
pub struct SignInHint {
    pub message: &'static str,
    pub method: &'static str,
    pub fields: [&'static str; 2],
}

pub async fn sign_in_hint() -> Json<SignInHint> {
    Json(SignInHint {
        message: "Sign in with your email and password",
        method: "POST",
        fields: ["email", "password"],
    })
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> AppResult<(HeaderMap, Json<SignInResponse>)> {
    let email = payload.email.trim().to_ascii_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::unauthorized());
    }

    let mut conn = state.db()?;
    let user: User = users::table
        .filter(users::email.eq(&email))
        .first(&mut conn)
        .optional()?
        .ok_or_else(AppError::unauthorized)?;

    let valid = password::verify_password(&payload.password, &user.password_hash)
        .map_err(|_| AppError::unauthorized())?;
    if !valid {
        tracing::info!(user_id = %user.id, "sign-in rejected");
        return Err(AppError::unauthorized());
    }

    let access_token = state.tokens.issue(&user.id, &user.email, &user.role)?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, session_cookie(&state, &access_token)?);

    tracing::info!(user_id = %user.id, role = %user.role, "signed in");
    Ok((
        headers,
        Json(SignInResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: state.tokens.expiry_seconds(),
            role: user.role,
        }),
    ))
}

pub async fn sign_out(State(state): State<AppState>) -> AppResult<(HeaderMap, StatusCode)> {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, clear_session_cookie(&state)?);
    Ok((headers, StatusCode::NO_CONTENT))
}

pub async fn session(user: AuthenticatedUser) -> Json<AuthenticatedUser> {
    Json(user)
}

fn cookie_attributes(state: &AppState, parts: &mut Vec<String>) {
    parts.push("Path=/".into());
    parts.push("HttpOnly".into());
    parts.push("SameSite=Lax".into());
    if state.config.session_cookie_secure {
        parts.push("Secure".into());
    }
    if let Some(domain) = &state.config.session_cookie_domain {
        parts.push(format!("Domain={}", domain));
    }
}

fn session_cookie(state: &AppState, token: &str) -> AppResult<HeaderValue> {
    let mut parts = vec![format!("{}={}", SESSION_COOKIE_NAME, token)];
    cookie_attributes(state, &mut parts);
    parts.push(format!("Max-Age={}", state.tokens.expiry_seconds()));

    HeaderValue::from_str(&parts.join("; ")).map_err(AppError::internal)
}

fn clear_session_cookie(state: &AppState) -> AppResult<HeaderValue> {
    let mut parts = vec![format!("{}=", SESSION_COOKIE_NAME)];
    cookie_attributes(state, &mut parts);
    parts.push("Max-Age=0".into());
    parts.push("Expires=Thu, 01 Jan 1970 00:00:00 GMT".into());

    HeaderValue::from_str(&parts.join("; ")).map_err(AppError::internal)
}
