pub mod jwt;
pub mod password;

use std::fmt;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use axum_extra::headers::{authorization::Bearer, Authorization, Cookie, HeaderMapExt};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

pub const SESSION_COOKIE_NAME: &str = "session_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Staff,
    Client,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
            Role::Client => "CLIENT",
        }
    }

    /// Exact match only; the session carries the role exactly as stored.
    pub fn from_claim(raw: &str) -> Option<Self> {
        match raw {
            "ADMIN" => Some(Role::Admin),
            "STAFF" => Some(Role::Staff),
            "CLIENT" => Some(Role::Client),
            _ => None,
        }
    }

    pub fn path_prefix(self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Staff => "/staff",
            Role::Client => "/client",
        }
    }

    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Staff => "/staff/dashboard",
            Role::Client => "/client/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw session token from the `Authorization: Bearer` header, else the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }
    headers
        .typed_get::<Cookie>()
        .and_then(|cookies| cookies.get(SESSION_COOKIE_NAME).map(str::to_string))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub role: String,
}

impl AuthenticatedUser {
    pub fn role(&self) -> Option<Role> {
        Role::from_claim(&self.role)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(AppError::unauthorized)?;

        let claims = state
            .tokens
            .verify(&token)
            .map_err(|_| AppError::unauthorized())?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

macro_rules! role_extractor {
    ($(#[$meta:meta])* $name:ident, $role:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub AuthenticatedUser);

        impl $name {
            pub fn id(&self) -> &str {
                &self.0.user_id
            }
        }

        #[async_trait]
        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user = AuthenticatedUser::from_request_parts(parts, state).await?;
                if user.role() != Some($role) {
                    return Err(AppError::forbidden());
                }
                Ok($name(user))
            }
        }
    };
}

role_extractor!(
    /// Caller holding an `ADMIN` session.
    AdminUser,
    Role::Admin
);
role_extractor!(
    /// Caller holding a `STAFF` session; the id is also the staff profile id.
    StaffUser,
    Role::Staff
);
role_extractor!(
    /// Caller holding a `CLIENT` session; the id is also the client profile id.
    ClientUser,
    Role::Client
);
