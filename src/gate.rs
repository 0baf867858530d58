//! Role-based access gate for the page paths.
//!
//! Every request under `/`, `/admin`, `/staff` or `/client` is classified by
//! [`AccessGate::evaluate`] from the decoded session role and the request
//! path. Rules are checked in a fixed order so that a signed-in user hitting
//! `/` lands on their dashboard instead of being confined twice:
//!
//! 1. no session on `/` redirects to the sign-in path;
//! 2. a session on `/` redirects to the role's dashboard;
//! 3. a session outside its role prefix redirects to the role's dashboard;
//! 4. anything else passes through.
//!
//! An unrecognized role in an otherwise valid token never redirects.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    auth::{session_token, Role},
    state::AppState,
};

pub const SIGN_IN_PATH: &str = "/api/auth/signin";

const GATED_PREFIXES: [&str; 3] = ["/admin", "/staff", "/client"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(&'static str),
}

/// What to do with an unauthenticated request to a role prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnonymousPolicy {
    RedirectToSignIn,
    /// Only `/` is redirected; role pages rely on their own checks.
    FallThrough,
}

#[derive(Debug, Clone, Copy)]
pub struct AccessGate {
    anonymous: AnonymousPolicy,
}

impl AccessGate {
    pub fn new(anonymous: AnonymousPolicy) -> Self {
        Self { anonymous }
    }

    /// `role` is the raw role claim of a verified session, `None` when there is none.
    pub fn evaluate(&self, role: Option<&str>, path: &str) -> GateDecision {
        let Some(raw_role) = role else {
            if path == "/" {
                return GateDecision::Redirect(SIGN_IN_PATH);
            }
            if self.anonymous == AnonymousPolicy::RedirectToSignIn
                && GATED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
            {
                return GateDecision::Redirect(SIGN_IN_PATH);
            }
            return GateDecision::Allow;
        };

        let Some(role) = Role::from_claim(raw_role) else {
            return GateDecision::Allow;
        };

        if path == "/" || !path.starts_with(role.path_prefix()) {
            return GateDecision::Redirect(role.dashboard_path());
        }

        GateDecision::Allow
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(AnonymousPolicy::RedirectToSignIn)
    }
}

/// Paths the gate looks at; API routes and assets bypass it.
pub fn is_gated_path(path: &str) -> bool {
    path == "/"
        || GATED_PREFIXES.iter().any(|prefix| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
}

pub async fn enforce(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if !is_gated_path(&path) {
        return next.run(request).await;
    }

    let token = session_token(request.headers());
    let claims = state.tokens.decode_lenient(token.as_deref());
    let decision = state
        .gate
        .evaluate(claims.as_ref().map(|claims| claims.role.as_str()), &path);

    match decision {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(target) => {
            tracing::debug!(
                path = %path,
                role = claims.as_ref().map(|claims| claims.role.as_str()).unwrap_or("-"),
                redirect_to = target,
                "access gate redirect"
            );
            Redirect::temporary(target).into_response()
        }
    }
}
