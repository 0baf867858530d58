use std::sync::Arc;

use diesel::{
    pg::PgConnection,
    r2d2::{ConnectionManager, PooledConnection},
};

use crate::{
    archival::ArchivalService,
    auth::jwt::SessionTokenService,
    config::AppConfig,
    db::PgPool,
    error::{AppError, AppResult},
    gate::{AccessGate, AnonymousPolicy},
};

type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Everything a request handler needs; built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub archival: Arc<dyn ArchivalService>,
    pub tokens: SessionTokenService,
    pub gate: AccessGate,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: AppConfig,
        archival: Arc<dyn ArchivalService>,
        tokens: SessionTokenService,
    ) -> Self {
        let anonymous = if config.gate_redirect_anonymous {
            AnonymousPolicy::RedirectToSignIn
        } else {
            AnonymousPolicy::FallThrough
        };
        Self {
            pool,
            config: Arc::new(config),
            archival,
            tokens,
            gate: AccessGate::new(anonymous),
        }
    }

    pub fn db(&self) -> AppResult<PgPooledConnection> {
        self.pool
            .get()
            .map_err(|err| AppError::internal(format!("database pool error: {err}")))
    }
}
