use std::time::Duration;

use anyhow::anyhow;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

pub const DEFAULT_MAX_POOL_SIZE: u32 = 4;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn init_pool_with_size(database_url: &str, max_size: u32) -> anyhow::Result<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool_size = max_size.max(1);
    let pool = Pool::builder()
        .max_size(pool_size)
        .connection_timeout(Duration::from_secs(10))
        .build(manager)?;
    Ok(pool)
}

/// Applies the embedded schema and archival procedure migrations.
pub fn run_migrations(pool: &PgPool) -> anyhow::Result<usize> {
    let mut conn = pool
        .get()
        .map_err(|err| anyhow!("failed to acquire migration connection: {err}"))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| anyhow!("failed to run migrations: {err}"))?;
    Ok(applied.len())
}
