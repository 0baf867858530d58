use std::env;

use anyhow::{bail, Context, Result};
use diesel::prelude::*;

use lawdesk::{
    auth::{password, Role},
    config::AppConfig,
    db,
    models::{new_id, NewUser},
    schema::users,
};

const USAGE: &str = "Usage:\n  manage create-admin <email> <password>\n  manage hash-password <password>";

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("create-admin") => {
            let (Some(email), Some(password)) = (args.next(), args.next()) else {
                bail!("{USAGE}");
            };
            create_admin(&email, &password)?;
        }
        Some("hash-password") => {
            let Some(password) = args.next() else {
                bail!("{USAGE}");
            };
            println!("{}", password::hash_password(&password)?);
        }
        Some(cmd) => bail!("Unknown command: {cmd}\n{USAGE}"),
        None => bail!("{USAGE}"),
    }

    Ok(())
}

fn create_admin(email: &str, plain_password: &str) -> Result<()> {
    let email = email.trim().to_ascii_lowercase();
    if !email.contains('@') {
        bail!("`{email}` is not an email address");
    }
    if plain_password.chars().count() < 5 {
        bail!("password must contain at least 5 characters");
    }

    let config = AppConfig::from_env()?;
    let pool = db::init_pool_with_size(&config.database_url, 1)?;
    db::run_migrations(&pool)?;
    let mut conn = pool.get().context("failed to get database connection")?;

    let existing: i64 = users::table
        .filter(users::email.eq(&email))
        .count()
        .get_result(&mut conn)
        .context("failed to look up existing users")?;
    if existing > 0 {
        bail!("a user with email {email} already exists");
    }

    let id = new_id();
    diesel::insert_into(users::table)
        .values(&NewUser {
            id: id.clone(),
            email: email.clone(),
            password_hash: password::hash_password(plain_password)?,
            role: Role::Admin.as_str().to_string(),
        })
        .execute(&mut conn)
        .context("failed to insert admin user")?;

    println!("Created admin {email} ({id})");
    Ok(())
}
