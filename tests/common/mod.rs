use std::env;
use std::sync::Arc;

use anyhow::{anyhow, ensure, Context, Result};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::NaiveDateTime;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::PgConnection;
use http_body_util::BodyExt;
use lawdesk::archival::StoredProcedureArchival;
use lawdesk::auth::jwt::SessionTokenService;
use lawdesk::auth::password;
use lawdesk::config::AppConfig;
use lawdesk::db::{self, PgPool};
use lawdesk::models::{new_id, ClientCase, NewCase, NewClient, NewStaff, NewUser, StaffCase};
use lawdesk::routes;
use lawdesk::schema::{cases, client_cases, clients, staff, staff_cases, users};
use lawdesk::state::AppState;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::util::ServiceExt;

static DB_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::with_gate_policy(true).await
    }

    pub async fn with_gate_policy(redirect_anonymous: bool) -> Result<Self> {
        let database_url = env::var("TEST_DATABASE_URL")
            .context("TEST_DATABASE_URL must be set for integration tests")?;

        let config = AppConfig {
            database_url: database_url.clone(),
            database_max_pool_size: db::DEFAULT_MAX_POOL_SIZE,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            session_secret: "test-secret".to_string(),
            session_issuer: "test-issuer".to_string(),
            session_audience: "test-audience".to_string(),
            session_expiry_minutes: 60,
            session_cookie_secure: false,
            session_cookie_domain: None,
            cors_allowed_origin: None,
            gate_redirect_anonymous: redirect_anonymous,
        };

        let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
        prepare_database(&pool).await?;

        let tokens = SessionTokenService::from_config(&config)?;
        let state = AppState::new(pool, config, Arc::new(StoredProcedureArchival), tokens);
        let router = routes::create_router(state.clone());

        Ok(Self { state, router })
    }

    pub async fn cleanup(&self) -> Result<()> {
        self.with_conn(truncate_all).await
    }

    pub async fn insert_user(&self, email: &str, password: &str, role: &str) -> Result<String> {
        let email = email.to_string();
        let password = password.to_string();
        let role = role.to_string();
        self.with_conn(move |conn| insert_user_row(conn, &email, &password, &role))
            .await
    }

    /// Inserts a `CLIENT` user and its `ACTIVE` profile; returns the client id.
    #[allow(dead_code)]
    pub async fn seed_client(&self, name: &str, email: &str, password: &str) -> Result<String> {
        let name = name.to_string();
        let email = email.to_string();
        let password = password.to_string();
        self.with_conn(move |conn| {
            let id = insert_user_row(conn, &email, &password, "CLIENT")?;
            diesel::insert_into(clients::table)
                .values(&NewClient {
                    client_id: id.clone(),
                    name,
                    phone_no: "555-0100".to_string(),
                    address: "1 Court Street".to_string(),
                    image: None,
                    status: "ACTIVE".to_string(),
                })
                .execute(conn)
                .context("failed to insert client")?;
            Ok(id)
        })
        .await
    }

    /// Inserts a `STAFF` user and its `working` profile; returns the staff id.
    #[allow(dead_code)]
    pub async fn seed_staff(&self, name: &str, email: &str, password: &str) -> Result<String> {
        let name = name.to_string();
        let email = email.to_string();
        let password = password.to_string();
        self.with_conn(move |conn| {
            let id = insert_user_row(conn, &email, &password, "STAFF")?;
            diesel::insert_into(staff::table)
                .values(&NewStaff {
                    staff_id: id.clone(),
                    name,
                    experience: 7,
                    phone_no: "555-0199".to_string(),
                    bar_number: format!("BAR-{}", &id[..8]),
                    address: "2 Court Street".to_string(),
                    specialisation: "Litigation".to_string(),
                    s_role: "Associate".to_string(),
                    designation: "Senior Associate".to_string(),
                    image: None,
                    status: "working".to_string(),
                })
                .execute(conn)
                .context("failed to insert staff")?;
            Ok(id)
        })
        .await
    }

    /// Inserts a case linked to the given parties; returns the case id.
    #[allow(dead_code)]
    pub async fn seed_case(
        &self,
        title: &str,
        status: &str,
        client_ids: &[String],
        staff_ids: &[String],
    ) -> Result<String> {
        let title = title.to_string();
        let status = status.to_string();
        let client_ids = client_ids.to_vec();
        let staff_ids = staff_ids.to_vec();
        self.with_conn(move |conn| {
            let case_id = new_id();
            let filing_date =
                NaiveDateTime::parse_from_str("2025-01-15 09:00:00", "%Y-%m-%d %H:%M:%S")?;
            diesel::insert_into(cases::table)
                .values(&NewCase {
                    case_id: case_id.clone(),
                    title,
                    court_name: "District Court".to_string(),
                    case_type: "Civil".to_string(),
                    status,
                    filing_date,
                })
                .execute(conn)
                .context("failed to insert case")?;
            for client_id in client_ids {
                diesel::insert_into(client_cases::table)
                    .values(&ClientCase {
                        client_id,
                        case_id: case_id.clone(),
                    })
                    .execute(conn)?;
            }
            for staff_id in staff_ids {
                diesel::insert_into(staff_cases::table)
                    .values(&StaffCase {
                        staff_id,
                        case_id: case_id.clone(),
                    })
                    .execute(conn)?;
            }
            Ok(case_id)
        })
        .await
    }

    /// Runs a `SELECT count(*) ...` statement and returns the count.
    #[allow(dead_code)]
    pub async fn count(&self, sql: &str) -> Result<i64> {
        #[derive(QueryableByName)]
        struct Count {
            #[diesel(sql_type = diesel::sql_types::BigInt)]
            n: i64,
        }

        let sql = sql.to_string();
        self.with_conn(move |conn| {
            let row: Count = diesel::sql_query(sql)
                .get_result(conn)
                .context("failed to run count query")?;
            Ok(row.n)
        })
        .await
    }

    pub async fn signin_token(&self, email: &str, password: &str) -> Result<String> {
        #[derive(Serialize)]
        struct SignInPayload<'a> {
            email: &'a str,
            password: &'a str,
        }

        let response = self
            .post_json("/api/auth/signin", &SignInPayload { email, password }, None)
            .await?;

        ensure!(
            response.status() == StatusCode::OK,
            "sign-in failed with status {}",
            response.status()
        );

        let body = json_body(response).await?;
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("sign-in response has no access_token"))
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::POST, path, payload, token).await
    }

    #[allow(dead_code)]
    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::PATCH, path, payload, token).await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<hyper::Response<Body>> {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    /// GET carrying the session in the cookie instead of the bearer header.
    #[allow(dead_code)]
    pub async fn get_with_cookie(&self, path: &str, token: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .header("cookie", format!("session_token={token}"))
            .body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    #[allow(dead_code)]
    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<hyper::Response<Body>> {
        let builder = Request::builder().method(Method::DELETE).uri(path);
        let builder = if let Some(token) = token {
            builder.header("authorization", format!("Bearer {token}"))
        } else {
            builder
        };
        let request = builder.body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut PgConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.state.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|err| anyhow!("failed to get database connection: {err}"))?;
            f(&mut conn)
        })
        .await
        .context("connection task panicked")?
    }
}

pub async fn acquire_db_lock() -> tokio::sync::MutexGuard<'static, ()> {
    DB_LOCK.lock().await
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

pub async fn json_body(response: hyper::Response<Body>) -> Result<Value> {
    let bytes = body_to_vec(response.into_body()).await?;
    serde_json::from_slice(&bytes).context("response body is not JSON")
}

fn insert_user_row(
    conn: &mut PgConnection,
    email: &str,
    password: &str,
    role: &str,
) -> Result<String> {
    let user = NewUser {
        id: new_id(),
        email: email.to_string(),
        password_hash: password::hash_password(password)?,
        role: role.to_string(),
    };
    diesel::insert_into(users::table)
        .values(&user)
        .execute(conn)
        .context("failed to insert user")?;
    Ok(user.id)
}

async fn prepare_database(pool: &PgPool) -> Result<()> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        db::run_migrations(&pool)?;
        let mut conn = pool
            .get()
            .map_err(|err| anyhow!("failed to acquire connection: {err}"))?;
        truncate_all(&mut conn)
    })
    .await
    .context("migration task panicked")?
}

fn truncate_all(conn: &mut PgConnection) -> Result<()> {
    conn.batch_execute(
        "TRUNCATE TABLE appointment_clients, appointment_staff, client_cases, staff_cases, \
         billing, expenses, documents, appointments, cases, clients, staff, users CASCADE;",
    )
    .context("failed to truncate tables")?;
    Ok(())
}
