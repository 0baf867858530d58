use axum::http::HeaderValue;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    auth::{AdminUser, ClientUser, StaffUser},
    error::AppError,
    gate,
    state::AppState,
};

pub mod appointments;
pub mod auth;
pub mod billing;
pub mod cases;
pub mod client_portal;
pub mod clients;
pub mod dashboard;
pub mod expenses;
pub mod health;
pub mod staff;
pub mod staff_portal;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

async fn not_found() -> AppError {
    AppError::not_found()
}

fn cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let allow_origin = match allowed_origins {
        Some(origins) => {
            let headers: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin, "ignoring invalid CORS allowed origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(headers)
        }
        None => AllowOrigin::mirror_request(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn create_router(state: AppState) -> Router<()> {
    let cors = cors_layer(state.config.cors_allowed_origin.as_deref());

    let auth_routes = Router::new()
        .route("/signin", get(auth::sign_in_hint).post(auth::sign_in))
        .route("/signout", post(auth::sign_out))
        .route("/session", get(auth::session));

    let admin_routes = Router::new()
        .route("/dashboard", get(dashboard::admin_dashboard))
        .route("/appointments", get(appointments::list_appointments))
        .route("/appointments/add", post(appointments::create_appointment))
        .route(
            "/appointments/:id",
            get(appointments::get_appointment).patch(appointments::update_appointment),
        )
        .route("/case", get(cases::list_cases))
        .route("/case/add", post(cases::create_case))
        .route(
            "/case/:id",
            get(cases::get_case)
                .patch(cases::update_case)
                .delete(cases::archive_case),
        )
        .route("/case/:id/staff", post(cases::add_case_staff))
        .route(
            "/case/:id/staff/:staff_id",
            delete(cases::remove_case_staff),
        )
        .route("/case/:id/client", post(cases::add_case_client))
        .route(
            "/case/:id/client/:client_id",
            delete(cases::remove_case_client),
        )
        .route("/case/:id/documents", post(cases::add_case_document))
        .route("/client", get(clients::list_clients))
        .route("/client/add", post(clients::create_client))
        .route("/client/delete", post(clients::archive_client))
        .route(
            "/client/:id",
            get(clients::get_client).patch(clients::update_client),
        )
        .route("/staff", get(staff::list_staff).post(staff::create_staff))
        .route("/staff/delete", post(staff::remove_staff))
        .route(
            "/staff/:id",
            get(staff::get_staff).patch(staff::update_staff),
        )
        .route(
            "/billing",
            get(billing::list_billing).post(billing::create_billing),
        )
        .route(
            "/billing/:id",
            get(billing::get_billing).patch(billing::update_billing),
        )
        .route(
            "/expences",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route("/expences/:id", get(expenses::get_expense))
        .layer(middleware::from_extractor_with_state::<AdminUser, _>(
            state.clone(),
        ));

    let staff_routes = Router::new()
        .route("/dashboard", get(dashboard::staff_dashboard))
        .route("/appointments", get(staff_portal::my_appointments))
        .route("/documents", get(staff_portal::my_documents))
        .route("/expences", get(staff_portal::my_expenses))
        .layer(middleware::from_extractor_with_state::<StaffUser, _>(
            state.clone(),
        ));

    let client_routes = Router::new()
        .route("/dashboard", get(dashboard::client_dashboard))
        .route("/appointment", get(client_portal::my_appointments))
        .route("/case", get(client_portal::my_cases))
        .route("/bills_payment", get(client_portal::my_bills))
        .layer(middleware::from_extractor_with_state::<ClientUser, _>(
            state.clone(),
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/staff", staff_routes)
        .nest("/api/client", client_routes)
        .route("/api/health", get(health::health_check))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), gate::enforce))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
}
