use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use diesel::{prelude::*, PgConnection};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{password, Role},
    error::{AppError, AppResult},
    models::{new_id, Appointment, Case, Client, NewClient, NewUser},
    schema::{appointment_clients, appointments, cases, client_cases, clients, users},
    state::AppState,
    status::ClientStatus,
    validation::FieldErrors,
    views::{
        build_appointment_details, build_cases_with_parties, AppointmentDetail, CaseWithParties,
        ClientSummary,
    },
};

use super::MessageResponse;

#[derive(Deserialize)]
pub struct ClientListQuery {
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Deserialize)]
pub struct CreateClientRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_no: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub phone_no: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = clients)]
struct ClientChangeset {
    name: Option<String>,
    phone_no: Option<String>,
    address: Option<String>,
    image: Option<String>,
}

#[derive(Deserialize)]
pub struct ArchiveClientRequest {
    #[serde(rename = "clientId", default)]
    pub client_id: Option<String>,
}

#[derive(Serialize)]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: ClientSummary,
    pub cases: Vec<CaseWithParties>,
    pub appointments: Vec<AppointmentDetail>,
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ClientListQuery>,
) -> AppResult<Json<Vec<ClientSummary>>> {
    let mut conn = state.db()?;

    let mut listing = clients::table
        .inner_join(users::table)
        .select((clients::all_columns, users::email))
        .order(clients::name.asc())
        .into_boxed();
    if !query.include_archived {
        listing = listing.filter(clients::status.ne(ClientStatus::PastClient.as_str()));
    }

    let rows: Vec<(Client, String)> = listing.load(&mut conn)?;
    Ok(Json(
        rows.into_iter()
            .map(|(client, email)| ClientSummary::new(client, Some(email)))
            .collect(),
    ))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> AppResult<Json<ClientDetail>> {
    let mut conn = state.db()?;

    let (client, email): (Client, String) = clients::table
        .inner_join(users::table)
        .filter(clients::client_id.eq(&client_id))
        .select((clients::all_columns, users::email))
        .first(&mut conn)?;

    let case_rows: Vec<Case> = client_cases::table
        .inner_join(cases::table)
        .filter(client_cases::client_id.eq(&client_id))
        .select(cases::all_columns)
        .order(cases::filing_date.desc())
        .load(&mut conn)?;

    let appointment_rows: Vec<Appointment> = appointment_clients::table
        .inner_join(appointments::table)
        .filter(appointment_clients::client_id.eq(&client_id))
        .select(appointments::all_columns)
        .order(appointments::appointment_date.asc())
        .load(&mut conn)?;

    Ok(Json(ClientDetail {
        client: ClientSummary::new(client, Some(email)),
        cases: build_cases_with_parties(&mut conn, case_rows)?,
        appointments: build_appointment_details(&mut conn, appointment_rows)?,
    }))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<CreateClientRequest>,
) -> AppResult<(StatusCode, Json<ClientSummary>)> {
    let mut errors = FieldErrors::default();
    let name = errors.required("name", &payload.name, "Name is required");
    let phone_no = errors.required("phone_no", &payload.phone_no, "Phone number is required");
    let address = errors.required("address", &payload.address, "Address is required");
    let email = errors.email("email", &payload.email);
    errors.min_len("password", &payload.password, 5);
    errors.finish()?;

    let password_hash = password::hash_password(&payload.password)?;
    let image = Some(payload.image.trim().to_string()).filter(|image| !image.is_empty());

    let mut conn = state.db()?;
    if email_taken(&mut conn, &email)? {
        return Err(AppError::bad_request("Email already in use"));
    }

    let user_id = new_id();
    let client = conn.transaction::<Client, AppError, _>(|conn| {
        diesel::insert_into(users::table)
            .values(&NewUser {
                id: user_id.clone(),
                email: email.clone(),
                password_hash,
                role: Role::Client.as_str().to_string(),
            })
            .execute(conn)?;

        Ok(diesel::insert_into(clients::table)
            .values(&NewClient {
                client_id: user_id.clone(),
                name,
                phone_no,
                address,
                image,
                status: ClientStatus::Active.as_str().to_string(),
            })
            .get_result(conn)?)
    })?;

    tracing::info!(client_id = %client.client_id, "client account created");
    Ok((
        StatusCode::CREATED,
        Json(ClientSummary::new(client, Some(email))),
    ))
}

pub(crate) fn email_taken(conn: &mut PgConnection, email: &str) -> AppResult<bool> {
    let count: i64 = users::table
        .filter(users::email.eq(email))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(payload): Json<UpdateClientRequest>,
) -> AppResult<Json<ClientSummary>> {
    let mut errors = FieldErrors::default();
    let mut changeset = ClientChangeset::default();
    if let Some(name) = payload.name.as_deref() {
        changeset.name = Some(errors.required("name", name, "Name is required"));
    }
    if let Some(phone_no) = payload.phone_no.as_deref() {
        changeset.phone_no = Some(errors.required("phone_no", phone_no, "Phone number is required"));
    }
    if let Some(address) = payload.address.as_deref() {
        changeset.address = Some(errors.required("address", address, "Address is required"));
    }
    // An empty image keeps the current one.
    changeset.image = payload
        .image
        .map(|image| image.trim().to_string())
        .filter(|image| !image.is_empty());
    errors.finish()?;

    let mut conn = state.db()?;
    let (existing, email): (Client, String) = clients::table
        .inner_join(users::table)
        .filter(clients::client_id.eq(&client_id))
        .select((clients::all_columns, users::email))
        .first(&mut conn)?;

    let is_empty = changeset.name.is_none()
        && changeset.phone_no.is_none()
        && changeset.address.is_none()
        && changeset.image.is_none();
    if is_empty {
        return Ok(Json(ClientSummary::new(existing, Some(email))));
    }

    let updated: Client = diesel::update(clients::table.find(&client_id))
        .set((&changeset, clients::updated_at.eq(Utc::now().naive_utc())))
        .get_result(&mut conn)?;
    Ok(Json(ClientSummary::new(updated, Some(email))))
}

pub async fn archive_client(
    State(state): State<AppState>,
    Json(payload): Json<ArchiveClientRequest>,
) -> AppResult<Json<MessageResponse>> {
    let client_id = payload
        .client_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("Client ID is required"))?;

    let mut conn = state.db()?;
    clients::table
        .find(&client_id)
        .select(clients::client_id)
        .first::<String>(&mut conn)?;

    state.archival.archive_client(&mut conn, &client_id)?;
    Ok(Json(MessageResponse::new("Client archived successfully")))
}
