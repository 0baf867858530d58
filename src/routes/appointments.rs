use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{new_id, Appointment, AppointmentClient, AppointmentStaff, NewAppointment},
    schema::{appointment_clients, appointment_staff, appointments, cases},
    state::AppState,
    status::AppointmentStatus,
    validation::{parse_timestamp, FieldErrors},
    views::{build_appointment_details, AppointmentDetail, AppointmentSummary},
};

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default)]
    pub clients: Vec<String>,
    #[serde(default)]
    pub staff: Vec<String>,
}

#[derive(Deserialize)]
pub struct UpdateAppointmentRequest {
    pub purpose: Option<String>,
    pub location: Option<String>,
    pub appointment_date: Option<String>,
    pub status: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = appointments)]
struct AppointmentChangeset {
    purpose: Option<String>,
    location: Option<String>,
    appointment_date: Option<chrono::NaiveDateTime>,
    status: Option<String>,
}

pub async fn list_appointments(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AppointmentDetail>>> {
    let mut conn = state.db()?;
    let rows: Vec<Appointment> = appointments::table
        .order(appointments::appointment_date.asc())
        .load(&mut conn)?;
    Ok(Json(build_appointment_details(&mut conn, rows)?))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
) -> AppResult<Json<AppointmentDetail>> {
    let mut conn = state.db()?;
    let appointment: Appointment = appointments::table
        .find(&appointment_id)
        .first(&mut conn)?;
    let detail = build_appointment_details(&mut conn, vec![appointment])?
        .pop()
        .ok_or_else(AppError::not_found)?;
    Ok(Json(detail))
}

pub async fn create_appointment(
    State(state): State<AppState>,
    Json(payload): Json<CreateAppointmentRequest>,
) -> AppResult<(StatusCode, Json<AppointmentSummary>)> {
    let mut errors = FieldErrors::default();
    let purpose = errors.required("purpose", &payload.purpose, "Purpose is required");
    let location = errors.required("location", &payload.location, "Location is required");
    let appointment_date = errors.date(
        "appointment_date",
        &payload.appointment_date,
        "Valid date is required",
    );
    let client_ids = errors.id_list("clients", &payload.clients);
    let staff_ids = errors.id_list("staff", &payload.staff);
    errors.finish()?;
    let appointment_date =
        appointment_date.ok_or_else(|| AppError::bad_request("Valid date is required"))?;

    let new_appointment = NewAppointment {
        appointment_id: new_id(),
        case_id: payload
            .case_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()),
        purpose,
        location,
        appointment_date,
        status: AppointmentStatus::Scheduled.as_str().to_string(),
    };

    let mut conn = state.db()?;
    if let Some(case_id) = new_appointment.case_id.as_deref() {
        let known = cases::table
            .find(case_id)
            .select(cases::case_id)
            .first::<String>(&mut conn)
            .optional()?;
        if known.is_none() {
            let mut errors = FieldErrors::default();
            errors.push("case_id", "Unknown case");
            return Err(AppError::validation(errors));
        }
    }

    let created = conn.transaction::<Appointment, AppError, _>(|conn| {
        diesel::insert_into(appointments::table)
            .values(&new_appointment)
            .execute(conn)?;

        let client_rows: Vec<AppointmentClient> = client_ids
            .iter()
            .map(|client_id| AppointmentClient {
                appointment_id: new_appointment.appointment_id.clone(),
                client_id: client_id.clone(),
            })
            .collect();
        if !client_rows.is_empty() {
            diesel::insert_into(appointment_clients::table)
                .values(&client_rows)
                .execute(conn)?;
        }

        let staff_rows: Vec<AppointmentStaff> = staff_ids
            .iter()
            .map(|staff_id| AppointmentStaff {
                appointment_id: new_appointment.appointment_id.clone(),
                staff_id: staff_id.clone(),
            })
            .collect();
        if !staff_rows.is_empty() {
            diesel::insert_into(appointment_staff::table)
                .values(&staff_rows)
                .execute(conn)?;
        }

        Ok(appointments::table
            .find(&new_appointment.appointment_id)
            .first(conn)?)
    })?;

    tracing::info!(
        appointment_id = %created.appointment_id,
        clients = client_ids.len(),
        staff = staff_ids.len(),
        "appointment scheduled"
    );

    Ok((StatusCode::CREATED, Json(AppointmentSummary::from(created))))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    Json(payload): Json<UpdateAppointmentRequest>,
) -> AppResult<Json<AppointmentSummary>> {
    let mut errors = FieldErrors::default();
    let mut changeset = AppointmentChangeset::default();

    if let Some(purpose) = payload.purpose.as_deref() {
        changeset.purpose = Some(errors.required("purpose", purpose, "Purpose is required"));
    }
    if let Some(location) = payload.location.as_deref() {
        changeset.location = Some(errors.required("location", location, "Location is required"));
    }
    if let Some(raw) = payload.appointment_date.as_deref() {
        changeset.appointment_date = parse_timestamp(raw);
        if changeset.appointment_date.is_none() {
            errors.push("appointment_date", "Valid date is required");
        }
    }
    if let Some(raw) = payload.status.as_deref() {
        match AppointmentStatus::parse(raw) {
            Ok(status) => changeset.status = Some(status.as_str().to_string()),
            Err(err) => errors.push("status", err.to_string()),
        }
    }
    errors.finish()?;

    let mut conn = state.db()?;
    let existing: Appointment = appointments::table
        .find(&appointment_id)
        .first(&mut conn)?;

    let is_empty = changeset.purpose.is_none()
        && changeset.location.is_none()
        && changeset.appointment_date.is_none()
        && changeset.status.is_none();
    if is_empty {
        return Ok(Json(AppointmentSummary::from(existing)));
    }

    let updated: Appointment = diesel::update(appointments::table.find(&appointment_id))
        .set(&changeset)
        .get_result(&mut conn)?;
    Ok(Json(AppointmentSummary::from(updated)))
}
