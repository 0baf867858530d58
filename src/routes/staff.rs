use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use diesel::{prelude::*, PgConnection};
use serde::{Deserialize, Serialize};

use crate::{
    archival::StaffRemoval,
    auth::{password, Role},
    error::{AppError, AppResult},
    models::{new_id, Appointment, Case, NewStaff, NewUser, Staff},
    schema::{appointment_staff, appointments, cases, staff, staff_cases, users},
    state::AppState,
    status::StaffStatus,
    validation::FieldErrors,
    views::{AppointmentSummary, CaseSummary, StaffSummary},
};

use super::clients::email_taken;

#[derive(Deserialize)]
pub struct CreateStaffRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub experience: i32,
    #[serde(default)]
    pub phone_no: String,
    #[serde(default)]
    pub bar_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub specialisation: String,
    #[serde(default)]
    pub s_role: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateStaffRequest {
    pub name: Option<String>,
    pub experience: Option<i32>,
    pub phone_no: Option<String>,
    pub bar_number: Option<String>,
    pub address: Option<String>,
    pub specialisation: Option<String>,
    pub s_role: Option<String>,
    pub designation: Option<String>,
    pub image: Option<String>,
    pub status: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = staff)]
struct StaffChangeset {
    name: Option<String>,
    experience: Option<i32>,
    phone_no: Option<String>,
    bar_number: Option<String>,
    address: Option<String>,
    specialisation: Option<String>,
    s_role: Option<String>,
    designation: Option<String>,
    image: Option<String>,
    status: Option<String>,
}

impl StaffChangeset {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.experience.is_none()
            && self.phone_no.is_none()
            && self.bar_number.is_none()
            && self.address.is_none()
            && self.specialisation.is_none()
            && self.s_role.is_none()
            && self.designation.is_none()
            && self.image.is_none()
            && self.status.is_none()
    }
}

#[derive(Deserialize)]
pub struct RemoveStaffRequest {
    #[serde(rename = "staffId", default)]
    pub staff_id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(rename = "newStaffId", default)]
    pub new_staff_id: Option<String>,
    #[serde(rename = "clientId", default)]
    pub client_id: Option<String>,
}

#[derive(Serialize)]
pub struct RemoveStaffResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct StaffDetail {
    #[serde(flatten)]
    pub staff: StaffSummary,
    pub cases: Vec<CaseSummary>,
    pub appointments: Vec<AppointmentSummary>,
}

pub async fn list_staff(State(state): State<AppState>) -> AppResult<Json<Vec<StaffSummary>>> {
    let mut conn = state.db()?;
    let rows: Vec<(Staff, String)> = staff::table
        .inner_join(users::table)
        .select((staff::all_columns, users::email))
        .order(staff::name.asc())
        .load(&mut conn)?;
    Ok(Json(
        rows.into_iter()
            .map(|(member, email)| StaffSummary::new(member, Some(email)))
            .collect(),
    ))
}

pub async fn get_staff(
    State(state): State<AppState>,
    Path(staff_id): Path<String>,
) -> AppResult<Json<StaffDetail>> {
    let mut conn = state.db()?;
    Ok(Json(load_staff_detail(&mut conn, &staff_id)?))
}

pub(crate) fn load_staff_detail(conn: &mut PgConnection, staff_id: &str) -> AppResult<StaffDetail> {
    let (member, email): (Staff, String) = staff::table
        .inner_join(users::table)
        .filter(staff::staff_id.eq(staff_id))
        .select((staff::all_columns, users::email))
        .first(conn)?;

    let case_rows: Vec<Case> = staff_cases::table
        .inner_join(cases::table)
        .filter(staff_cases::staff_id.eq(staff_id))
        .select(cases::all_columns)
        .order(cases::filing_date.desc())
        .load(conn)?;

    let appointment_rows: Vec<Appointment> = appointment_staff::table
        .inner_join(appointments::table)
        .filter(appointment_staff::staff_id.eq(staff_id))
        .select(appointments::all_columns)
        .order(appointments::appointment_date.asc())
        .load(conn)?;

    Ok(StaffDetail {
        staff: StaffSummary::new(member, Some(email)),
        cases: case_rows.into_iter().map(CaseSummary::from).collect(),
        appointments: appointment_rows
            .into_iter()
            .map(AppointmentSummary::from)
            .collect(),
    })
}

pub async fn create_staff(
    State(state): State<AppState>,
    Json(payload): Json<CreateStaffRequest>,
) -> AppResult<(StatusCode, Json<StaffSummary>)> {
    let mut errors = FieldErrors::default();
    let name = errors.required("name", &payload.name, "Name is required");
    if payload.experience < 0 {
        errors.push("experience", "Experience cannot be negative");
    }
    let phone_no = errors.required("phone_no", &payload.phone_no, "Phone number is required");
    let bar_number = errors.required("bar_number", &payload.bar_number, "Bar number is required");
    let address = errors.required("address", &payload.address, "Address is required");
    let specialisation = errors.required(
        "specialisation",
        &payload.specialisation,
        "Specialisation is required",
    );
    let s_role = errors.required("s_role", &payload.s_role, "Role is required");
    let designation =
        errors.required("designation", &payload.designation, "Designation is required");
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
    let member = conn.transaction::<Staff, AppError, _>(|conn| {
        diesel::insert_into(users::table)
            .values(&NewUser {
                id: user_id.clone(),
                email: email.clone(),
                password_hash,
                role: Role::Staff.as_str().to_string(),
            })
            .execute(conn)?;

        Ok(diesel::insert_into(staff::table)
            .values(&NewStaff {
                staff_id: user_id.clone(),
                name,
                experience: payload.experience,
                phone_no,
                bar_number,
                address,
                specialisation,
                s_role,
                designation,
                image,
                status: StaffStatus::Working.as_str().to_string(),
            })
            .get_result(conn)?)
    })?;

    tracing::info!(staff_id = %member.staff_id, "staff account created");
    Ok((
        StatusCode::CREATED,
        Json(StaffSummary::new(member, Some(email))),
    ))
}

pub async fn update_staff(
    State(state): State<AppState>,
    Path(staff_id): Path<String>,
    Json(payload): Json<UpdateStaffRequest>,
) -> AppResult<Json<StaffSummary>> {
    let mut errors = FieldErrors::default();
    let mut changeset = StaffChangeset::default();

    let text_fields = [
        ("name", &payload.name, &mut changeset.name),
        ("phone_no", &payload.phone_no, &mut changeset.phone_no),
        ("bar_number", &payload.bar_number, &mut changeset.bar_number),
        ("address", &payload.address, &mut changeset.address),
        ("specialisation", &payload.specialisation, &mut changeset.specialisation),
        ("s_role", &payload.s_role, &mut changeset.s_role),
        ("designation", &payload.designation, &mut changeset.designation),
    ];
    for (field, incoming, target) in text_fields {
        if let Some(value) = incoming.as_deref() {
            *target = Some(errors.required(field, value, "must not be empty"));
        }
    }

    if let Some(experience) = payload.experience {
        if experience < 0 {
            errors.push("experience", "Experience cannot be negative");
        }
        changeset.experience = Some(experience);
    }
    changeset.image = payload
        .image
        .map(|image| image.trim().to_string())
        .filter(|image| !image.is_empty());
    if let Some(raw) = payload.status.as_deref() {
        match StaffStatus::parse(raw) {
            Ok(status) => changeset.status = Some(status.as_str().to_string()),
            Err(err) => errors.push("status", err.to_string()),
        }
    }
    errors.finish()?;

    let mut conn = state.db()?;
    let (existing, email): (Staff, String) = staff::table
        .inner_join(users::table)
        .filter(staff::staff_id.eq(&staff_id))
        .select((staff::all_columns, users::email))
        .first(&mut conn)?;

    if changeset.is_empty() {
        return Ok(Json(StaffSummary::new(existing, Some(email))));
    }

    let updated: Staff = diesel::update(staff::table.find(&staff_id))
        .set((&changeset, staff::updated_at.eq(Utc::now().naive_utc())))
        .get_result(&mut conn)?;
    Ok(Json(StaffSummary::new(updated, Some(email))))
}

pub async fn remove_staff(
    State(state): State<AppState>,
    Json(payload): Json<RemoveStaffRequest>,
) -> AppResult<Json<RemoveStaffResponse>> {
    let non_empty = |value: Option<String>| {
        value
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    let staff_id = non_empty(payload.staff_id);
    let action = non_empty(payload.action);
    let client_id = non_empty(payload.client_id);
    let new_staff_id = non_empty(payload.new_staff_id);

    let (Some(staff_id), Some(action), Some(client_id)) = (staff_id, action, client_id) else {
        return Err(AppError::bad_request(
            "Missing required fields (staffId, action, clientId)",
        ));
    };

    let removal = match (action.as_str(), new_staff_id) {
        ("reassign", Some(new_staff_id)) => StaffRemoval::Reassign { new_staff_id },
        ("reassign", None) => {
            return Err(AppError::bad_request("newStaffId is required to reassign"));
        }
        ("past client", _) => StaffRemoval::PastClient,
        _ => {
            return Err(AppError::bad_request(
                "Action must be either 'reassign' or 'past client'",
            ));
        }
    };

    let mut conn = state.db()?;
    staff::table
        .find(&staff_id)
        .select(staff::staff_id)
        .first::<String>(&mut conn)?;

    state
        .archival
        .remove_staff(&mut conn, &staff_id, &removal, &client_id)?;

    let message = match &removal {
        StaffRemoval::Reassign { new_staff_id } => {
            format!("Client {client_id} reassigned to staff {new_staff_id}")
        }
        StaffRemoval::PastClient => format!("Client {client_id} marked as past client"),
    };
    Ok(Json(RemoveStaffResponse {
        success: true,
        message,
    }))
}
