use std::collections::{BTreeSet, HashMap};

use axum::{extract::State, Json};
use chrono::{Duration, NaiveDateTime, Utc};
use diesel::{prelude::*, PgConnection};
use serde::Serialize;

use crate::{
    auth::{ClientUser, StaffUser},
    error::AppResult,
    models::{Appointment, Case, Staff},
    schema::{
        appointment_staff, appointments, billing, cases, client_cases, clients, staff, staff_cases,
        users,
    },
    state::AppState,
    status::{BillingStatus, CaseStatus},
    views::{
        load_clients_for_appointments, load_staff_for_appointments, to_iso, CaseSummary,
        StaffSummary,
    },
};

use super::client_portal::{load_client_overview, ClientOverview};

#[derive(Serialize)]
pub struct TodayAppointment {
    pub appointment_id: String,
    pub purpose: String,
    pub location: String,
    pub appointment_date: String,
    pub clients: Vec<String>,
    pub staff: Vec<String>,
}

#[derive(Serialize)]
pub struct AdminDashboard {
    pub appointments_today: i64,
    pub active_cases: i64,
    pub staff_count: i64,
    pub client_count: i64,
    pub paid_bills: i64,
    pub pending_bills: i64,
    pub today_appointments: Vec<TodayAppointment>,
    pub active_cases_list: Vec<CaseSummary>,
}

#[derive(Serialize)]
pub struct StaffCaseOverview {
    #[serde(flatten)]
    pub case: CaseSummary,
    pub first_client: Option<String>,
}

#[derive(Serialize)]
pub struct StaffDashboard {
    pub staff: StaffSummary,
    pub today_appointments: Vec<TodayAppointment>,
    pub appointment_count: i64,
    pub cases: Vec<StaffCaseOverview>,
    pub client_count: usize,
}

/// Bounds of the current UTC day, end exclusive.
fn today_bounds() -> (NaiveDateTime, NaiveDateTime) {
    let start = Utc::now().date_naive().and_time(chrono::NaiveTime::MIN);
    (start, start + Duration::days(1))
}

fn today_appointments(
    conn: &mut PgConnection,
    rows: Vec<Appointment>,
) -> AppResult<Vec<TodayAppointment>> {
    let ids: Vec<String> = rows.iter().map(|row| row.appointment_id.clone()).collect();
    let mut clients_map = load_clients_for_appointments(conn, &ids)?;
    let mut staff_map = load_staff_for_appointments(conn, &ids)?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let clients = clients_map
                .remove(&row.appointment_id)
                .unwrap_or_default()
                .into_iter()
                .map(|client| client.name)
                .collect();
            let staff = staff_map
                .remove(&row.appointment_id)
                .unwrap_or_default()
                .into_iter()
                .map(|member| member.name)
                .collect();
            TodayAppointment {
                appointment_id: row.appointment_id,
                purpose: row.purpose,
                location: row.location,
                appointment_date: to_iso(row.appointment_date),
                clients,
                staff,
            }
        })
        .collect())
}

pub async fn admin_dashboard(State(state): State<AppState>) -> AppResult<Json<AdminDashboard>> {
    let mut conn = state.db()?;
    let (start, end) = today_bounds();

    let todays: Vec<Appointment> = appointments::table
        .filter(appointments::appointment_date.ge(start))
        .filter(appointments::appointment_date.lt(end))
        .order(appointments::appointment_date.asc())
        .load(&mut conn)?;

    let active_cases_list: Vec<Case> = cases::table
        .filter(cases::status.eq(CaseStatus::Active.as_str()))
        .order(cases::filing_date.desc())
        .load(&mut conn)?;

    let staff_count: i64 = staff::table.count().get_result(&mut conn)?;
    let client_count: i64 = clients::table.count().get_result(&mut conn)?;
    let paid_bills: i64 = billing::table
        .filter(billing::status.eq(BillingStatus::Paid.as_str()))
        .count()
        .get_result(&mut conn)?;
    let pending_bills: i64 = billing::table
        .filter(billing::status.eq(BillingStatus::Pending.as_str()))
        .count()
        .get_result(&mut conn)?;

    let appointments_today = todays.len() as i64;
    let active_cases = active_cases_list.len() as i64;

    Ok(Json(AdminDashboard {
        appointments_today,
        active_cases,
        staff_count,
        client_count,
        paid_bills,
        pending_bills,
        today_appointments: today_appointments(&mut conn, todays)?,
        active_cases_list: active_cases_list
            .into_iter()
            .map(CaseSummary::from)
            .collect(),
    }))
}

pub async fn staff_dashboard(
    State(state): State<AppState>,
    user: StaffUser,
) -> AppResult<Json<StaffDashboard>> {
    let mut conn = state.db()?;
    let staff_id = user.id();

    let (member, email): (Staff, String) = staff::table
        .inner_join(users::table)
        .filter(staff::staff_id.eq(staff_id))
        .select((staff::all_columns, users::email))
        .first(&mut conn)?;

    let appointment_count: i64 = appointment_staff::table
        .filter(appointment_staff::staff_id.eq(staff_id))
        .count()
        .get_result(&mut conn)?;

    let (start, end) = today_bounds();
    let todays: Vec<Appointment> = appointment_staff::table
        .inner_join(appointments::table)
        .filter(appointment_staff::staff_id.eq(staff_id))
        .filter(appointments::appointment_date.ge(start))
        .filter(appointments::appointment_date.lt(end))
        .select(appointments::all_columns)
        .order(appointments::appointment_date.asc())
        .load(&mut conn)?;

    let case_rows: Vec<Case> = staff_cases::table
        .inner_join(cases::table)
        .filter(staff_cases::staff_id.eq(staff_id))
        .select(cases::all_columns)
        .order(cases::filing_date.desc())
        .load(&mut conn)?;

    let case_ids: Vec<String> = case_rows.iter().map(|case| case.case_id.clone()).collect();
    let parties: Vec<(String, String, String)> = client_cases::table
        .inner_join(clients::table)
        .filter(client_cases::case_id.eq_any(&case_ids))
        .select((client_cases::case_id, clients::client_id, clients::name))
        .order(clients::name.asc())
        .load(&mut conn)?;

    let unique_clients: BTreeSet<&str> = parties
        .iter()
        .map(|(_, client_id, _)| client_id.as_str())
        .collect();
    let client_count = unique_clients.len();

    let mut first_client: HashMap<String, String> = HashMap::new();
    for (case_id, _, name) in &parties {
        first_client
            .entry(case_id.clone())
            .or_insert_with(|| name.clone());
    }

    let cases = case_rows
        .into_iter()
        .map(|case| StaffCaseOverview {
            first_client: first_client.remove(&case.case_id),
            case: CaseSummary::from(case),
        })
        .collect();

    Ok(Json(StaffDashboard {
        staff: StaffSummary::new(member, Some(email)),
        today_appointments: today_appointments(&mut conn, todays)?,
        appointment_count,
        cases,
        client_count,
    }))
}

pub async fn client_dashboard(
    State(state): State<AppState>,
    user: ClientUser,
) -> AppResult<Json<ClientOverview>> {
    let mut conn = state.db()?;
    Ok(Json(load_client_overview(&mut conn, user.id())?))
}
