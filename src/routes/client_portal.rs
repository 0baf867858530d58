//! Read-only views for a signed-in client. Every case reached from here goes
//! through [`cases_visible_to_client`], and other clients on a shared case or
//! appointment are never listed.

use axum::{extract::State, Json};
use diesel::{prelude::*, PgConnection};
use serde::Serialize;

use crate::{
    auth::ClientUser,
    error::AppResult,
    models::{Appointment, Billing, Case, Client},
    schema::{appointment_clients, appointments, billing, cases, client_cases, clients, users},
    state::AppState,
    views::{
        build_client_appointments, build_client_cases, cases_visible_to_client, load_cases_by_id,
        BillingSummary, CaseSummary, ClientAppointment, ClientCase, ClientSummary,
    },
};

#[derive(Serialize)]
pub struct ClientBill {
    #[serde(flatten)]
    pub bill: BillingSummary,
    pub case: Option<CaseSummary>,
}

/// The signed-in client's own profile with their visible cases and appointments.
#[derive(Serialize)]
pub struct ClientOverview {
    #[serde(flatten)]
    pub client: ClientSummary,
    pub cases: Vec<ClientCase>,
    pub appointments: Vec<ClientAppointment>,
}

fn own_appointments(conn: &mut PgConnection, client_id: &str) -> AppResult<Vec<Appointment>> {
    Ok(appointment_clients::table
        .inner_join(appointments::table)
        .filter(appointment_clients::client_id.eq(client_id))
        .select(appointments::all_columns)
        .order(appointments::appointment_date.asc())
        .load(conn)?)
}

fn own_visible_cases(conn: &mut PgConnection, client_id: &str) -> AppResult<Vec<Case>> {
    Ok(client_cases::table
        .inner_join(cases::table)
        .filter(client_cases::client_id.eq(client_id))
        .filter(cases_visible_to_client())
        .select(cases::all_columns)
        .order(cases::filing_date.desc())
        .load(conn)?)
}

pub(crate) fn load_client_overview(
    conn: &mut PgConnection,
    client_id: &str,
) -> AppResult<ClientOverview> {
    let (client, email): (Client, String) = clients::table
        .inner_join(users::table)
        .filter(clients::client_id.eq(client_id))
        .select((clients::all_columns, users::email))
        .first(conn)?;

    let case_rows = own_visible_cases(conn, client_id)?;
    let appointment_rows = own_appointments(conn, client_id)?;

    Ok(ClientOverview {
        client: ClientSummary::new(client, Some(email)),
        cases: build_client_cases(conn, case_rows)?,
        appointments: build_client_appointments(conn, appointment_rows)?,
    })
}

pub async fn my_appointments(
    State(state): State<AppState>,
    user: ClientUser,
) -> AppResult<Json<Vec<ClientAppointment>>> {
    let mut conn = state.db()?;
    let rows = own_appointments(&mut conn, user.id())?;
    Ok(Json(build_client_appointments(&mut conn, rows)?))
}

pub async fn my_cases(
    State(state): State<AppState>,
    user: ClientUser,
) -> AppResult<Json<Vec<ClientCase>>> {
    let mut conn = state.db()?;
    let rows = own_visible_cases(&mut conn, user.id())?;
    Ok(Json(build_client_cases(&mut conn, rows)?))
}

pub async fn my_bills(
    State(state): State<AppState>,
    user: ClientUser,
) -> AppResult<Json<Vec<ClientBill>>> {
    let mut conn = state.db()?;
    let rows: Vec<Billing> = billing::table
        .filter(billing::client_id.eq(user.id()))
        .order(billing::due_date.asc())
        .load(&mut conn)?;

    let case_ids: Vec<String> = rows.iter().map(|bill| bill.case_id.clone()).collect();
    let visible = load_cases_by_id(&mut conn, &case_ids, true)?;

    Ok(Json(
        rows.into_iter()
            .map(|bill| ClientBill {
                case: visible.get(&bill.case_id).cloned(),
                bill: BillingSummary::from(bill),
            })
            .collect(),
    ))
}
