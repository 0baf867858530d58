//! Response shapes shared by the role-scoped route modules, and the batch
//! loaders that fill their relations.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::{dsl::NotEq, prelude::*, PgConnection};
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{Appointment, Billing, Case, Client, Document, Expense, Staff},
    schema::{
        appointment_clients, appointment_staff, cases, client_cases, clients, staff, staff_cases,
        users,
    },
    status::CaseStatus,
};

pub(crate) fn to_iso(dt: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc).to_rfc3339()
}

/// The single filter every client-facing case query goes through.
pub fn cases_visible_to_client() -> NotEq<cases::status, &'static str> {
    cases::status.ne(CaseStatus::Inactive.as_str())
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub client_id: String,
    pub name: String,
    pub phone_no: String,
    pub address: String,
    pub image: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ClientSummary {
    pub fn new(client: Client, email: Option<String>) -> Self {
        Self {
            client_id: client.client_id,
            name: client.name,
            phone_no: client.phone_no,
            address: client.address,
            image: client.image,
            status: client.status,
            email,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffSummary {
    pub staff_id: String,
    pub name: String,
    pub experience: i32,
    pub phone_no: String,
    pub bar_number: String,
    pub address: String,
    pub specialisation: String,
    pub s_role: String,
    pub designation: String,
    pub image: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl StaffSummary {
    pub fn new(member: Staff, email: Option<String>) -> Self {
        Self {
            staff_id: member.staff_id,
            name: member.name,
            experience: member.experience,
            phone_no: member.phone_no,
            bar_number: member.bar_number,
            address: member.address,
            specialisation: member.specialisation,
            s_role: member.s_role,
            designation: member.designation,
            image: member.image,
            status: member.status,
            email,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseSummary {
    pub case_id: String,
    pub title: String,
    pub court_name: String,
    pub case_type: String,
    pub status: String,
    pub filing_date: String,
    pub verdict: Option<String>,
}

impl From<Case> for CaseSummary {
    fn from(case: Case) -> Self {
        Self {
            case_id: case.case_id,
            title: case.title,
            court_name: case.court_name,
            case_type: case.case_type,
            status: case.status,
            filing_date: to_iso(case.filing_date),
            verdict: case.verdict,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentSummary {
    pub appointment_id: String,
    pub case_id: Option<String>,
    pub purpose: String,
    pub location: String,
    pub appointment_date: String,
    pub status: String,
}

impl From<Appointment> for AppointmentSummary {
    fn from(appointment: Appointment) -> Self {
        Self {
            appointment_id: appointment.appointment_id,
            case_id: appointment.case_id,
            purpose: appointment.purpose,
            location: appointment.location,
            appointment_date: to_iso(appointment.appointment_date),
            status: appointment.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BillingSummary {
    pub billing_id: String,
    pub client_id: String,
    pub case_id: String,
    pub amount_cents: i64,
    pub payment_date: Option<String>,
    pub due_date: String,
    pub payment_mode: Option<String>,
    pub status: String,
}

impl From<Billing> for BillingSummary {
    fn from(bill: Billing) -> Self {
        Self {
            billing_id: bill.billing_id,
            client_id: bill.client_id,
            case_id: bill.case_id,
            amount_cents: bill.amount_cents,
            payment_date: bill.payment_date.map(to_iso),
            due_date: to_iso(bill.due_date),
            payment_mode: bill.payment_mode,
            status: bill.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseSummary {
    pub expense_id: String,
    pub paid_by: String,
    pub description: String,
    pub amount_cents: i64,
    pub expense_date: String,
}

impl From<Expense> for ExpenseSummary {
    fn from(expense: Expense) -> Self {
        Self {
            expense_id: expense.expense_id,
            paid_by: expense.paid_by,
            description: expense.description,
            amount_cents: expense.amount_cents,
            expense_date: to_iso(expense.expense_date),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub document_id: String,
    pub case_id: String,
    pub title: String,
    pub doc_type: String,
    pub upload_date: String,
}

impl From<Document> for DocumentSummary {
    fn from(document: Document) -> Self {
        Self {
            document_id: document.document_id,
            case_id: document.case_id,
            title: document.title,
            doc_type: document.doc_type,
            upload_date: to_iso(document.upload_date),
        }
    }
}

pub fn load_clients_for_appointments(
    conn: &mut PgConnection,
    appointment_ids: &[String],
) -> AppResult<HashMap<String, Vec<ClientSummary>>> {
    if appointment_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(String, Client, String)> = appointment_clients::table
        .inner_join(clients::table.inner_join(users::table))
        .filter(appointment_clients::appointment_id.eq_any(appointment_ids))
        .order(clients::name.asc())
        .select((
            appointment_clients::appointment_id,
            clients::all_columns,
            users::email,
        ))
        .load(conn)?;

    let mut map: HashMap<String, Vec<ClientSummary>> = HashMap::new();
    for (appointment_id, client, email) in rows {
        map.entry(appointment_id)
            .or_default()
            .push(ClientSummary::new(client, Some(email)));
    }
    Ok(map)
}

pub fn load_staff_for_appointments(
    conn: &mut PgConnection,
    appointment_ids: &[String],
) -> AppResult<HashMap<String, Vec<StaffSummary>>> {
    if appointment_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(String, Staff)> = appointment_staff::table
        .inner_join(staff::table)
        .filter(appointment_staff::appointment_id.eq_any(appointment_ids))
        .order(staff::name.asc())
        .select((appointment_staff::appointment_id, staff::all_columns))
        .load(conn)?;

    let mut map: HashMap<String, Vec<StaffSummary>> = HashMap::new();
    for (appointment_id, member) in rows {
        map.entry(appointment_id)
            .or_default()
            .push(StaffSummary::new(member, None));
    }
    Ok(map)
}

pub fn load_clients_for_cases(
    conn: &mut PgConnection,
    case_ids: &[String],
) -> AppResult<HashMap<String, Vec<ClientSummary>>> {
    if case_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(String, Client, String)> = client_cases::table
        .inner_join(clients::table.inner_join(users::table))
        .filter(client_cases::case_id.eq_any(case_ids))
        .order(clients::name.asc())
        .select((client_cases::case_id, clients::all_columns, users::email))
        .load(conn)?;

    let mut map: HashMap<String, Vec<ClientSummary>> = HashMap::new();
    for (case_id, client, email) in rows {
        map.entry(case_id)
            .or_default()
            .push(ClientSummary::new(client, Some(email)));
    }
    Ok(map)
}

pub fn load_staff_for_cases(
    conn: &mut PgConnection,
    case_ids: &[String],
) -> AppResult<HashMap<String, Vec<StaffSummary>>> {
    if case_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(String, Staff)> = staff_cases::table
        .inner_join(staff::table)
        .filter(staff_cases::case_id.eq_any(case_ids))
        .order(staff::name.asc())
        .select((staff_cases::case_id, staff::all_columns))
        .load(conn)?;

    let mut map: HashMap<String, Vec<StaffSummary>> = HashMap::new();
    for (case_id, member) in rows {
        map.entry(case_id)
            .or_default()
            .push(StaffSummary::new(member, None));
    }
    Ok(map)
}

/// Cases keyed by id; `visible_only` drops cases clients may not see.
pub fn load_cases_by_id(
    conn: &mut PgConnection,
    case_ids: &[String],
    visible_only: bool,
) -> AppResult<HashMap<String, CaseSummary>> {
    if case_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query = cases::table
        .filter(cases::case_id.eq_any(case_ids))
        .into_boxed();
    if visible_only {
        query = query.filter(cases_visible_to_client());
    }
    let rows: Vec<Case> = query.load(conn)?;

    Ok(rows
        .into_iter()
        .map(|case| (case.case_id.clone(), CaseSummary::from(case)))
        .collect())
}

/// Appointment with its case and both sides of the attendance relation.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: AppointmentSummary,
    pub case: Option<CaseSummary>,
    pub clients: Vec<ClientSummary>,
    pub staff: Vec<StaffSummary>,
}

pub fn build_appointment_details(
    conn: &mut PgConnection,
    appointments: Vec<Appointment>,
) -> AppResult<Vec<AppointmentDetail>> {
    let appointment_ids = ids_of(&appointments);
    let case_ids = case_ids_of(&appointments);

    let mut clients_map = load_clients_for_appointments(conn, &appointment_ids)?;
    let mut staff_map = load_staff_for_appointments(conn, &appointment_ids)?;
    let cases_map = load_cases_by_id(conn, &case_ids, false)?;

    Ok(appointments
        .into_iter()
        .map(|appointment| {
            let case = appointment
                .case_id
                .as_ref()
                .and_then(|case_id| cases_map.get(case_id).cloned());
            let clients = clients_map
                .remove(&appointment.appointment_id)
                .unwrap_or_default();
            let staff = staff_map
                .remove(&appointment.appointment_id)
                .unwrap_or_default();
            AppointmentDetail {
                appointment: AppointmentSummary::from(appointment),
                case,
                clients,
                staff,
            }
        })
        .collect())
}

/// What a client sees of an appointment they attend: the case (when visible)
/// and the staff, never the other attendees.
#[derive(Debug, Clone, Serialize)]
pub struct ClientAppointment {
    #[serde(flatten)]
    pub appointment: AppointmentSummary,
    pub case: Option<CaseSummary>,
    pub staff: Vec<StaffSummary>,
}

pub fn build_client_appointments(
    conn: &mut PgConnection,
    appointments: Vec<Appointment>,
) -> AppResult<Vec<ClientAppointment>> {
    let appointment_ids = ids_of(&appointments);
    let case_ids = case_ids_of(&appointments);

    let mut staff_map = load_staff_for_appointments(conn, &appointment_ids)?;
    let cases_map = load_cases_by_id(conn, &case_ids, true)?;

    Ok(appointments
        .into_iter()
        .map(|appointment| {
            let case = appointment
                .case_id
                .as_ref()
                .and_then(|case_id| cases_map.get(case_id).cloned());
            let staff = staff_map
                .remove(&appointment.appointment_id)
                .unwrap_or_default();
            ClientAppointment {
                appointment: AppointmentSummary::from(appointment),
                case,
                staff,
            }
        })
        .collect())
}

fn ids_of(appointments: &[Appointment]) -> Vec<String> {
    appointments
        .iter()
        .map(|appointment| appointment.appointment_id.clone())
        .collect()
}

fn case_ids_of(appointments: &[Appointment]) -> Vec<String> {
    appointments
        .iter()
        .filter_map(|appointment| appointment.case_id.clone())
        .collect()
}

/// Case with the clients and staff linked to it.
#[derive(Debug, Clone, Serialize)]
pub struct CaseWithParties {
    #[serde(flatten)]
    pub case: CaseSummary,
    pub clients: Vec<ClientSummary>,
    pub staff: Vec<StaffSummary>,
}

pub fn build_cases_with_parties(
    conn: &mut PgConnection,
    case_rows: Vec<Case>,
) -> AppResult<Vec<CaseWithParties>> {
    let case_ids: Vec<String> = case_rows.iter().map(|case| case.case_id.clone()).collect();
    let mut clients_map = load_clients_for_cases(conn, &case_ids)?;
    let mut staff_map = load_staff_for_cases(conn, &case_ids)?;

    Ok(case_rows
        .into_iter()
        .map(|case| {
            let clients = clients_map.remove(&case.case_id).unwrap_or_default();
            let staff = staff_map.remove(&case.case_id).unwrap_or_default();
            CaseWithParties {
                case: CaseSummary::from(case),
                clients,
                staff,
            }
        })
        .collect())
}

/// A case as shown to one of its clients: the assigned staff only.
#[derive(Debug, Clone, Serialize)]
pub struct ClientCase {
    #[serde(flatten)]
    pub case: CaseSummary,
    pub staff: Vec<StaffSummary>,
}

/// Callers pass rows already filtered with [`cases_visible_to_client`].
pub fn build_client_cases(
    conn: &mut PgConnection,
    case_rows: Vec<Case>,
) -> AppResult<Vec<ClientCase>> {
    let case_ids: Vec<String> = case_rows.iter().map(|case| case.case_id.clone()).collect();
    let mut staff_map = load_staff_for_cases(conn, &case_ids)?;

    Ok(case_rows
        .into_iter()
        .map(|case| ClientCase {
            staff: staff_map.remove(&case.case_id).unwrap_or_default(),
            case: CaseSummary::from(case),
        })
        .collect())
}
