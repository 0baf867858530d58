//! Read-only views for a signed-in staff member, scoped to their own records.

use axum::{extract::State, Json};
use diesel::prelude::*;
use serde::Serialize;

use crate::{
    auth::StaffUser,
    error::AppResult,
    models::{Appointment, Case, Document, Expense},
    schema::{appointment_staff, appointments, cases, documents, expenses, staff_cases},
    state::AppState,
    views::{
        build_appointment_details, AppointmentDetail, CaseSummary, DocumentSummary, ExpenseSummary,
    },
};

#[derive(Serialize)]
pub struct CaseDocument {
    #[serde(flatten)]
    pub document: DocumentSummary,
    pub case: CaseSummary,
}

pub async fn my_appointments(
    State(state): State<AppState>,
    user: StaffUser,
) -> AppResult<Json<Vec<AppointmentDetail>>> {
    let mut conn = state.db()?;
    let rows: Vec<Appointment> = appointment_staff::table
        .inner_join(appointments::table)
        .filter(appointment_staff::staff_id.eq(user.id()))
        .select(appointments::all_columns)
        .order(appointments::appointment_date.asc())
        .load(&mut conn)?;
    Ok(Json(build_appointment_details(&mut conn, rows)?))
}

pub async fn my_documents(
    State(state): State<AppState>,
    user: StaffUser,
) -> AppResult<Json<Vec<CaseDocument>>> {
    let mut conn = state.db()?;
    let own_cases = staff_cases::table
        .filter(staff_cases::staff_id.eq(user.id()))
        .select(staff_cases::case_id);

    let rows: Vec<(Document, Case)> = documents::table
        .inner_join(cases::table)
        .filter(documents::case_id.eq_any(own_cases))
        .select((documents::all_columns, cases::all_columns))
        .order(documents::upload_date.desc())
        .load(&mut conn)?;

    Ok(Json(
        rows.into_iter()
            .map(|(document, case)| CaseDocument {
                document: DocumentSummary::from(document),
                case: CaseSummary::from(case),
            })
            .collect(),
    ))
}

pub async fn my_expenses(
    State(state): State<AppState>,
    user: StaffUser,
) -> AppResult<Json<Vec<ExpenseSummary>>> {
    let mut conn = state.db()?;
    let rows: Vec<Expense> = expenses::table
        .filter(expenses::paid_by.eq(user.id()))
        .order(expenses::expense_date.desc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(ExpenseSummary::from).collect()))
}
