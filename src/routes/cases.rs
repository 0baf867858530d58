use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use diesel::{prelude::*, PgConnection};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{
        new_id, Appointment, Billing, Case, ClientCase, Document, NewCase, NewDocument, StaffCase,
    },
    schema::{appointments, billing, cases, client_cases, clients, documents, staff, staff_cases},
    state::AppState,
    status::CaseStatus,
    validation::FieldErrors,
    views::{
        build_cases_with_parties, load_clients_for_cases, load_staff_for_cases,
        AppointmentSummary, BillingSummary, CaseSummary, CaseWithParties, ClientSummary,
        DocumentSummary, StaffSummary,
    },
};

use super::MessageResponse;

#[derive(Deserialize)]
pub struct CreateCaseRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub court_name: String,
    #[serde(default)]
    pub case_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub filing_date: String,
    #[serde(default)]
    pub clients: Vec<String>,
    #[serde(default)]
    pub staff: Vec<String>,
}

#[derive(Deserialize)]
pub struct UpdateCaseRequest {
    pub status: Option<String>,
    pub verdict: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = cases)]
struct CaseChangeset {
    status: Option<String>,
    verdict: Option<String>,
}

#[derive(Deserialize)]
pub struct LinkStaffRequest {
    #[serde(rename = "staffId", default)]
    pub staff_id: String,
}

#[derive(Deserialize)]
pub struct LinkClientRequest {
    #[serde(rename = "clientId", default)]
    pub client_id: String,
}

#[derive(Deserialize)]
pub struct CreateDocumentRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub doc_type: String,
}

#[derive(Serialize)]
pub struct CaseDetail {
    #[serde(flatten)]
    pub case: CaseSummary,
    pub clients: Vec<ClientSummary>,
    pub staff: Vec<StaffSummary>,
    pub appointments: Vec<AppointmentSummary>,
    pub documents: Vec<DocumentSummary>,
    pub billing: Vec<BillingSummary>,
}

#[derive(Serialize)]
pub struct CaseLink {
    pub case_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,
}

pub async fn list_cases(State(state): State<AppState>) -> AppResult<Json<Vec<CaseWithParties>>> {
    let mut conn = state.db()?;
    let rows: Vec<Case> = cases::table
        .order(cases::filing_date.desc())
        .load(&mut conn)?;
    Ok(Json(build_cases_with_parties(&mut conn, rows)?))
}

pub async fn get_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> AppResult<Json<CaseDetail>> {
    let mut conn = state.db()?;
    let case: Case = cases::table.find(&case_id).first(&mut conn)?;

    let ids = vec![case.case_id.clone()];
    let clients = load_clients_for_cases(&mut conn, &ids)?
        .remove(&case.case_id)
        .unwrap_or_default();
    let staff = load_staff_for_cases(&mut conn, &ids)?
        .remove(&case.case_id)
        .unwrap_or_default();

    let appointment_rows: Vec<Appointment> = appointments::table
        .filter(appointments::case_id.eq(&case_id))
        .order(appointments::appointment_date.asc())
        .load(&mut conn)?;
    let document_rows: Vec<Document> = documents::table
        .filter(documents::case_id.eq(&case_id))
        .order(documents::upload_date.desc())
        .load(&mut conn)?;
    let billing_rows: Vec<Billing> = billing::table
        .filter(billing::case_id.eq(&case_id))
        .order(billing::due_date.asc())
        .load(&mut conn)?;

    Ok(Json(CaseDetail {
        case: CaseSummary::from(case),
        clients,
        staff,
        appointments: appointment_rows.into_iter().map(Into::into).collect(),
        documents: document_rows.into_iter().map(Into::into).collect(),
        billing: billing_rows.into_iter().map(Into::into).collect(),
    }))
}

pub async fn create_case(
    State(state): State<AppState>,
    Json(payload): Json<CreateCaseRequest>,
) -> AppResult<(StatusCode, Json<CaseSummary>)> {
    let mut errors = FieldErrors::default();
    let title = errors.required("title", &payload.title, "Title is required");
    let court_name = errors.required("court_name", &payload.court_name, "Court name is required");
    let case_type = errors.required("case_type", &payload.case_type, "Case type is required");
    let status = if payload.status.trim().is_empty() {
        errors.push("status", "Status is required");
        None
    } else {
        match CaseStatus::parse(&payload.status) {
            Ok(status) => Some(status),
            Err(err) => {
                errors.push("status", err.to_string());
                None
            }
        }
    };
    let filing_date = errors.date("filing_date", &payload.filing_date, "Invalid date format");
    errors.non_empty_list("clients", &payload.clients, "At least one client is required");
    errors.non_empty_list("staff", &payload.staff, "At least one staff member is required");
    let client_ids = errors.id_list("clients", &payload.clients);
    let staff_ids = errors.id_list("staff", &payload.staff);
    errors.finish()?;

    let (Some(status), Some(filing_date)) = (status, filing_date) else {
        return Err(AppError::bad_request("Validation error"));
    };

    let new_case = NewCase {
        case_id: new_id(),
        title,
        court_name,
        case_type,
        status: status.as_str().to_string(),
        filing_date,
    };

    let mut conn = state.db()?;
    let created = conn.transaction::<Case, AppError, _>(|conn| {
        diesel::insert_into(cases::table)
            .values(&new_case)
            .execute(conn)?;

        let client_rows: Vec<ClientCase> = client_ids
            .iter()
            .map(|client_id| ClientCase {
                client_id: client_id.clone(),
                case_id: new_case.case_id.clone(),
            })
            .collect();
        diesel::insert_into(client_cases::table)
            .values(&client_rows)
            .execute(conn)?;

        let staff_rows: Vec<StaffCase> = staff_ids
            .iter()
            .map(|staff_id| StaffCase {
                staff_id: staff_id.clone(),
                case_id: new_case.case_id.clone(),
            })
            .collect();
        diesel::insert_into(staff_cases::table)
            .values(&staff_rows)
            .execute(conn)?;

        Ok(cases::table.find(&new_case.case_id).first(conn)?)
    })?;

    tracing::info!(case_id = %created.case_id, status = %created.status, "case opened");
    Ok((StatusCode::CREATED, Json(CaseSummary::from(created))))
}

/// `INACTIVE` goes through the archival procedure so the case's scheduled
/// appointments are cancelled with it.
pub async fn update_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(payload): Json<UpdateCaseRequest>,
) -> AppResult<Json<CaseSummary>> {
    let mut changeset = CaseChangeset::default();
    let mut archive = false;
    if let Some(raw) = payload.status.as_deref() {
        match CaseStatus::parse(raw)? {
            CaseStatus::Inactive => archive = true,
            status => changeset.status = Some(status.as_str().to_string()),
        }
    }
    changeset.verdict = payload
        .verdict
        .map(|verdict| verdict.trim().to_string())
        .filter(|verdict| !verdict.is_empty());

    let mut conn = state.db()?;
    let existing: Case = cases::table.find(&case_id).first(&mut conn)?;
    if changeset.status.is_none() && changeset.verdict.is_none() && !archive {
        return Ok(Json(CaseSummary::from(existing)));
    }

    if changeset.status.is_some() || changeset.verdict.is_some() {
        diesel::update(cases::table.find(&case_id))
            .set((&changeset, cases::updated_at.eq(Utc::now().naive_utc())))
            .execute(&mut conn)?;
    }
    if archive {
        state.archival.archive_case(&mut conn, &case_id)?;
        tracing::info!(case_id = %case_id, "case archived through status update");
    }

    let updated: Case = cases::table.find(&case_id).first(&mut conn)?;
    Ok(Json(CaseSummary::from(updated)))
}

pub async fn archive_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let mut conn = state.db()?;
    // The procedure is a no-op for unknown ids.
    ensure_case_exists(&mut conn, &case_id)?;

    state.archival.archive_case(&mut conn, &case_id)?;
    Ok(Json(MessageResponse::new("Case archived successfully")))
}

pub async fn add_case_staff(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(payload): Json<LinkStaffRequest>,
) -> AppResult<Json<CaseLink>> {
    let mut errors = FieldErrors::default();
    let staff_id = errors.required("staffId", &payload.staff_id, "Staff id is required");
    errors.finish()?;

    let mut conn = state.db()?;
    ensure_case_exists(&mut conn, &case_id)?;
    staff::table
        .find(&staff_id)
        .select(staff::staff_id)
        .first::<String>(&mut conn)?;

    let linked: i64 = staff_cases::table
        .filter(staff_cases::case_id.eq(&case_id))
        .filter(staff_cases::staff_id.eq(&staff_id))
        .count()
        .get_result(&mut conn)?;
    if linked > 0 {
        return Err(AppError::new(
            StatusCode::CONFLICT,
            "Staff member is already assigned to this case",
        ));
    }

    diesel::insert_into(staff_cases::table)
        .values(&StaffCase {
            staff_id: staff_id.clone(),
            case_id: case_id.clone(),
        })
        .execute(&mut conn)?;

    Ok(Json(CaseLink {
        case_id,
        client_id: None,
        staff_id: Some(staff_id),
    }))
}

fn ensure_case_exists(conn: &mut PgConnection, case_id: &str) -> AppResult<()> {
    cases::table
        .find(case_id)
        .select(cases::case_id)
        .first::<String>(conn)?;
    Ok(())
}

pub async fn remove_case_staff(
    State(state): State<AppState>,
    Path((case_id, staff_id)): Path<(String, String)>,
) -> AppResult<Json<MessageResponse>> {
    let mut conn = state.db()?;
    diesel::delete(
        staff_cases::table
            .filter(staff_cases::case_id.eq(&case_id))
            .filter(staff_cases::staff_id.eq(&staff_id)),
    )
    .execute(&mut conn)?;
    Ok(Json(MessageResponse::new("Staff removed from case")))
}

pub async fn add_case_client(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(payload): Json<LinkClientRequest>,
) -> AppResult<Json<CaseLink>> {
    let mut errors = FieldErrors::default();
    let client_id = errors.required("clientId", &payload.client_id, "Client id is required");
    errors.finish()?;

    let mut conn = state.db()?;
    ensure_case_exists(&mut conn, &case_id)?;
    clients::table
        .find(&client_id)
        .select(clients::client_id)
        .first::<String>(&mut conn)?;

    let linked: i64 = client_cases::table
        .filter(client_cases::case_id.eq(&case_id))
        .filter(client_cases::client_id.eq(&client_id))
        .count()
        .get_result(&mut conn)?;
    if linked > 0 {
        return Err(AppError::new(
            StatusCode::CONFLICT,
            "Client is already a party to this case",
        ));
    }

    diesel::insert_into(client_cases::table)
        .values(&ClientCase {
            client_id: client_id.clone(),
            case_id: case_id.clone(),
        })
        .execute(&mut conn)?;

    Ok(Json(CaseLink {
        case_id,
        client_id: Some(client_id),
        staff_id: None,
    }))
}

pub async fn remove_case_client(
    State(state): State<AppState>,
    Path((case_id, client_id)): Path<(String, String)>,
) -> AppResult<Json<MessageResponse>> {
    let mut conn = state.db()?;
    diesel::delete(
        client_cases::table
            .filter(client_cases::case_id.eq(&case_id))
            .filter(client_cases::client_id.eq(&client_id)),
    )
    .execute(&mut conn)?;
    Ok(Json(MessageResponse::new("Client removed from case")))
}

pub async fn add_case_document(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(payload): Json<CreateDocumentRequest>,
) -> AppResult<(StatusCode, Json<DocumentSummary>)> {
    let mut errors = FieldErrors::default();
    let title = errors.required("title", &payload.title, "Title is required");
    let doc_type = errors.required("doc_type", &payload.doc_type, "Document type is required");
    errors.finish()?;

    let mut conn = state.db()?;
    ensure_case_exists(&mut conn, &case_id)?;

    let document: Document = diesel::insert_into(documents::table)
        .values(&NewDocument {
            document_id: new_id(),
            case_id,
            title,
            doc_type,
        })
        .get_result(&mut conn)?;
    Ok((StatusCode::CREATED, Json(DocumentSummary::from(document))))
}
