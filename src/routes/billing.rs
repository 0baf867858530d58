use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use diesel::{prelude::*, PgConnection};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{new_id, Billing, Case, Client, NewBilling},
    schema::{billing, cases, client_cases, clients},
    state::AppState,
    status::BillingStatus,
    validation::{parse_timestamp, FieldErrors},
    views::{BillingSummary, CaseSummary, ClientSummary},
};

#[derive(Deserialize)]
pub struct CreateBillingRequest {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub case_id: String,
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub due_date: String,
    pub payment_date: Option<String>,
    pub payment_mode: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateBillingRequest {
    pub status: Option<String>,
    pub payment_date: Option<String>,
    pub payment_mode: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = billing)]
struct BillingChangeset {
    status: Option<String>,
    payment_date: Option<NaiveDateTime>,
    payment_mode: Option<String>,
}

/// A bill with the client it is charged to and the case it belongs to.
#[derive(Serialize)]
pub struct BillingDetail {
    #[serde(flatten)]
    pub bill: BillingSummary,
    pub client: ClientSummary,
    pub case: CaseSummary,
}

impl BillingDetail {
    fn new((bill, client, case): (Billing, Client, Case)) -> Self {
        Self {
            bill: BillingSummary::from(bill),
            client: ClientSummary::new(client, None),
            case: CaseSummary::from(case),
        }
    }
}

pub async fn list_billing(State(state): State<AppState>) -> AppResult<Json<Vec<BillingDetail>>> {
    let mut conn = state.db()?;
    let rows: Vec<(Billing, Client, Case)> = billing::table
        .inner_join(clients::table)
        .inner_join(cases::table)
        .select((
            billing::all_columns,
            clients::all_columns,
            cases::all_columns,
        ))
        .order(billing::due_date.asc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(BillingDetail::new).collect()))
}

pub async fn get_billing(
    State(state): State<AppState>,
    Path(billing_id): Path<String>,
) -> AppResult<Json<BillingDetail>> {
    let mut conn = state.db()?;
    Ok(Json(load_billing_detail(&mut conn, &billing_id)?))
}

fn load_billing_detail(conn: &mut PgConnection, billing_id: &str) -> AppResult<BillingDetail> {
    let row: (Billing, Client, Case) = billing::table
        .inner_join(clients::table)
        .inner_join(cases::table)
        .filter(billing::billing_id.eq(billing_id))
        .select((
            billing::all_columns,
            clients::all_columns,
            cases::all_columns,
        ))
        .first(conn)?;
    Ok(BillingDetail::new(row))
}

pub async fn create_billing(
    State(state): State<AppState>,
    Json(payload): Json<CreateBillingRequest>,
) -> AppResult<(StatusCode, Json<BillingSummary>)> {
    let mut errors = FieldErrors::default();
    let client_id = errors.required("client_id", &payload.client_id, "Client is required");
    let case_id = errors.required("case_id", &payload.case_id, "Case is required");
    match payload.amount_cents {
        Some(amount) if amount < 0 => errors.push("amount_cents", "Amount cannot be negative"),
        Some(_) => {}
        None => errors.push("amount_cents", "Amount is required"),
    }
    let due_date = errors.date("due_date", &payload.due_date, "Valid due date is required");
    let payment_date = match payload.payment_date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                errors.push("payment_date", "Invalid date format");
            }
            parsed
        }
        _ => None,
    };
    let status = match payload.status.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match BillingStatus::parse(raw) {
            Ok(status) => status,
            Err(err) => {
                errors.push("status", err.to_string());
                BillingStatus::Pending
            }
        },
        _ => BillingStatus::Pending,
    };
    errors.finish()?;

    let (Some(amount_cents), Some(due_date)) = (payload.amount_cents, due_date) else {
        return Err(AppError::bad_request("Validation error"));
    };

    let mut conn = state.db()?;
    let linked: i64 = client_cases::table
        .filter(client_cases::client_id.eq(&client_id))
        .filter(client_cases::case_id.eq(&case_id))
        .count()
        .get_result(&mut conn)?;
    if linked == 0 {
        return Err(AppError::bad_request("Client is not a party to this case"));
    }

    let bill: Billing = diesel::insert_into(billing::table)
        .values(&NewBilling {
            billing_id: new_id(),
            client_id,
            case_id,
            amount_cents,
            payment_date,
            due_date,
            payment_mode: payload
                .payment_mode
                .map(|mode| mode.trim().to_string())
                .filter(|mode| !mode.is_empty()),
            status: status.as_str().to_string(),
        })
        .get_result(&mut conn)?;

    tracing::info!(billing_id = %bill.billing_id, amount_cents, "bill issued");
    Ok((StatusCode::CREATED, Json(BillingSummary::from(bill))))
}

pub async fn update_billing(
    State(state): State<AppState>,
    Path(billing_id): Path<String>,
    Json(payload): Json<UpdateBillingRequest>,
) -> AppResult<Json<BillingSummary>> {
    let mut errors = FieldErrors::default();
    let mut changeset = BillingChangeset::default();

    if let Some(raw) = payload.status.as_deref() {
        match BillingStatus::parse(raw) {
            Ok(status) => changeset.status = Some(status.as_str().to_string()),
            Err(err) => errors.push("status", err.to_string()),
        }
    }
    if let Some(raw) = payload.payment_date.as_deref() {
        changeset.payment_date = parse_timestamp(raw);
        if changeset.payment_date.is_none() {
            errors.push("payment_date", "Invalid date format");
        }
    }
    changeset.payment_mode = payload
        .payment_mode
        .map(|mode| mode.trim().to_string())
        .filter(|mode| !mode.is_empty());
    errors.finish()?;

    let mut conn = state.db()?;
    let existing: Billing = billing::table.find(&billing_id).first(&mut conn)?;

    if changeset.status.is_none()
        && changeset.payment_date.is_none()
        && changeset.payment_mode.is_none()
    {
        return Ok(Json(BillingSummary::from(existing)));
    }

    let updated: Billing = diesel::update(billing::table.find(&billing_id))
        .set(&changeset)
        .get_result(&mut conn)?;
    Ok(Json(BillingSummary::from(updated)))
}
