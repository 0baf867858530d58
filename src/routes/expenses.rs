use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{new_id, Expense, NewExpense},
    schema::{expenses, staff},
    state::AppState,
    validation::FieldErrors,
    views::ExpenseSummary,
};

#[derive(Deserialize)]
pub struct CreateExpenseRequest {
    #[serde(default)]
    pub paid_by: String,
    #[serde(default)]
    pub description: String,
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub expense_date: String,
}

#[derive(Serialize)]
pub struct ExpenseDetail {
    #[serde(flatten)]
    pub expense: ExpenseSummary,
    pub staff_name: String,
}

pub async fn list_expenses(State(state): State<AppState>) -> AppResult<Json<Vec<ExpenseDetail>>> {
    let mut conn = state.db()?;
    let rows: Vec<(Expense, String)> = expenses::table
        .inner_join(staff::table)
        .select((expenses::all_columns, staff::name))
        .order(expenses::expense_date.desc())
        .load(&mut conn)?;
    Ok(Json(
        rows.into_iter()
            .map(|(expense, staff_name)| ExpenseDetail {
                expense: ExpenseSummary::from(expense),
                staff_name,
            })
            .collect(),
    ))
}

pub async fn get_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
) -> AppResult<Json<ExpenseDetail>> {
    let mut conn = state.db()?;
    let (expense, staff_name): (Expense, String) = expenses::table
        .inner_join(staff::table)
        .filter(expenses::expense_id.eq(&expense_id))
        .select((expenses::all_columns, staff::name))
        .first(&mut conn)?;
    Ok(Json(ExpenseDetail {
        expense: ExpenseSummary::from(expense),
        staff_name,
    }))
}

pub async fn create_expense(
    State(state): State<AppState>,
    Json(payload): Json<CreateExpenseRequest>,
) -> AppResult<(StatusCode, Json<ExpenseSummary>)> {
    let mut errors = FieldErrors::default();
    let paid_by = errors.required("paid_by", &payload.paid_by, "Staff member is required");
    let description =
        errors.required("description", &payload.description, "Description is required");
    match payload.amount_cents {
        Some(amount) if amount <= 0 => errors.push("amount_cents", "Amount must be positive"),
        Some(_) => {}
        None => errors.push("amount_cents", "Amount is required"),
    }
    let expense_date =
        errors.date("expense_date", &payload.expense_date, "Valid date is required");
    errors.finish()?;

    let (Some(amount_cents), Some(expense_date)) = (payload.amount_cents, expense_date) else {
        return Err(AppError::bad_request("Validation error"));
    };

    let mut conn = state.db()?;
    staff::table
        .find(&paid_by)
        .select(staff::staff_id)
        .first::<String>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::bad_request("Unknown staff member"))?;

    let expense: Expense = diesel::insert_into(expenses::table)
        .values(&NewExpense {
            expense_id: new_id(),
            paid_by,
            description,
            amount_cents,
            expense_date,
        })
        .get_result(&mut conn)?;

    tracing::info!(expense_id = %expense.expense_id, paid_by = %expense.paid_by, "expense recorded");
    Ok((StatusCode::CREATED, Json(ExpenseSummary::from(expense))))
}
