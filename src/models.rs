use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = clients)]
#[diesel(primary_key(client_id))]
pub struct Client {
    pub client_id: String,
    pub name: String,
    pub phone_no: String,
    pub address: String,
    pub image: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = clients)]
pub struct NewClient {
    pub client_id: String,
    pub name: String,
    pub phone_no: String,
    pub address: String,
    pub image: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = staff)]
#[diesel(primary_key(staff_id))]
pub struct Staff {
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
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = staff)]
pub struct NewStaff {
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
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = cases)]
#[diesel(primary_key(case_id))]
pub struct Case {
    pub case_id: String,
    pub title: String,
    pub court_name: String,
    pub case_type: String,
    pub status: String,
    pub filing_date: NaiveDateTime,
    pub verdict: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cases)]
pub struct NewCase {
    pub case_id: String,
    pub title: String,
    pub court_name: String,
    pub case_type: String,
    pub status: String,
    pub filing_date: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = appointments)]
#[diesel(primary_key(appointment_id))]
#[diesel(belongs_to(Case, foreign_key = case_id))]
pub struct Appointment {
    pub appointment_id: String,
    pub case_id: Option<String>,
    pub purpose: String,
    pub location: String,
    pub appointment_date: NaiveDateTime,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = appointments)]
pub struct NewAppointment {
    pub appointment_id: String,
    pub case_id: Option<String>,
    pub purpose: String,
    pub location: String,
    pub appointment_date: NaiveDateTime,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = appointment_clients)]
pub struct AppointmentClient {
    pub appointment_id: String,
    pub client_id: String,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = appointment_staff)]
pub struct AppointmentStaff {
    pub appointment_id: String,
    pub staff_id: String,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = client_cases)]
pub struct ClientCase {
    pub client_id: String,
    pub case_id: String,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = staff_cases)]
pub struct StaffCase {
    pub staff_id: String,
    pub case_id: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = billing)]
#[diesel(primary_key(billing_id))]
pub struct Billing {
    pub billing_id: String,
    pub client_id: String,
    pub case_id: String,
    pub amount_cents: i64,
    pub payment_date: Option<NaiveDateTime>,
    pub due_date: NaiveDateTime,
    pub payment_mode: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = billing)]
pub struct NewBilling {
    pub billing_id: String,
    pub client_id: String,
    pub case_id: String,
    pub amount_cents: i64,
    pub payment_date: Option<NaiveDateTime>,
    pub due_date: NaiveDateTime,
    pub payment_mode: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = expenses)]
#[diesel(primary_key(expense_id))]
pub struct Expense {
    pub expense_id: String,
    pub paid_by: String,
    pub description: String,
    pub amount_cents: i64,
    pub expense_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = expenses)]
pub struct NewExpense {
    pub expense_id: String,
    pub paid_by: String,
    pub description: String,
    pub amount_cents: i64,
    pub expense_date: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = documents)]
#[diesel(primary_key(document_id))]
#[diesel(belongs_to(Case, foreign_key = case_id))]
pub struct Document {
    pub document_id: String,
    pub case_id: String,
    pub title: String,
    pub doc_type: String,
    pub upload_date: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
pub struct NewDocument {
    pub document_id: String,
    pub case_id: String,
    pub title: String,
    pub doc_type: String,
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
