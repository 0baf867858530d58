//! Archival side effects delegated to the database.
//!
//! Cases and clients are never deleted. Archiving flips their status and
//! cancels dependent appointments; removing a staff member either hands their
//! work for one client to a colleague or archives that client. The shipped
//! migrations define the procedures with this contract:
//!
//! * `sp_archive_case(case_id)`: case status becomes `INACTIVE`, its
//!   `scheduled` appointments become `canceled`.
//! * `sp_archive_client(client_id)`: client status becomes `PAST CLIENT`,
//!   `scheduled` appointments the client attends become `canceled`.
//! * `sp_remove_staff(staff_id, action, new_staff_id, client_id)`: `reassign`
//!   moves the staff member's case and appointment links for that client to
//!   `new_staff_id`; `past client` archives the client. Either way the staff
//!   member is marked `not working` once no case links remain.

use std::fmt;

use diesel::{
    pg::PgConnection,
    sql_query,
    sql_types::{Nullable, Text},
    RunQueryDsl,
};

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffRemoval {
    Reassign { new_staff_id: String },
    PastClient,
}

impl StaffRemoval {
    pub fn action(&self) -> &'static str {
        match self {
            StaffRemoval::Reassign { .. } => "reassign",
            StaffRemoval::PastClient => "past client",
        }
    }

    fn new_staff_id(&self) -> Option<&str> {
        match self {
            StaffRemoval::Reassign { new_staff_id } => Some(new_staff_id),
            StaffRemoval::PastClient => None,
        }
    }
}

impl fmt::Display for StaffRemoval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

pub trait ArchivalService: Send + Sync + 'static {
    fn archive_case(&self, conn: &mut PgConnection, case_id: &str) -> AppResult<()>;

    fn archive_client(&self, conn: &mut PgConnection, client_id: &str) -> AppResult<()>;

    fn remove_staff(
        &self,
        conn: &mut PgConnection,
        staff_id: &str,
        removal: &StaffRemoval,
        client_id: &str,
    ) -> AppResult<()>;
}

/// Calls the archival stored procedures positionally; return values are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct StoredProcedureArchival;

impl ArchivalService for StoredProcedureArchival {
    fn archive_case(&self, conn: &mut PgConnection, case_id: &str) -> AppResult<()> {
        sql_query("CALL sp_archive_case($1)")
            .bind::<Text, _>(case_id)
            .execute(conn)?;
        tracing::info!(case_id, "case archived");
        Ok(())
    }

    fn archive_client(&self, conn: &mut PgConnection, client_id: &str) -> AppResult<()> {
        sql_query("CALL sp_archive_client($1)")
            .bind::<Text, _>(client_id)
            .execute(conn)?;
        tracing::info!(client_id, "client archived");
        Ok(())
    }

    fn remove_staff(
        &self,
        conn: &mut PgConnection,
        staff_id: &str,
        removal: &StaffRemoval,
        client_id: &str,
    ) -> AppResult<()> {
        sql_query("CALL sp_remove_staff($1, $2, $3, $4)")
            .bind::<Text, _>(staff_id)
            .bind::<Text, _>(removal.action())
            .bind::<Nullable<Text>, _>(removal.new_staff_id())
            .bind::<Text, _>(client_id)
            .execute(conn)?;
        tracing::info!(staff_id, client_id, action = removal.action(), "staff removed from client");
        Ok(())
    }
}
