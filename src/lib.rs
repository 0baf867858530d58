pub mod archival;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod models;
pub mod routes;
pub mod schema;
pub mod state;
pub mod status;
pub mod validation;
pub mod views;
