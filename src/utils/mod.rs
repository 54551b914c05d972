pub mod auth;
pub mod database;
pub mod password;
pub mod validation;
