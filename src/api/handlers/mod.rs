// src/api/handlers/mod.rs
mod health;
mod compile;

pub use health::{health_check, home};
pub use compile::{compile, json_error_handler};
