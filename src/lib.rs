// src/lib.rs
pub mod config;
pub mod errors;
pub mod workspace;
pub mod runner;
pub mod classifier;
pub mod compiler;
pub mod toolchain;
pub mod models;
pub mod banner;
pub mod api;
