//! Sales Dashboard Library
//!
//! Loads a retail sales spreadsheet into SQLite once and serves grouped
//! summaries of it over a small read-only HTTP API.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod persistence;
