//! PostgreSQL persistence for the wooza plan catalogue.

pub mod config;
pub mod filter;
pub mod models;
pub mod pool;
pub mod queries;
