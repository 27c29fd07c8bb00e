//! Velora Database Layer
//!
//! This crate provides PostgreSQL database access and repository implementations
//! for the Velora CRM. It includes:
//!
//! - Connection pool management with sqlx
//! - Embedded schema migrations
//! - Repository implementations for the CRM, campaign and chatbot entities

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use sqlx::{PgPool, Postgres};
pub use velora_core::{AppError, AppResult};
