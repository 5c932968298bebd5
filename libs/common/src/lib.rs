//! Common library for the journal services
//!
//! This crate provides functionality shared by the services and the client:
//! SQLite connectivity, schema migrations and database errors (behind the
//! default `database` feature), plus the tag normalization rules both sides
//! of the API apply.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = init_pool(&DatabaseConfig::default()).await?;
//!     run_migrations(&pool).await?;
//!     println!("Database health check: {}", health_check(&pool).await?);
//!     Ok(())
//! }
//! ```

#[cfg(feature = "database")]
pub mod database;
#[cfg(feature = "database")]
pub mod error;
pub mod tags;
