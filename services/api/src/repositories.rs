//! Repositories for database operations

pub mod entity;

pub use entity::{EntityStore, StoreError};
