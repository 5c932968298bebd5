//! Credential store

pub mod user;

pub use user::UserRepository;
