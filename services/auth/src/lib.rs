//! Authentication for the journal service
//!
//! Holds the credential store, token signing and verification, and the
//! `/users/register` and `/users/login` routes. Other services verify bearer
//! tokens through [`Authenticator::verify`].

pub mod authenticator;
pub mod error;
pub mod jwt;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod validation;

pub use authenticator::Authenticator;
pub use error::AuthError;
pub use models::AuthUser;
