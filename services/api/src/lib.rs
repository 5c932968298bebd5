//! Journal API service
//!
//! Serves five owner-scoped collections (books, quotes, movies, diary
//! entries and activities) behind bearer-token authentication. Every
//! collection is handled by the same [`repositories::EntityStore`],
//! configured by a static schema from [`models`].

pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod settings;
pub mod state;

pub use routes::create_router;
pub use settings::Settings;
pub use state::AppState;
