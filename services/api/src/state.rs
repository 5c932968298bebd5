//! Application state shared across handlers

use auth::Authenticator;
use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{
    models::{activity, book, diary, movie, quote},
    repositories::EntityStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub books: EntityStore,
    pub quotes: EntityStore,
    pub movies: EntityStore,
    pub diaries: EntityStore,
    pub activities: EntityStore,
    pub expose_global_lists: bool,
}

impl AppState {
    /// Build one store per collection over a shared pool
    pub fn new(db_pool: SqlitePool, authenticator: Authenticator, expose_global_lists: bool) -> Self {
        Self {
            books: EntityStore::new(db_pool.clone(), &book::SCHEMA),
            quotes: EntityStore::new(db_pool.clone(), &quote::SCHEMA),
            movies: EntityStore::new(db_pool.clone(), &movie::SCHEMA),
            diaries: EntityStore::new(db_pool.clone(), &diary::SCHEMA),
            activities: EntityStore::new(db_pool.clone(), &activity::SCHEMA),
            db_pool,
            authenticator,
            expose_global_lists,
        }
    }

    pub fn stores(&self) -> [&EntityStore; 5] {
        [
            &self.books,
            &self.quotes,
            &self.movies,
            &self.diaries,
            &self.activities,
        ]
    }
}

impl FromRef<AppState> for Authenticator {
    fn from_ref(state: &AppState) -> Self {
        state.authenticator.clone()
    }
}
