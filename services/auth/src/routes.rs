//! Authentication routes
//!
//! The router is generic over the host application's state so it can be
//! merged into any service that can hand out an [`Authenticator`].

use axum::{
    Json, Router,
    extract::{FromRef, State, rejection::JsonRejection},
    response::IntoResponse,
    routing::post,
};
use tracing::info;

use crate::{
    Authenticator,
    error::AuthError,
    models::{LoginRequest, RegisterRequest},
};

/// Create the router for the registration and login endpoints
pub fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    Authenticator: FromRef<S>,
{
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
}

/// Unreadable bodies are validation failures like any other
fn read_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    body.map(|Json(body)| body)
        .map_err(|rejection| AuthError::Validation(rejection.body_text()))
}

/// User registration endpoint
pub async fn register(
    State(auth): State<Authenticator>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let payload = read_body(body)?;
    info!("Registration request for user: {}", payload.name);
    let response = auth.register(&payload).await?;
    Ok(Json(response))
}

/// User login endpoint
pub async fn login(
    State(auth): State<Authenticator>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let payload = read_body(body)?;
    info!("Login attempt for user: {}", payload.name);
    let response = auth.login(&payload).await?;
    Ok(Json(response))
}
