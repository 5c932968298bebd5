//! Bearer token authentication

use auth::Authenticator;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::debug;

use crate::error::ApiError;

/// Reject requests without a valid bearer token
///
/// On success the token holder is inserted into the request extensions as
/// an [`auth::AuthUser`].
pub async fn auth_middleware(
    State(auth): State<Authenticator>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        debug!("Rejected {} without a bearer token", req.uri().path());
        return Err(ApiError::Unauthorized);
    };

    let user = auth.verify(bearer.token()).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
