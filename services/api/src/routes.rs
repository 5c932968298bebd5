//! API service routes

use auth::AuthUser;
use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde_json::{Map, Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    middleware::auth_middleware,
    repositories::EntityStore,
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let mut protected_routes = Router::new();
    for store in state.stores() {
        protected_routes = protected_routes.merge(entity_router(
            store.clone(),
            state.expose_global_lists,
        ));
    }
    let protected_routes = protected_routes.route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    let api = auth::routes::create_router::<AppState>()
        .with_state(state.clone())
        .merge(protected_routes);

    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Routes for one collection
fn entity_router(store: EntityStore, expose_global_lists: bool) -> Router {
    let schema = store.schema();

    let mut router = Router::new()
        .route(
            &format!("/users/:user_id/{}", schema.path),
            get(list_for_user).post(create_for_user),
        )
        .route(
            &format!("/{}/:id", schema.path),
            get(get_record).put(update_record).delete(delete_record),
        );

    if expose_global_lists && schema.global_list {
        router = router.route(&format!("/{}", schema.path), get(list_all));
    }

    router.with_state(store)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "degraded" },
            "service": "journal-api",
            "database": if healthy { "connected" } else { "unavailable" },
        })),
    )
}

/// The caller may only address their own namespace
fn ensure_owner(user: &AuthUser, user_id: &str) -> ApiResult<i64> {
    match user_id.parse::<i64>() {
        Ok(id) if id == user.id => Ok(id),
        _ => {
            warn!(
                "User {} tried to access the namespace of user {}",
                user.id, user_id
            );
            Err(ApiError::Forbidden)
        }
    }
}

/// Record ids that are not integers cannot exist
fn record_id(id: &str) -> ApiResult<i64> {
    id.parse().map_err(|_| ApiError::NotFound)
}

fn json_object(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Map<String, Value>> {
    match payload {
        Ok(Json(Value::Object(body))) => Ok(body),
        Ok(Json(_)) => Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
        Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    }
}

pub async fn list_for_user(
    State(store): State<EntityStore>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let owner_id = ensure_owner(&user, &user_id)?;
    let records = store.list_by_owner(owner_id).await?;
    Ok(Json(records))
}

pub async fn create_for_user(
    State(store): State<EntityStore>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let owner_id = ensure_owner(&user, &user_id)?;
    let body = json_object(payload)?;

    let record = store.create(owner_id, &body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Unscoped listing across every owner
pub async fn list_all(
    State(store): State<EntityStore>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    info!(
        "User {} listed every {} record",
        user.id,
        store.schema().name
    );
    let records = store.list_all().await?;
    Ok(Json(records))
}

pub async fn get_record(
    State(store): State<EntityStore>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let record = store.find(record_id(&id)?, user.id).await?;
    Ok(Json(record))
}

pub async fn update_record(
    State(store): State<EntityStore>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = record_id(&id)?;
    let body = json_object(payload)?;

    let record = store.update(id, user.id, &body).await?;
    Ok(Json(record))
}

pub async fn delete_record(
    State(store): State<EntityStore>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    store.delete(record_id(&id)?, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
