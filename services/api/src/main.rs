use anyhow::Result;
use api::{AppState, Settings, create_router};
use auth::{Authenticator, jwt::JwtService, repositories::UserRepository};
use common::database::{health_check, init_pool, run_migrations};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting journal API service");

    let settings = Settings::new()?;
    if settings.jwt.uses_default_secret() {
        warn!("JWT_SECRET is not set, signing tokens with the development secret");
    }

    let pool = init_pool(&settings.database).await?;
    run_migrations(&pool).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let authenticator = Authenticator::new(
        UserRepository::new(pool.clone()),
        JwtService::new(settings.jwt.clone())?,
    );
    let app_state = AppState::new(pool, authenticator, settings.server.expose_global_lists);
    if !app_state.expose_global_lists {
        info!("Unscoped collection listings are disabled");
    }

    let app = create_router(app_state);

    let address = settings.server.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Journal API listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
