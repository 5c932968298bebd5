//! Credential verification and token issuance

use tracing::{info, warn};

use crate::{
    error::AuthError,
    jwt::JwtService,
    models::{AuthResponse, AuthUser, LoginRequest, NewUser, RegisterRequest, User},
    repositories::UserRepository,
    validation::{validate_login, validate_registration},
};

/// Registers users, checks their credentials and verifies bearer tokens
#[derive(Clone)]
pub struct Authenticator {
    users: UserRepository,
    jwt: JwtService,
}

impl Authenticator {
    pub fn new(users: UserRepository, jwt: JwtService) -> Self {
        Self { users, jwt }
    }

    /// Register a new user and sign them in
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AuthError> {
        validate_registration(request).map_err(AuthError::Validation)?;

        let name = request.name.trim();
        let email = request.email.trim();

        if self.users.exists(name, email).await? {
            info!("Registration rejected, name or email taken: {}", name);
            return Err(AuthError::Conflict);
        }

        let user = self
            .users
            .create(&NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password: request.password.clone(),
            })
            .await?;

        info!("Registered user {} ({})", user.name, user.id);
        self.issue(&user)
    }

    /// Check a name and password and issue a token
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        validate_login(request).map_err(AuthError::Validation)?;

        let Some(user) = self.users.find_by_name(request.name.trim()).await? else {
            info!("Login attempt for unknown user: {}", request.name);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.users.verify_password(&user, &request.password) {
            warn!("Login attempt with wrong password for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        self.issue(&user)
    }

    /// Verify a bearer token and identify its holder
    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let claims = self
            .jwt
            .validate_token(token)
            .map_err(AuthError::InvalidToken)?;

        Ok(AuthUser {
            id: claims.sub,
            name: claims.name,
        })
    }

    fn issue(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let token = self
            .jwt
            .generate_token(user)
            .map_err(AuthError::Signing)?;

        Ok(AuthResponse {
            token,
            user_id: user.id,
        })
    }
}
