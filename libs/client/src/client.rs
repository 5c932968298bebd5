//! HTTP client for the journal API

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{
    error::ClientError,
    models::Entity,
    session::{Session, SessionStore},
};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: String,
    user_id: i64,
}

/// Journal API client
///
/// Clones share the same session.
#[derive(Clone)]
pub struct JournalClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl JournalClient {
    /// Create a client for the server at `base_url`, e.g. `http://localhost:3000`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_session(base_url, SessionStore::default())
    }

    /// Create a client that reads and writes an existing session store
    pub fn with_session(base_url: impl Into<String>, session: SessionStore) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            session,
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.session.get()
    }

    /// Whether a session is stored and its token has not expired
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Create an account and sign in as it
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let request = self
            .http
            .post(self.url("/users/register"))
            .json(&json!({"name": name, "email": email, "password": password}));

        self.sign_in(request, name).await
    }

    pub async fn login(&self, name: &str, password: &str) -> Result<Session, ClientError> {
        let request = self
            .http
            .post(self.url("/users/login"))
            .json(&json!({"name": name, "password": password}));

        self.sign_in(request, name).await
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    /// The signed-in user's records
    pub async fn list<T: Entity>(&self) -> Result<Vec<T>, ClientError> {
        let session = self.require_session()?;
        let path = format!("/users/{}/{}", session.user_id, T::PATH);
        self.call(Method::GET, &path, None::<&()>).await
    }

    /// Every user's records, for the collections that allow it
    pub async fn list_all<T: Entity>(&self) -> Result<Vec<T>, ClientError> {
        self.call(Method::GET, &format!("/{}", T::PATH), None::<&()>)
            .await
    }

    pub async fn get<T: Entity>(&self, id: i64) -> Result<T, ClientError> {
        self.call(Method::GET, &format!("/{}/{id}", T::PATH), None::<&()>)
            .await
    }

    pub async fn create<T: Entity>(&self, record: &T) -> Result<T, ClientError> {
        let session = self.require_session()?;
        let path = format!("/users/{}/{}", session.user_id, T::PATH);
        self.call(Method::POST, &path, Some(record)).await
    }

    /// Save a record; fields left as `None` keep their stored value
    pub async fn update<T: Entity>(&self, id: i64, record: &T) -> Result<T, ClientError> {
        self.call(Method::PUT, &format!("/{}/{id}", T::PATH), Some(record))
            .await
    }

    /// Send a raw partial update; `null` or `""` clears an optional field
    pub async fn patch<T: Entity>(&self, id: i64, changes: &Value) -> Result<T, ClientError> {
        self.call(Method::PUT, &format!("/{}/{id}", T::PATH), Some(changes))
            .await
    }

    pub async fn delete<T: Entity>(&self, id: i64) -> Result<(), ClientError> {
        let request = self.authorized(Method::DELETE, &format!("/{}/{id}", T::PATH))?;
        self.check(request.send().await?).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn require_session(&self) -> Result<Session, ClientError> {
        self.session.get().ok_or(ClientError::NotLoggedIn)
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let session = self.require_session()?;
        Ok(self
            .http
            .request(method, self.url(path))
            .bearer_auth(session.token))
    }

    async fn call<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("{} {}", method, path);
        let mut request = self.authorized(method, path)?;
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Turn error statuses into errors, dropping the session on 401
    async fn check(&self, response: Response) -> Result<Response, ClientError> {
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Server rejected the session token, signing out");
            self.session.clear();
            return Err(ClientError::SessionExpired);
        }

        error_for_status(response).await
    }

    async fn sign_in(&self, request: RequestBuilder, name: &str) -> Result<Session, ClientError> {
        let response = error_for_status(request.send().await?).await?;
        let auth: AuthResponse = response.json().await?;

        let session = Session {
            token: auth.token,
            user_id: auth.user_id,
            user_name: name.to_string(),
        };
        self.session.set(session.clone());

        info!("Signed in as {} ({})", session.user_name, session.user_id);
        Ok(session)
    }
}

async fn error_for_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    Err(ClientError::Api { status, message })
}
