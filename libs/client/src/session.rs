//! Signed-in session state

use jsonwebtoken::{DecodingKey, Validation};
use serde::Deserialize;
use std::{
    sync::{Arc, PoisonError, RwLock},
    time::{SystemTime, UNIX_EPOCH},
};

/// The token and identity returned by register or login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub user_name: String,
}

#[derive(Deserialize)]
struct Expiry {
    exp: Option<u64>,
}

impl Session {
    /// The token's `exp` claim, read without checking the signature
    pub fn expires_at(&self) -> Option<u64> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<Expiry>(&self.token, &DecodingKey::from_secret(&[]), &validation)
            .ok()?
            .claims
            .exp
    }

    /// A token without a readable `exp` counts as expired
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.expires_at().is_none_or(|exp| now > exp)
    }

    pub fn is_expired(&self) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.is_expired_at(now)
    }
}

/// Session storage shared between clones of a client
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn get(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, session: Session) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a session is stored and its token has not expired
    pub fn is_authenticated(&self) -> bool {
        self.get().is_some_and(|session| !session.is_expired())
    }
}
