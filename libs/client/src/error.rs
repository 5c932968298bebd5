//! Client errors

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by [`crate::JournalClient`]
#[derive(Error, Debug)]
pub enum ClientError {
    /// The call needs a session and there is none
    #[error("Not logged in")]
    NotLoggedIn,

    /// The server rejected the token; the session has been cleared
    #[error("Session expired")]
    SessionExpired,

    /// The server answered with an error status
    #[error("{message} ({status})")]
    Api { status: StatusCode, message: String },

    /// The server could not be reached or answered with something unreadable
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Text suitable for an alert shown to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::NotLoggedIn => "Please log in first.".to_string(),
            ClientError::SessionExpired => {
                "Your session has expired. Please log in again.".to_string()
            }
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Http(_) => {
                "Could not reach the server. Please try again.".to_string()
            }
        }
    }

    /// Whether the caller should send the user back to the login screen
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::NotLoggedIn | ClientError::SessionExpired)
    }
}
