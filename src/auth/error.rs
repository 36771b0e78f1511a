use thiserror::Error;

/// Why a sign-in attempt did not produce a session
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("Sign-in link is invalid or was already used")]
    TokenNotFound,

    #[error("Sign-in link has expired, request a new one")]
    TokenExpired,

    #[error("Sign-in link was issued for a different email address")]
    EmailMismatch,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("{provider} cannot accept this kind of credential")]
    UnsupportedCredential { provider: &'static str },
}
