use axum::http::{header, HeaderMap};

use super::access::Caller;
use super::domain::UserId;

/// Session lookups delegated to the auth provider.
pub trait SessionProvider: Send + Sync {
    /// Returns the user owning `token`, or `None` for unknown or revoked tokens.
    fn current_user(&self, token: &str) -> Result<Option<UserId>, SessionError>;
    fn sign_out(&self, token: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("auth provider unavailable: {0}")]
    Unavailable(String),
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolves the request's caller. Missing or unknown tokens yield `Caller::Anonymous`.
pub fn resolve_caller(
    sessions: &dyn SessionProvider,
    headers: &HeaderMap,
) -> Result<Caller, SessionError> {
    match bearer_token(headers) {
        Some(token) => Ok(sessions
            .current_user(token)?
            .map(Caller::User)
            .unwrap_or(Caller::Anonymous)),
        None => Ok(Caller::Anonymous),
    }
}
