//! Identity extraction.
//!
//! The upstream session layer authenticates requests and forwards the
//! caller's opaque user id in the `x-user-id` header. No header means an
//! anonymous caller; detection accepts those, rewrite and subscription
//! endpoints do not. A malformed header is rejected outright.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's identity: an authenticated user id, or anonymous.
#[derive(Debug, Clone, Copy)]
pub struct Identity(Option<Uuid>);

impl Identity {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0
    }

    /// Returns the user id or rejects the request as unauthenticated.
    pub fn require(&self) -> Result<Uuid, AppError> {
        self.0.ok_or(AppError::Unauthorized)
    }

    #[cfg(test)]
    pub fn authenticated(user_id: Uuid) -> Self {
        Identity(Some(user_id))
    }

    #[cfg(test)]
    pub fn anonymous() -> Self {
        Identity(None)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(USER_ID_HEADER) {
            None => Ok(Identity(None)),
            Some(value) => {
                let raw = value.to_str().map_err(|_| AppError::Unauthorized)?;
                let user_id = Uuid::parse_str(raw).map_err(|_| AppError::Unauthorized)?;
                Ok(Identity(Some(user_id)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_on_anonymous_is_unauthorized() {
        let err = Identity::anonymous().require().unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_require_on_authenticated_returns_id() {
        let id = Uuid::new_v4();
        assert_eq!(Identity::authenticated(id).require().unwrap(), id);
    }
}
