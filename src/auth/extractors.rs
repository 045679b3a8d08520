use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::Sessions;
use crate::error::AppError;

/// Resolves the bearer token to the id of the user it was issued to.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Sessions: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let sessions = Sessions::from_ref(state);
        match sessions.resolve(token.trim()).await? {
            Some(user_id) => Ok(AuthUser(user_id)),
            None => {
                warn!("invalid or revoked token");
                Err(AppError::Unauthorized("Invalid or expired token".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::{header::AUTHORIZATION, Request};

    async fn extract(state: &AppState, header: Option<&str>) -> Result<Uuid, AppError> {
        let mut builder = Request::builder().uri("/v1/profile");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, state)
            .await
            .map(|AuthUser(id)| id)
    }

    #[tokio::test]
    async fn accepts_issued_bearer_token() {
        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let token = Sessions::from_ref(&state).issue(user_id).await.unwrap();
        let header = format!("Bearer {token}");
        assert_eq!(extract(&state, Some(&header)).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn rejects_missing_or_malformed_header() {
        let state = AppState::fake();
        for header in [None, Some("Basic abc"), Some("Bearer nope")] {
            let err = extract(&state, header).await.unwrap_err();
            assert!(matches!(err, AppError::Unauthorized(_)), "{header:?}");
        }
    }
}
