use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{AccountStatus, Role};
use crate::state::AppState;

/// The authenticated caller. Self-service routes scope their lookups by the
/// principal's phone number rather than trusting ids from the request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub phone_number: String,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.roles.contains(&role) {
            Ok(())
        } else {
            Err(AppError::Forbidden("access denied".to_string()))
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let claims = state.tokens.verify(token)?;

        // The user row is re-checked on every request so a block or deletion
        // takes effect before the token expires.
        let user = state
            .store
            .users
            .get(&claims.sub)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::Unauthorized("user no longer exists".to_string()))?;

        if user.status == AccountStatus::Blocked {
            return Err(AppError::Forbidden("user is blocked".to_string()));
        }

        Ok(Principal {
            user_id: user.id,
            phone_number: user.phone_number,
            roles: user.roles,
        })
    }
}
