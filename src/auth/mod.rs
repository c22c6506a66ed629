pub mod jwt;

use async_trait::async_trait;
use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::models::Role;

/// Verified identity behind a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Resolves a raw token to a principal, or `None` if it is invalid.
    async fn verify(&self, token: &str) -> Option<Principal>;
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Checks that `token` belongs to an administrator.
pub async fn require_admin_token(
    verifier: &dyn CredentialVerifier,
    token: Option<&str>,
) -> Result<Principal, AppError> {
    let token = token.ok_or(AppError::Unauthorized)?;
    let principal = verifier.verify(token).await.ok_or(AppError::Unauthorized)?;

    if !principal.is_admin() {
        tracing::warn!(user_id = %principal.user_id, "non-admin credential rejected");
        return Err(AppError::Forbidden("admin role required".to_string()));
    }
    Ok(principal)
}

pub async fn require_admin(
    verifier: &dyn CredentialVerifier,
    headers: &HeaderMap,
) -> Result<Principal, AppError> {
    require_admin_token(verifier, bearer_token(headers)).await
}
