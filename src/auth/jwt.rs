use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::{CredentialVerifier, Principal};
use crate::models::Role;

/// Claims carried by dashboard session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

/// Verifies HS256 tokens signed with the shared dashboard secret.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = 30;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl CredentialVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Option<Principal> {
        let data = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(error = %e, "token rejected");
                return None;
            }
        };

        let claims = data.claims;
        let role = Role::parse(&claims.role)?;
        Some(Principal {
            user_id: claims.user_id,
            email: claims.email,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn sign(secret: &str, role: &str, exp_offset: i64) -> String {
        let claims = Claims {
            user_id: "u-1".to_string(),
            email: "admin@example.com".to_string(),
            role: role.to_string(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_valid_token() {
        let verifier = JwtVerifier::new("secret");
        let principal = verifier.verify(&sign("secret", "ADMIN", 3600)).await.unwrap();
        assert_eq!(principal.user_id, "u-1");
        assert_eq!(principal.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_lowercase_role_accepted() {
        let verifier = JwtVerifier::new("secret");
        let principal = verifier.verify(&sign("secret", "owner", 3600)).await.unwrap();
        assert_eq!(principal.role, Role::Owner);
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let verifier = JwtVerifier::new("secret");
        assert!(verifier.verify(&sign("other", "ADMIN", 3600)).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let verifier = JwtVerifier::new("secret");
        assert!(verifier.verify(&sign("secret", "ADMIN", -3600)).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_role_rejected() {
        let verifier = JwtVerifier::new("secret");
        assert!(verifier.verify(&sign("secret", "ROOT", 3600)).await.is_none());
    }

    #[tokio::test]
    async fn test_garbage_rejected() {
        let verifier = JwtVerifier::new("secret");
        assert!(verifier.verify("not-a-jwt").await.is_none());
    }
}
