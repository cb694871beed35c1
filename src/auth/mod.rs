pub mod principal;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{Role, User};

pub use principal::Principal;

/// Bearer-token claims: subject is the user id, roles gate the routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub phone: String,
    pub roles: Vec<Role>,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 tokens with a fixed TTL.
#[derive(Clone)]
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenManager {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: ttl_secs as i64,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            phone: user.phone_number.clone(),
            roles: user.roles.clone(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| AppError::Internal(format!("failed to issue token: {err}")))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| AppError::Unauthorized(format!("invalid token: {err}")))
    }
}

pub fn hash_password(raw: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::Internal(format!("failed to hash password: {err}")))
}

pub fn verify_password(raw: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(raw.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::AccountStatus;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            phone_number: "+79991234567".to_string(),
            password_hash: String::new(),
            status: AccountStatus::Active,
            roles: vec![Role::Customer],
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let tokens = TokenManager::new("test-secret", 3600);
        let user = user();

        let token = tokens.issue(&user).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.phone, user.phone_number);
        assert_eq!(claims.roles, vec![Role::Customer]);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issued_by = TokenManager::new("secret-a", 3600);
        let verified_by = TokenManager::new("secret-b", 3600);

        let token = issued_by.issue(&user()).unwrap();
        assert!(matches!(
            verified_by.verify(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = hash_password("100100100Gt").unwrap();

        assert!(verify_password("100100100Gt", &hash));
        assert!(!verify_password("wrong-password", &hash));
        assert!(!verify_password("100100100Gt", "not-a-hash"));
    }
}
