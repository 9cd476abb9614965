use std::time::Duration;

use argon2::Config as ArgonConfig;
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::Rng;

use crate::models::Claims;

/// Salted Argon2 hashing. Hashes are stored in encoded form, so the salt and
/// parameters travel with them.
#[derive(Clone)]
pub struct PasswordHasher {
    config: ArgonConfig<'static>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            config: ArgonConfig::default(),
        }
    }
}

impl PasswordHasher {
    #[cfg(test)]
    pub fn fast() -> Self {
        Self {
            config: ArgonConfig {
                mem_cost: 64,
                time_cost: 1,
                lanes: 1,
                ..ArgonConfig::default()
            },
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, argon2::Error> {
        let salt: [u8; 16] = rand::thread_rng().gen();
        argon2::hash_encoded(password.as_bytes(), &salt, &self.config)
    }

    /// A malformed stored hash counts as a mismatch.
    pub fn verify(encoded: &str, password: &str) -> bool {
        argon2::verify_encoded(encoded, password.as_bytes()).unwrap_or(false)
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Signs an HS256 token for `email` expiring after the configured lifetime.
    pub fn issue(&self, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = chrono::Utc::now().timestamp().max(0) as usize;
        let ttl = usize::try_from(self.ttl.as_secs()).unwrap_or(usize::MAX);
        let claims = Claims {
            email: email.to_string(),
            iat,
            exp: iat.saturating_add(ttl),
        };
        encode(&Header::default(), &claims, &self.key)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    use super::*;

    #[test]
    fn hash_is_salted_and_verifies() {
        let hasher = PasswordHasher::fast();
        let first = hasher.hash("hunter2").unwrap();
        let second = hasher.hash("hunter2").unwrap();

        assert_ne!(first, "hunter2");
        assert_ne!(first, second);
        assert!(PasswordHasher::verify(&first, "hunter2"));
        assert!(!PasswordHasher::verify(&first, "hunter3"));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!PasswordHasher::verify("not-a-hash", "anything"));
    }

    #[test]
    fn token_carries_email_and_expiry() {
        let issuer = TokenIssuer::new("secret", Duration::from_secs(90));
        let token = issuer.issue("a@x.com").unwrap();

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.email, "a@x.com");
        assert_eq!(data.claims.exp - data.claims.iat, 90);
    }

    #[test]
    fn huge_lifetime_saturates_instead_of_wrapping() {
        let issuer = TokenIssuer::new("secret", Duration::from_secs(u64::MAX));
        let token = issuer.issue("a@x.com").unwrap();

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn token_rejected_under_other_secret() {
        let token = TokenIssuer::new("secret", Duration::from_secs(60))
            .issue("a@x.com")
            .unwrap();
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(result.is_err());
    }
}
