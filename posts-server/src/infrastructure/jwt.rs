use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[cfg(test)]
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) exp: i64,
}

/// Verifies access tokens issued by the identity service; both sides
/// share the HS256 secret.
pub(crate) struct JwtService {
    secret: String,
}

impl JwtService {
    pub(crate) fn new(secret: &str) -> Self {
        JwtService {
            secret: secret.into(),
        }
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 10;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(JwtError::Decode)?;

        Ok(token_data.claims)
    }

    #[cfg(test)]
    pub(crate) fn issue_token(
        &self,
        user_id: i64,
        username: &str,
        ttl: chrono::Duration,
    ) -> Result<String, JwtError> {
        use jsonwebtoken::{EncodingKey, Header, encode};

        let claims = Claims {
            user_id,
            username: username.into(),
            exp: (chrono::Utc::now() + ttl).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(JwtError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::JwtService;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn issued_token_round_trips_claims() {
        let jwt = JwtService::new(SECRET);
        let token = jwt
            .issue_token(7, "alice", Duration::minutes(5))
            .expect("token must encode");

        let claims = jwt.verify_token(&token).expect("token must verify");
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = JwtService::new(SECRET);
        let token = jwt
            .issue_token(7, "alice", Duration::minutes(-5))
            .expect("token must encode");

        assert!(jwt.verify_token(&token).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtService::new("another-secret-another-secret-xx");
        let token = issuer
            .issue_token(7, "alice", Duration::minutes(5))
            .expect("token must encode");

        assert!(JwtService::new(SECRET).verify_token(&token).is_err());
    }
}
