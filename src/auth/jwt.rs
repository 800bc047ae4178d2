//! HS256 JSON Web Tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::{MAX_EXPIRY_HOURS, MIN_SECRET_LEN};
use crate::error::AppError;

pub const ISSUER: &str = "graphrag-mcp-server";
pub const AUDIENCE: &str = "graphrag-consumers";

/// Token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued token as handed back to clients.
#[derive(Debug, Clone, Serialize)]
pub struct AuthToken {
    pub token: String,
    pub username: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
    pub token_type: &'static str,
}

pub struct JwtHandler {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl std::fmt::Debug for JwtHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtHandler")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl JwtHandler {
    /// Secrets shorter than 32 characters are rejected.
    pub fn new(secret: &str, expiry_hours: i64) -> Result<Self, AppError> {
        if secret.chars().count() < MIN_SECRET_LEN {
            return Err(AppError::Auth(format!(
                "JWT secret must be at least {} characters long",
                MIN_SECRET_LEN
            )));
        }
        let expiry = Duration::try_hours(expiry_hours)
            .filter(|_| (1..=MAX_EXPIRY_HOURS).contains(&expiry_hours))
            .ok_or_else(|| {
                AppError::Auth(format!(
                    "token expiry must be between 1 and {} hours",
                    MAX_EXPIRY_HOURS
                ))
            })?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        tracing::info!(expiry_hours, "JWT handler initialized");
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry,
        })
    }

    pub fn expires_in(&self) -> i64 {
        self.expiry.num_seconds()
    }

    /// Issues a user token valid from now.
    pub fn issue(&self, username: &str) -> Result<AuthToken, AppError> {
        self.issue_at(username, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<AuthToken, AppError> {
        let claims = Claims {
            sub: username.to_string(),
            username: username.to_string(),
            token_type: "user".to_string(),
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.expiry).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))?;

        tracing::info!(username = %username, "Issued token");
        Ok(AuthToken {
            token,
            username: username.to_string(),
            expires_in: self.expires_in(),
            token_type: "bearer",
        })
    }

    /// Checks signature, expiry, issuer and audience.
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "token has expired".to_string(),
                    ErrorKind::InvalidAudience => "invalid token audience".to_string(),
                    ErrorKind::InvalidIssuer => "invalid token issuer".to_string(),
                    ErrorKind::InvalidSignature => "invalid token signature".to_string(),
                    _ => format!("invalid token: {}", e),
                };
                tracing::warn!(reason = %reason, "Token validation failed");
                AppError::Auth(reason)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn handler() -> JwtHandler {
        JwtHandler::new(SECRET, 24).unwrap()
    }

    fn sign(claims: &Claims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn claims() -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: "admin".into(),
            username: "admin".into(),
            token_type: "user".into(),
            iss: ISSUER.into(),
            aud: AUDIENCE.into(),
            iat: now,
            exp: now + 3600,
        }
    }

    #[test]
    fn test_round_trip() {
        let jwt = handler();
        let token = jwt.issue("admin").unwrap();
        assert_eq!(token.expires_in, 86400);

        let claims = jwt.validate(&token.token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.token_type, "user");
        assert_eq!(claims.exp - claims.iat, 86400);
    }

    #[test]
    fn test_rejects_short_secret() {
        assert!(matches!(
            JwtHandler::new("too-short", 24),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_expiry() {
        assert!(matches!(
            JwtHandler::new(SECRET, i64::MAX / 1000),
            Err(AppError::Auth(_))
        ));
        assert!(matches!(JwtHandler::new(SECRET, 0), Err(AppError::Auth(_))));
        assert!(JwtHandler::new(SECRET, MAX_EXPIRY_HOURS).is_ok());
    }

    #[test]
    fn test_rejects_expired() {
        let jwt = handler();
        let token = jwt
            .issue_at("admin", Utc::now() - Duration::hours(48))
            .unwrap();

        let err = jwt.validate(&token.token).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn test_rejects_wrong_audience() {
        let token = sign(&Claims {
            aud: "someone-else".into(),
            ..claims()
        });
        let err = handler().validate(&token).unwrap_err();
        assert!(err.to_string().contains("audience"));
    }

    #[test]
    fn test_rejects_wrong_issuer() {
        let token = sign(&Claims {
            iss: "rogue-issuer".into(),
            ..claims()
        });
        let err = handler().validate(&token).unwrap_err();
        assert!(err.to_string().contains("issuer"));
    }

    #[test]
    fn test_rejects_other_secret() {
        let other = JwtHandler::new("ffffffffffffffffffffffffffffffff", 24).unwrap();
        let token = other.issue("admin").unwrap();
        assert!(handler().validate(&token.token).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(handler().validate("not-a-jwt").is_err());
    }
}
