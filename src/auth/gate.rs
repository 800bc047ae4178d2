//! Request gating on bearer tokens.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::jwt::{AuthToken, JwtHandler};
use crate::auth::users::{Role, UserStore};
use crate::config::AuthConfig;
use crate::error::AppError;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub username: String,
    pub role: Option<Role>,
    pub expires_at: DateTime<Utc>,
}

/// Extracts the token from an `Authorization` header value.
///
/// Returns `None` unless the value is exactly `Bearer <token>`.
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if !scheme.eq_ignore_ascii_case("bearer") || parts.next().is_some() {
        return None;
    }
    Some(token)
}

/// Authentication stage in front of every gated tool.
#[derive(Debug)]
pub struct AuthGate {
    enabled: bool,
    jwt: Option<JwtHandler>,
    users: UserStore,
}

impl AuthGate {
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        Self::with_users(config, UserStore::new()?)
    }

    /// When auth is enabled a secret is mandatory. When disabled, a configured
    /// secret still allows issuing tokens.
    pub fn with_users(config: &AuthConfig, users: UserStore) -> Result<Self, AppError> {
        let jwt = match config.secret()? {
            Some(secret) => Some(JwtHandler::new(&secret, config.jwt_expiry_hours)?),
            None if config.enabled => {
                return Err(AppError::Auth(
                    "authentication is enabled but no JWT secret is configured".into(),
                ))
            }
            None => None,
        };

        if !config.enabled {
            tracing::warn!("Authentication is disabled; all tools are open");
        }

        Ok(Self {
            enabled: config.enabled,
            jwt,
            users,
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    fn jwt(&self) -> Result<&JwtHandler, AppError> {
        self.jwt
            .as_ref()
            .ok_or_else(|| AppError::Auth("token support is not configured".into()))
    }

    /// Exchanges credentials for a token.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<AuthToken, AppError> {
        let jwt = self.jwt()?;
        let account = self.users.verify(username, password)?;
        jwt.issue(&account.username)
    }

    /// Validates a raw token into an identity.
    pub fn validate(&self, token: &str) -> Result<Identity, AppError> {
        let claims = self.jwt()?.validate(token)?;
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AppError::Auth("token expiry out of range".into()))?;

        Ok(Identity {
            role: self.users.get(&claims.sub).map(|a| a.role),
            username: claims.sub,
            expires_at,
        })
    }

    /// Gate for mutating tools.
    ///
    /// With auth enabled, a missing or invalid token fails before the handler
    /// runs. With auth disabled this is always `Ok(None)`.
    pub fn require(&self, bearer: Option<&str>) -> Result<Option<Identity>, AppError> {
        if !self.enabled {
            return Ok(None);
        }
        let token =
            bearer.ok_or_else(|| AppError::Auth("authentication required: no token provided".into()))?;
        let identity = self.validate(token)?;
        tracing::info!(user = %identity.username, "Authenticated request");
        Ok(Some(identity))
    }

    /// Gate for read tools. Never fails; a bad token just yields no identity.
    pub fn optional(&self, bearer: Option<&str>) -> Option<Identity> {
        if !self.enabled {
            return None;
        }
        match bearer {
            Some(token) => match self.validate(token) {
                Ok(identity) => {
                    tracing::info!(user = %identity.username, "Authenticated request");
                    Some(identity)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Optional authentication failed; continuing anonymously");
                    None
                }
            },
            None => {
                tracing::debug!("Request without authentication token");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn config(enabled: bool, secret: Option<&str>) -> AuthConfig {
        AuthConfig {
            enabled,
            jwt_secret_key: secret.map(String::from),
            ..AuthConfig::default()
        }
    }

    fn gate(enabled: bool) -> AuthGate {
        AuthGate::with_users(&config(enabled, Some(SECRET)), UserStore::with_cost(4).unwrap())
            .unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer a b"), None);
    }

    #[test]
    fn test_enabled_without_secret_fails() {
        let result = AuthGate::with_users(&config(true, None), UserStore::with_cost(4).unwrap());
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[test]
    fn test_authenticate_then_require() {
        let gate = gate(true);
        let token = gate.authenticate("admin", "admin123").unwrap();
        assert_eq!(token.expires_in, 86400);

        let identity = gate.require(Some(&token.token)).unwrap().unwrap();
        assert_eq!(identity.username, "admin");
        assert_eq!(identity.role, Some(Role::Admin));
    }

    #[test]
    fn test_authenticate_rejects_bad_password() {
        assert!(matches!(
            gate(true).authenticate("admin", "nope"),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn test_require_rejects_missing_and_invalid() {
        let gate = gate(true);
        assert!(matches!(gate.require(None), Err(AppError::Auth(_))));
        assert!(matches!(gate.require(Some("garbage")), Err(AppError::Auth(_))));
    }

    #[test]
    fn test_optional_falls_through() {
        let gate = gate(true);
        assert!(gate.optional(None).is_none());
        assert!(gate.optional(Some("garbage")).is_none());

        let token = gate.authenticate("user", "user123").unwrap();
        assert_eq!(gate.optional(Some(&token.token)).unwrap().username, "user");
    }

    #[test]
    fn test_disabled_gate_is_open() {
        let gate = gate(false);
        assert_eq!(gate.require(None).unwrap(), None);
        assert_eq!(gate.require(Some("garbage")).unwrap(), None);
        assert!(gate.optional(Some("garbage")).is_none());
    }
}
