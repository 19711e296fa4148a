//! JWT token handling

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use topsteel_core::domain::{Principal, TenantContext};

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid claim {claim}: {value}")]
    InvalidClaim { claim: &'static str, value: String },
}

/// Claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub societe_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

fn parse_uuid(claim: &'static str, value: &str) -> Result<Uuid, JwtError> {
    Uuid::parse_str(value).map_err(|_| JwtError::InvalidClaim {
        claim,
        value: value.to_string(),
    })
}

impl Claims {
    /// Principal carried by the token. A token without `societe_id` has no
    /// tenant context.
    pub fn into_principal(self) -> Result<Principal, JwtError> {
        let user_id = parse_uuid("sub", &self.sub)?;

        let tenant = match self.societe_id.as_deref().filter(|s| !s.is_empty()) {
            Some(societe_id) => {
                let site_id = match self.site_id.as_deref().filter(|s| !s.is_empty()) {
                    Some(site_id) => Some(parse_uuid("site_id", site_id)?),
                    None => None,
                };
                Some(TenantContext::new(parse_uuid("societe_id", societe_id)?, site_id))
            }
            None => None,
        };

        Ok(Principal {
            user_id,
            roles: self.roles,
            permissions: self.permissions,
            tenant,
        })
    }
}

pub struct JwtService {
    secret: String,
}

impl JwtService {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Issue a token for `principal`, used by tests and bootstrap tooling
    pub fn generate_token(&self, principal: &Principal, expiry_secs: i64) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal.user_id.to_string(),
            roles: principal.roles.clone(),
            permissions: principal.permissions.clone(),
            societe_id: principal.tenant.map(|t| t.societe_id.to_string()),
            site_id: principal
                .tenant
                .and_then(|t| t.site_id)
                .map(|id| id.to_string()),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => {
                debug!("Rejected bearer token: {}", e);
                JwtError::ValidationError(e.to_string())
            }
        })
    }

    pub fn principal(&self, token: &str) -> Result<Principal, JwtError> {
        self.validate_token(token)?.into_principal()
    }
}
