use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::jwt::{JwtConfig, TokenError};

/// The authenticated identity for one request. Never persisted.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub metadata: UserMetadata,
}

/// Organizational metadata carried on the identity, not in the directory.
/// The `role` here is the source of truth for authorization; the directory's
/// own `role` column is informational only.
#[derive(Debug, Clone)]
pub struct UserMetadata {
    pub staff_id: Option<i64>,
    pub role: i64,
}

impl Principal {
    pub fn staff_id(&self) -> Option<i64> {
        self.metadata.staff_id
    }
}

/// External identity provider boundary. Resolution is a read-only
/// verification call with no side effects.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, credential: &str) -> Result<Principal, TokenError>;
}

/// Default provider: the credential is one of our own signed tokens.
#[derive(Debug, Clone)]
pub struct JwtIdentityProvider {
    jwt: Arc<JwtConfig>,
}

impl JwtIdentityProvider {
    pub fn new(jwt: Arc<JwtConfig>) -> Self {
        Self { jwt }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn resolve(&self, credential: &str) -> Result<Principal, TokenError> {
        let claims = self.jwt.decode(credential)?;

        Ok(Principal {
            id: claims.sub,
            metadata: UserMetadata {
                staff_id: claims.staff_id,
                role: claims.role,
            },
        })
    }
}
