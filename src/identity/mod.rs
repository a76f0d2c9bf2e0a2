// ============================================================================
// Identity - resolves bearer credentials into callers
// ============================================================================
//
// Token issuance lives outside this service. Here we only map a presented
// credential to the user id and role it was issued for.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

/// Authenticated identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("missing bearer credential")]
    MissingCredential,

    #[error("invalid or expired credential")]
    InvalidCredential,

    #[error("failed to read token file {path}: {source}")]
    TokenFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse token file {path}: {source}")]
    TokenFileFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Identity collaborator seam.
pub trait IdentityResolver: Send + Sync + 'static {
    fn resolve(&self, credential: &str) -> Result<Caller, IdentityError>;

    /// Resolve an optional credential; absence is `MissingCredential`.
    fn authenticate(&self, credential: Option<&str>) -> Result<Caller, IdentityError> {
        match credential.map(str::trim) {
            Some(token) if !token.is_empty() => self.resolve(token),
            _ => Err(IdentityError::MissingCredential),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenEntry {
    token: String,
    user_id: Uuid,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct TokenFile {
    tokens: Vec<TokenEntry>,
}

/// Resolver backed by a fixed token table, loaded once at startup.
#[derive(Debug, Default, Clone)]
pub struct StaticTokenResolver {
    tokens: HashMap<String, Caller>,
}

impl StaticTokenResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, caller: Caller) -> Self {
        self.tokens.insert(token.into(), caller);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Parse `{"tokens": [{"token": "...", "user_id": "...", "role": "buyer"}]}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: TokenFile = serde_json::from_str(json)?;
        let tokens = file
            .tokens
            .into_iter()
            .map(|entry| (entry.token, Caller::new(entry.user_id, entry.role)))
            .collect();
        Ok(Self { tokens })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, IdentityError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let json = std::fs::read_to_string(path).map_err(|source| IdentityError::TokenFileIo {
            path: display.clone(),
            source,
        })?;
        let resolver = Self::from_json(&json).map_err(|source| IdentityError::TokenFileFormat {
            path: display,
            source,
        })?;

        tracing::info!(path = %path.display(), tokens = resolver.len(), "Loaded identity tokens");
        Ok(resolver)
    }
}

impl IdentityResolver for StaticTokenResolver {
    fn resolve(&self, credential: &str) -> Result<Caller, IdentityError> {
        self.tokens
            .get(credential)
            .copied()
            .ok_or(IdentityError::InvalidCredential)
    }
}
