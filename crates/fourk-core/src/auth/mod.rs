//! Session tokens, their persistence, and the signed-in user's profile.

mod permissions;

pub use permissions::{
    has_all_permissions, has_any_permission, has_permission, AccessLevel, Permission,
};

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::models::WireScalar;

/// Bearer token pair issued by `POST /auth/login` and `POST /auth/refresh`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl AuthTokens {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for AuthTokens {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
    #[error("Failed to parse stored session: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Where a [`Session`] keeps its tokens between runs.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_tokens(&self) -> AuthResult<Option<AuthTokens>>;
    fn save_tokens(&self, tokens: &AuthTokens) -> AuthResult<()>;
    fn clear_tokens(&self) -> AuthResult<()>;
}

/// Process-local token store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    tokens: Arc<Mutex<Option<AuthTokens>>>,
}

impl SessionPersistence for MemorySessionStore {
    fn load_tokens(&self) -> AuthResult<Option<AuthTokens>> {
        Ok(self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save_tokens(&self, tokens: &AuthTokens) -> AuthResult<()> {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = Some(tokens.clone());
        Ok(())
    }

    fn clear_tokens(&self) -> AuthResult<()> {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Explicit session state handed to every authenticated request.
///
/// Clones share the same tokens. The token lock is never held across an
/// await; `refresh_lock` is, so only one token refresh runs at a time.
#[derive(Clone)]
pub struct Session<S: SessionPersistence> {
    store: S,
    tokens: Arc<RwLock<Option<AuthTokens>>>,
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
}

impl<S: SessionPersistence> Session<S> {
    /// An empty session backed by `store`. Stored tokens are not loaded.
    pub fn new(store: S) -> Self {
        Self {
            store,
            tokens: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// A session initialised from whatever `store` currently holds.
    pub fn restore(store: S) -> AuthResult<Self> {
        let tokens = store.load_tokens()?;
        Ok(Self {
            store,
            tokens: Arc::new(RwLock::new(tokens)),
            refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    #[must_use]
    pub fn tokens(&self) -> Option<AuthTokens> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.tokens().map(|tokens| tokens.access_token)
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.tokens().map(|tokens| tokens.refresh_token)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replace the tokens in memory and in the backing store.
    pub fn set_tokens(&self, tokens: AuthTokens) -> AuthResult<()> {
        self.store.save_tokens(&tokens)?;
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = Some(tokens);
        Ok(())
    }

    /// Forget the tokens in memory and in the backing store.
    pub fn clear(&self) -> AuthResult<()> {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.store.clear_tokens()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Serialises token refreshes across every clone of this session.
    pub(crate) async fn lock_refresh(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.refresh_lock.lock().await
    }
}

impl<S: SessionPersistence> fmt::Debug for Session<S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

/// Role value used for both the client-scoped `role` and `global_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Unknown => "unknown",
        })
    }
}

/// Body of `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub dealer_name: Option<String>,
    pub role: Role,
    pub global_role: Role,
}

impl UserProfile {
    #[must_use]
    pub fn access_level(&self) -> AccessLevel {
        AccessLevel::for_roles(self.role, self.global_role)
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    WireScalar::deserialize(deserializer).map(WireScalar::into_text)
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<WireScalar>::deserialize(deserializer)?.map(WireScalar::into_text))
}
