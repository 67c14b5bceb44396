//! Supabase data layer: PostgREST tables, GoTrue anonymous auth, realtime.
//!
//! # Architecture
//!
//! ```text
//! SupabaseClient
//!     │
//!     ├── WalletStore  (rest.rs)  → /rest/v1/wallets, /rest/v1/eco_transactions
//!     ├── AuthProvider (auth.rs)  → /auth/v1/user, /auth/v1/signup
//!     │                               └── Session persisted in session.json
//!     └── realtime()   (realtime.rs) → /realtime/v1/websocket (Phoenix channels)
//! ```
//!
//! Wallet flows and the dashboard depend on the two traits, not on the
//! client, so tests substitute in-memory implementations.

mod auth;
mod realtime;
mod rest;

pub use auth::{AuthUser, Session, SessionStore};
pub use realtime::{ChangeFilter, RealtimeClient, RealtimeEvent};

use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use crate::core::model::{EcoTransaction, NewWallet, Wallet};
use crate::error::{EcoError, EcoResult};

/// Identity provider for the current user.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// User of the current session, if one exists and is still valid.
    async fn current_user(&self) -> EcoResult<Option<AuthUser>>;
    /// Start a new anonymous session and return its user.
    async fn sign_in_anonymously(&self) -> EcoResult<AuthUser>;
}

/// Wallet and transaction tables.
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn insert_wallet(&self, wallet: &NewWallet) -> EcoResult<Wallet>;
    /// Zero rows is `None`; more than one row is an error.
    async fn find_wallet_by_address(&self, address: &str) -> EcoResult<Option<Wallet>>;
    /// All transactions of a wallet, newest first.
    async fn list_transactions(&self, wallet_id: &str) -> EcoResult<Vec<EcoTransaction>>;
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self { url: url.into(), anon_key: anon_key.into() }
    }
}

pub struct SupabaseClient {
    http: Client,
    config: SupabaseConfig,
    session: RwLock<Option<Session>>,
    store: Option<SessionStore>,
}

impl SupabaseClient {
    /// Client without session persistence.
    pub fn new(http: Client, config: SupabaseConfig) -> Self {
        Self { http, config, session: RwLock::new(None), store: None }
    }

    /// Client that restores and saves its session through `store`.
    pub fn with_session_store(mut self, store: SessionStore) -> Self {
        match store.load() {
            Ok(session) => {
                if let Ok(mut guard) = self.session.write() {
                    *guard = session;
                }
            }
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable session file"),
        }
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &SupabaseConfig { &self.config }

    pub fn session(&self) -> Option<Session> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    /// Realtime client authorized with the current session.
    pub fn realtime(&self) -> RealtimeClient {
        RealtimeClient::new(&self.config.url, &self.config.anon_key)
            .with_access_token(self.session().map(|s| s.access_token))
    }

    fn set_session(&self, session: Option<Session>) -> EcoResult<()> {
        if let Some(store) = &self.store {
            match &session {
                Some(s) => store.save(s)?,
                None => store.clear()?,
            }
        }
        if let Ok(mut guard) = self.session.write() {
            *guard = session;
        }
        Ok(())
    }

    fn bearer(&self) -> String {
        self.session()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer())
    }
}

/// Turn a non-2xx response into `EcoError::Api`, preferring the
/// `message`/`msg`/`error_description` field of a JSON error body.
async fn check(response: Response) -> EcoResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or(body);
    Err(EcoError::api(status.as_u16(), message))
}
