//! Anonymous GoTrue sessions and their on-disk persistence.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{check, AuthProvider, SupabaseClient};
use crate::core::paths::{join, supabase as paths};
use crate::error::{EcoError, EcoResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|at| at <= Utc::now().timestamp()).unwrap_or(false)
    }
}

/// JSON file holding the last session, like the browser SDK's local storage.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn at(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    /// `$ECOCHAIN_ROOT/<app>/session.json`, falling back to the platform
    /// data directory.
    pub fn for_app(app: &str) -> Self {
        let root = std::env::var("ECOCHAIN_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")));
        Self::at(root.join(app).join("session.json"))
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn load(&self) -> EcoResult<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn save(&self, session: &Session) -> EcoResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    pub fn clear(&self) -> EcoResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn current_user(&self) -> EcoResult<Option<AuthUser>> {
        let Some(session) = self.session() else { return Ok(None) };
        if session.is_expired() {
            self.set_session(None)?;
            return Ok(None);
        }

        let response = self
            .http
            .get(join(&join(&self.config.url, paths::AUTH), "user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            self.set_session(None)?;
            return Ok(None);
        }
        Ok(Some(check(response).await?.json().await?))
    }

    async fn sign_in_anonymously(&self) -> EcoResult<AuthUser> {
        let response = self
            .http
            .post(join(&join(&self.config.url, paths::AUTH), "signup"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
            .json(&json!({ "data": {} }))
            .send()
            .await?;
        let session: Session = check(response)
            .await
            .map_err(|e| EcoError::Auth(e.to_string()))?
            .json()
            .await?;
        let user = session.user.clone();
        self.set_session(Some(session))?;
        tracing::debug!(user = %user.id, "anonymous session started");
        Ok(user)
    }
}
