//! Application context - built once at the entry point, shared by `Arc`.
//!
//! Holds the configuration and every client derived from it. Nothing is
//! initialized at import time; the binary constructs exactly one context
//! and hands clones of the `Arc` to the server, the deposit loop and the
//! dashboard.

mod config;

pub use config::{
    AppConfig, AppMetadata, Network, WalletKitConfig, WalletKitFeatures, DEFAULT_BACKEND_URL, DEFAULT_PORT,
    DEFAULT_PROJECT_ID,
};

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::deposit::{DepositService, HttpClassifier};
use crate::error::{EcoError, EcoResult};
use crate::manifest::Manifest;
use crate::supabase::{SessionStore, SupabaseClient};
use crate::wallet::WalletFlows;

pub const APP_NAME: &str = "ecochain";

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

pub struct AppContext {
    config: AppConfig,
    http: Client,
    classifier: Arc<HttpClassifier>,
    supabase: Option<Arc<SupabaseClient>>,
}

impl AppContext {
    /// Build all clients. Supabase stays unset when it is not configured,
    /// so the manifest server runs without it.
    pub fn new(config: AppConfig) -> EcoResult<Arc<Self>> {
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        let classifier = Arc::new(HttpClassifier::new(http.clone(), config.backend_url.clone()));
        let supabase = config.supabase().ok().map(|sb| {
            Arc::new(SupabaseClient::new(http.clone(), sb).with_session_store(SessionStore::for_app(APP_NAME)))
        });
        Ok(Arc::new(Self { config, http, classifier, supabase }))
    }

    /// Context with an explicit Supabase client, e.g. one without a
    /// session file.
    pub fn with_supabase(config: AppConfig, supabase: SupabaseClient) -> EcoResult<Arc<Self>> {
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        let classifier = Arc::new(HttpClassifier::new(http.clone(), config.backend_url.clone()));
        Ok(Arc::new(Self { config, http, classifier, supabase: Some(Arc::new(supabase)) }))
    }

    pub fn config(&self) -> &AppConfig { &self.config }
    pub fn http(&self) -> &Client { &self.http }
    pub fn classifier(&self) -> Arc<HttpClassifier> { self.classifier.clone() }

    pub fn manifest(&self) -> Manifest { Manifest::for_site(self.config.site_url.as_deref()) }

    pub fn wallet_kit(&self) -> WalletKitConfig { self.config.wallet_kit() }

    /// Supabase client, or a config error naming the missing variables.
    pub fn supabase(&self) -> EcoResult<Arc<SupabaseClient>> {
        self.supabase.clone().ok_or_else(|| {
            EcoError::Config("ECOCHAIN_SUPABASE_URL and ECOCHAIN_SUPABASE_ANON_KEY must be set".into())
        })
    }

    pub fn wallet_flows(&self) -> EcoResult<WalletFlows> {
        let supabase = self.supabase()?;
        Ok(WalletFlows::new(supabase.clone(), supabase))
    }

    /// Deposit loop for `wallet_address` using the configured timings.
    pub fn deposit_service(&self, wallet_address: &str) -> DepositService {
        DepositService::new(self.classifier.clone(), self.config.deposit()).with_wallet(wallet_address)
    }
}
