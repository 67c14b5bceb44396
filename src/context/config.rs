//! Application configuration - environment first, CLI flags on top.

use std::time::Duration;

use serde::Serialize;

use crate::deposit::{DepositConfig, DEFAULT_DEPOSIT_DELAY, DEFAULT_POLL_INTERVAL};
use crate::error::{EcoError, EcoResult};
use crate::supabase::SupabaseConfig;
use crate::token;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_PROJECT_ID: &str = "3b69598adac8ead28c7db2c257101e89";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    Base,
    BaseSepolia,
}

impl Default for Network {
    fn default() -> Self { Self::Base }
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Base => "base",
            Network::BaseSepolia => "base-sepolia",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Base => token::BASE_CHAIN_ID,
            Network::BaseSepolia => token::BASE_SEPOLIA_CHAIN_ID,
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "base" | "mainnet" | "8453" => Some(Network::Base),
            "base-sepolia" | "sepolia" | "84532" => Some(Network::BaseSepolia),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    pub icons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletKitFeatures {
    pub analytics: bool,
}

/// Settings handed to the external wallet kit on the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletKitConfig {
    pub project_id: String,
    pub networks: Vec<Network>,
    pub default_network: Network,
    pub metadata: AppMetadata,
    pub features: WalletKitFeatures,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub site_url: Option<String>,
    pub project_id: String,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub port: u16,
    pub poll_interval: Duration,
    pub deposit_delay: Duration,
    pub network: Network,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            site_url: None,
            project_id: DEFAULT_PROJECT_ID.into(),
            supabase_url: None,
            supabase_anon_key: None,
            port: DEFAULT_PORT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            deposit_delay: DEFAULT_DEPOSIT_DELAY,
            network: Network::default(),
        }
    }
}

impl AppConfig {
    /// Read `ECOCHAIN_*` variables from the process environment.
    pub fn from_env() -> EcoResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EcoResult<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get("ECOCHAIN_BACKEND_URL") {
            config.backend_url = url;
        }
        config.site_url = get("ECOCHAIN_SITE_URL");
        if let Some(id) = get("ECOCHAIN_PROJECT_ID") {
            config.project_id = id;
        }
        config.supabase_url = get("ECOCHAIN_SUPABASE_URL");
        config.supabase_anon_key = get("ECOCHAIN_SUPABASE_ANON_KEY");
        if let Some(port) = get("ECOCHAIN_PORT") {
            config.port = port.parse().map_err(|_| EcoError::Config(format!("ECOCHAIN_PORT: {port}")))?;
        }
        if let Some(ms) = get("ECOCHAIN_POLL_MS") {
            config.poll_interval = parse_millis("ECOCHAIN_POLL_MS", &ms)?;
        }
        if let Some(ms) = get("ECOCHAIN_DEPOSIT_DELAY_MS") {
            config.deposit_delay = parse_millis("ECOCHAIN_DEPOSIT_DELAY_MS", &ms)?;
        }
        if let Some(network) = get("ECOCHAIN_NETWORK") {
            config.network =
                Network::from_str(&network).ok_or_else(|| EcoError::Config(format!("ECOCHAIN_NETWORK: {network}")))?;
        }
        Ok(config)
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self { self.backend_url = url.into(); self }
    pub fn with_site_url(mut self, url: impl Into<String>) -> Self { self.site_url = Some(url.into()); self }
    pub fn with_port(mut self, port: u16) -> Self { self.port = port; self }
    pub fn with_poll_interval(mut self, interval: Duration) -> Self { self.poll_interval = interval; self }
    pub fn with_deposit_delay(mut self, delay: Duration) -> Self { self.deposit_delay = delay; self }
    pub fn with_network(mut self, network: Network) -> Self { self.network = network; self }
    pub fn with_supabase(mut self, url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        self.supabase_url = Some(url.into());
        self.supabase_anon_key = Some(anon_key.into());
        self
    }

    /// Supabase endpoint, required by wallet and dashboard commands.
    pub fn supabase(&self) -> EcoResult<SupabaseConfig> {
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(url), Some(key)) => Ok(SupabaseConfig::new(url.clone(), key.clone())),
            _ => Err(EcoError::Config(
                "ECOCHAIN_SUPABASE_URL and ECOCHAIN_SUPABASE_ANON_KEY must be set".into(),
            )),
        }
    }

    pub fn deposit(&self) -> DepositConfig {
        DepositConfig::default()
            .with_poll_interval(self.poll_interval)
            .with_deposit_delay(self.deposit_delay)
    }

    pub fn wallet_kit(&self) -> WalletKitConfig {
        WalletKitConfig {
            project_id: self.project_id.clone(),
            networks: vec![self.network],
            default_network: self.network,
            metadata: AppMetadata {
                name: "EcoChain".into(),
                description: "EcoChain ReFi".into(),
                url: self.site_url.clone().unwrap_or_else(|| "http://localhost:3000".into()),
                icons: vec![format!(
                    "{}/icon.png",
                    self.site_url.as_deref().unwrap_or("http://localhost:3000").trim_end_matches('/')
                )],
            },
            features: WalletKitFeatures { analytics: true },
        }
    }
}

fn parse_millis(key: &str, value: &str) -> EcoResult<Duration> {
    match value.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(EcoError::Config(format!("{key}: expected positive milliseconds, got {value}"))),
    }
}
