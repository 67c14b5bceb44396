//! Wallet connect - create a new EcoChain wallet or attach to an existing one.
//!
//! # Flows
//!
//! ```text
//! create(ens?)                          connect(address)
//!   │                                     │
//!   ├── current_user()                    ├── reject empty address
//!   │     └── none → sign_in_anonymously  ├── find_wallet_by_address
//!   ├── generate_address()                │     └── none → NotFound
//!   ├── qr_data_url(ens ?? address)       ├── sign_in_anonymously
//!   └── insert_wallet                     └── wallet
//! ```
//!
//! One round-trip per step, no retries. The caller turns the result into a
//! single [`Notice`].

mod keys;

pub use keys::{generate_address, qr_data_url};

use std::sync::Arc;

use tracing::{info, warn};

use crate::core::format::short_address;
use crate::core::model::{NewWallet, Wallet};
use crate::error::{EcoError, EcoResult};
use crate::supabase::{AuthProvider, WalletStore};

pub struct WalletFlows {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn WalletStore>,
}

impl WalletFlows {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn WalletStore>) -> Self {
        Self { auth, store }
    }

    /// Create a wallet for the current user, signing in anonymously first
    /// when there is no session. A blank ENS name counts as none.
    pub async fn create(&self, ens_name: Option<&str>) -> EcoResult<Wallet> {
        let user = match self.auth.current_user().await? {
            Some(user) => user,
            None => self.auth.sign_in_anonymously().await?,
        };

        let ens_name = ens_name.map(str::trim).filter(|n| !n.is_empty());
        let address = generate_address();
        let qr_code = qr_data_url(ens_name.unwrap_or(&address))?;

        let wallet = self
            .store
            .insert_wallet(&NewWallet {
                user_id: user.id,
                wallet_address: address,
                ens_name: ens_name.map(str::to_string),
                qr_code,
            })
            .await?;
        info!(wallet = %wallet.id, address = %short_address(&wallet.wallet_address), "wallet created");
        Ok(wallet)
    }

    /// Attach to the wallet registered under `address`.
    pub async fn connect(&self, address: &str) -> EcoResult<Wallet> {
        let address = address.trim();
        if address.is_empty() {
            return Err(EcoError::InvalidAddress("enter a wallet address".into()));
        }

        let wallet = self
            .store
            .find_wallet_by_address(address)
            .await?
            .ok_or_else(|| EcoError::NotFound(address.to_string()))?;

        let user = self.auth.sign_in_anonymously().await?;
        if user.id != wallet.user_id {
            warn!(
                wallet = %wallet.id,
                session_user = %user.id,
                "connected by address only; session does not own this wallet"
            );
        }
        info!(wallet = %wallet.id, "wallet connected");
        Ok(wallet)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Success,
    Destructive,
}

/// One user-facing notification per flow outcome.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    fn success(title: &str, description: &str) -> Self {
        Self { title: title.into(), description: description.into(), variant: NoticeVariant::Success }
    }

    fn destructive(title: &str, description: &str) -> Self {
        Self { title: title.into(), description: description.into(), variant: NoticeVariant::Destructive }
    }

    pub fn for_create(result: &EcoResult<Wallet>) -> Self {
        match result {
            Ok(_) => Self::success("Wallet created", "Your EcoChain wallet is ready to receive $EC0."),
            Err(_) => Self::destructive("Error", "Could not create the wallet. Please try again."),
        }
    }

    pub fn for_connect(result: &EcoResult<Wallet>) -> Self {
        match result {
            Ok(_) => Self::success("Wallet connected", "Your wallet has been connected."),
            Err(EcoError::InvalidAddress(_)) => Self::destructive("Error", "Please enter a wallet address."),
            Err(EcoError::NotFound(_)) => {
                Self::destructive("Wallet not found", "No wallet is registered with this address.")
            }
            Err(_) => Self::destructive("Error", "Could not connect the wallet. Please try again."),
        }
    }
}
