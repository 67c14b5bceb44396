//! Live dashboard: one reload path fed by realtime inserts, accepted
//! deposits, and manual refresh.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::summary::WalletSummary;
use crate::core::model::{DepositReceipt, EcoTransaction, Wallet};
use crate::deposit::DepositListener;
use crate::error::EcoResult;
use crate::supabase::{RealtimeEvent, WalletStore};

/// Last successfully loaded state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub summary: WalletSummary,
    /// Newest first.
    pub transactions: Vec<EcoTransaction>,
    pub loaded: bool,
}

pub struct Dashboard {
    wallet: Wallet,
    store: Arc<dyn WalletStore>,
    snapshot: watch::Sender<Snapshot>,
}

impl Dashboard {
    pub fn new(wallet: Wallet, store: Arc<dyn WalletStore>) -> Self {
        let (snapshot, _) = watch::channel(Snapshot::default());
        Self { wallet, store, snapshot }
    }

    pub fn wallet(&self) -> &Wallet { &self.wallet }

    pub fn snapshot(&self) -> Snapshot { self.snapshot.borrow().clone() }

    /// Receiver notified after every successful reload.
    pub fn watch(&self) -> watch::Receiver<Snapshot> { self.snapshot.subscribe() }

    /// Re-fetch every transaction of the wallet and recompute the summary.
    /// On error the previous snapshot stays in place.
    pub async fn reload(&self) -> EcoResult<WalletSummary> {
        let transactions = match self.store.list_transactions(&self.wallet.id).await {
            Ok(txs) => txs,
            Err(e) => {
                warn!(wallet = %self.wallet.id, error = %e, "error loading wallet data");
                return Err(e);
            }
        };

        let summary = WalletSummary::from_transactions(&transactions);
        debug!(wallet = %self.wallet.id, balance = summary.balance, deposits = summary.total_deposits, "dashboard reloaded");
        self.snapshot.send_replace(Snapshot { summary, transactions, loaded: true });
        Ok(summary)
    }

    /// Reload on every insert delivered by a realtime subscription until
    /// the subscription closes or shutdown fires.
    pub fn follow(
        self: Arc<Self>,
        mut events: mpsc::Receiver<RealtimeEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.recv() => break,
                    event = events.recv() => match event {
                        Some(RealtimeEvent::Insert { .. }) => {
                            let _ = self.reload().await;
                        }
                        Some(RealtimeEvent::Subscribed) => info!(wallet = %self.wallet.id, "listening for new transactions"),
                        Some(RealtimeEvent::Error(reason)) => warn!(%reason, "realtime channel error"),
                        Some(RealtimeEvent::Closed) | None => break,
                    }
                }
            }
            debug!(wallet = %self.wallet.id, "stopped following transactions");
        })
    }
}

#[async_trait]
impl DepositListener for Dashboard {
    async fn on_deposit(&self, receipt: &DepositReceipt) {
        debug!(material = %receipt.material, amount = receipt.amount, "deposit accepted, reloading");
        let _ = self.reload().await;
    }
}
