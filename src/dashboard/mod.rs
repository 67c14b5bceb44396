//! Wallet dashboard: balance, deposit count, CO2 impact, history, rewards.
//!
//! Every refresh re-fetches all transactions of the wallet. There is no
//! pagination and no incremental merge; the summary is a pure function of
//! the loaded rows.

mod history;
mod rewards;
mod summary;
#[cfg(feature = "native")]
mod service;

pub use history::{history_rows, HistoryRow};
pub use rewards::{affordable, Reward, CATALOG};
pub use summary::{WalletSummary, IMPACT_PER_DEPOSIT_KG};
#[cfg(feature = "native")]
pub use service::{Dashboard, Snapshot};
