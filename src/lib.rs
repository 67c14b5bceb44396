//! EcoChain: recycle at the camera, earn `$EC0`.
//!
//! # Architecture
//!
//! ```text
//! AppContext (built once, shared by Arc)
//!   │
//!   ├── AppConfig (ECOCHAIN_* env + CLI flags)
//!   │
//!   ├── HttpClassifier ── /predict, /deposit ──▶ DepositService
//!   │                                              (poll + debounce)
//!   │                                                   │ on_deposit
//!   │                                                   ▼
//!   ├── SupabaseClient ── wallets, eco_transactions ─▶ Dashboard::reload
//!   │       │                                           ▲
//!   │       └── realtime (Phoenix) ── INSERT ───────────┘
//!   │
//!   ├── WalletFlows (create / connect)
//!   │
//!   └── server: /.well-known/farcaster.json, /health, /api/walletkit
//! ```
//!
//! # Features
//!
//! - `native` (default) - tokio, HTTP clients, server, CLI. Without it only
//!   the pure modules build: manifest, debounce, summary, formatting, token.

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod core;
pub mod dashboard;
pub mod deposit;
pub mod error;
pub mod manifest;
pub mod token;

// =============================================================================
// Native-only modules (network, filesystem, tokio)
// =============================================================================
#[cfg(feature = "native")]
pub mod context;
#[cfg(feature = "native")]
pub mod logging;
#[cfg(feature = "native")]
pub mod runtime;
#[cfg(feature = "native")]
pub mod server;
#[cfg(feature = "native")]
pub mod supabase;
#[cfg(feature = "native")]
pub mod wallet;

// =============================================================================
// Re-exports: Shared
// =============================================================================
pub use core::model::{DepositReceipt, EcoTransaction, Prediction, Wallet};
pub use dashboard::WalletSummary;
pub use deposit::{DepositDebouncer, Transition};
pub use error::{EcoError, EcoResult};
pub use manifest::Manifest;

// =============================================================================
// Re-exports: Native
// =============================================================================
#[cfg(feature = "native")]
pub use context::{AppConfig, AppContext};
#[cfg(feature = "native")]
pub use dashboard::Dashboard;
#[cfg(feature = "native")]
pub use deposit::{Classifier, DepositConfig, DepositListener, DepositService, HttpClassifier};
#[cfg(feature = "native")]
pub use runtime::{install_signal_handlers, Shutdown};
#[cfg(feature = "native")]
pub use server::{create_router, AppState};
#[cfg(feature = "native")]
pub use supabase::{AuthProvider, SupabaseClient, WalletStore};
#[cfg(feature = "native")]
pub use wallet::{Notice, WalletFlows};
