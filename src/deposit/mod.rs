//! Material deposits: camera classifier polling with a debounced charge.
//!
//! # Flow
//!
//! ```text
//! every poll interval ──▶ GET /predict ──▶ DepositDebouncer::observe
//!                                              │ (new material, wallet set)
//!                                              ▼
//!                                     wait deposit delay
//!                                     (cancelled if material changes)
//!                                              │
//!                                              ▼
//!                                   POST /deposit {material, wallet}
//!                                              │ success
//!                                              ▼
//!                              DepositListener::on_deposit(receipt)
//! ```
//!
//! A material is charged at most once until a different material has been
//! deposited. Poll failures read as "nothing detected".

mod debounce;
#[cfg(feature = "native")]
mod classifier;
#[cfg(feature = "native")]
mod service;

pub use debounce::{DepositDebouncer, Transition, DEFAULT_DEPOSIT_DELAY};
#[cfg(feature = "native")]
pub use classifier::{Classifier, HttpClassifier};
#[cfg(feature = "native")]
pub use service::{DepositConfig, DepositListener, DepositService, DEFAULT_POLL_INTERVAL};
