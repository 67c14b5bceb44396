use serde::Serialize;

use crate::core::model::EcoTransaction;

/// kg of CO2 avoided per recorded deposit.
pub const IMPACT_PER_DEPOSIT_KG: f64 = 0.5;

/// Aggregates shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WalletSummary {
    pub balance: f64,
    pub total_deposits: usize,
    pub impact_kg: f64,
}

impl WalletSummary {
    pub fn from_transactions(transactions: &[EcoTransaction]) -> Self {
        let total_deposits = transactions.len();
        Self {
            balance: transactions.iter().map(|tx| tx.eco_amount).sum(),
            total_deposits,
            impact_kg: total_deposits as f64 * IMPACT_PER_DEPOSIT_KG,
        }
    }
}
