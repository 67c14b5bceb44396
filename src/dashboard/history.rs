//! Transaction history rows for display.

use serde::Serialize;

use crate::core::format::format_eco_amount;
use crate::core::model::EcoTransaction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    pub material: String,
    pub amount: String,
    pub timestamp: String,
}

/// Newest first, whatever order the rows arrived in.
pub fn history_rows(transactions: &[EcoTransaction]) -> Vec<HistoryRow> {
    let mut sorted: Vec<&EcoTransaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
        .into_iter()
        .map(|tx| HistoryRow {
            material: tx.material_type.clone(),
            amount: format!("+{} $EC0", format_eco_amount(tx.eco_amount)),
            timestamp: tx.created_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect()
}
