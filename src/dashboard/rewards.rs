//! Rewards marketplace catalog. Read-only: redemption is not handled here.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reward {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: f64,
}

pub const CATALOG: &[Reward] = &[
    Reward { id: "transit-pass", name: "Transit pass", description: "One day of public transport", cost: 10.0 },
    Reward { id: "coffee", name: "Fair-trade coffee", description: "Coffee at a partner cafe", cost: 25.0 },
    Reward { id: "tree", name: "Plant a tree", description: "A native tree planted in your name", cost: 50.0 },
    Reward { id: "eco-kit", name: "Eco kit", description: "Reusable bottle, bag and straw", cost: 100.0 },
];

/// Catalog entries with `cost <= balance`, cheapest first.
pub fn affordable(balance: f64) -> Vec<&'static Reward> {
    let mut rewards: Vec<_> = CATALOG.iter().filter(|r| r.cost <= balance).collect();
    rewards.sort_by(|a, b| a.cost.total_cmp(&b.cost));
    rewards
}
