//! Records exchanged with Supabase and the classifier backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Row of the `wallets` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub user_id: String,
    pub wallet_address: String,
    #[serde(default)]
    pub ens_name: Option<String>,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new wallet row. The database assigns `id`.
#[derive(Debug, Clone, Serialize)]
pub struct NewWallet {
    pub user_id: String,
    pub wallet_address: String,
    pub ens_name: Option<String>,
    pub qr_code: String,
}

/// Row of the `eco_transactions` table. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcoTransaction {
    pub id: String,
    pub wallet_id: String,
    pub material_type: String,
    #[serde(deserialize_with = "numeric")]
    pub eco_amount: f64,
    pub created_at: DateTime<Utc>,
}

/// Latest classifier reading. Carries no identity beyond "most recent".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl Prediction {
    pub fn empty() -> Self { Self::default() }

    pub fn of(material: impl Into<String>, confidence: f64) -> Self {
        Self { material: Some(material.into()), confidence: Some(confidence) }
    }

    /// Detected material exactly as the classifier labelled it. A blank
    /// label counts as no detection.
    pub fn material(&self) -> Option<&str> {
        self.material.as_deref().filter(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositRequest {
    pub material: String,
    pub wallet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub amount: f64,
}

/// A deposit the backend accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositReceipt {
    pub material: String,
    pub wallet: String,
    pub amount: f64,
}

/// Postgres `numeric` arrives either as a JSON number or a decimal string.
fn numeric<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Numeric {
        Number(f64),
        Text(String),
    }

    match Numeric::deserialize(deserializer)? {
        Numeric::Number(n) => Ok(n),
        Numeric::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
