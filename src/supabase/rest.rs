//! PostgREST access to the `wallets` and `eco_transactions` tables.

use async_trait::async_trait;

use super::{check, SupabaseClient, WalletStore};
use crate::core::model::{EcoTransaction, NewWallet, Wallet};
use crate::core::paths::{join, supabase as paths};
use crate::error::{EcoError, EcoResult};

impl SupabaseClient {
    fn table_url(&self, table: &str) -> String {
        join(&join(&self.config.url, paths::REST), table)
    }
}

#[async_trait]
impl WalletStore for SupabaseClient {
    async fn insert_wallet(&self, wallet: &NewWallet) -> EcoResult<Wallet> {
        let request = self
            .http
            .post(self.table_url(paths::WALLETS))
            .header("Prefer", "return=representation")
            .json(wallet);
        let response = check(self.authorized(request).send().await?).await?;
        let mut rows: Vec<Wallet> = response.json().await?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            0 => Err(EcoError::api(200, "insert returned no row")),
            n => Err(EcoError::MultipleRows(n)),
        }
    }

    async fn find_wallet_by_address(&self, address: &str) -> EcoResult<Option<Wallet>> {
        let request = self
            .http
            .get(self.table_url(paths::WALLETS))
            .query(&[("select", "*".to_string()), ("wallet_address", format!("eq.{address}"))]);
        let response = check(self.authorized(request).send().await?).await?;
        let mut rows: Vec<Wallet> = response.json().await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(Some(rows.remove(0))),
            n => Err(EcoError::MultipleRows(n)),
        }
    }

    async fn list_transactions(&self, wallet_id: &str) -> EcoResult<Vec<EcoTransaction>> {
        let request = self.http.get(self.table_url(paths::ECO_TRANSACTIONS)).query(&[
            ("select", "*".to_string()),
            ("wallet_id", format!("eq.{wallet_id}")),
            ("order", "created_at.desc".to_string()),
        ]);
        let response = check(self.authorized(request).send().await?).await?;
        Ok(response.json().await?)
    }
}
