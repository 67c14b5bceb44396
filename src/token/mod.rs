//! `$EC0` token on Base: ERC-20 transfer requests and explorer links.
//!
//! This module only builds the unsigned call. Signing and broadcasting
//! belong to the user's external wallet.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{EcoError, EcoResult};

pub const ECO_COIN_ADDRESS: &str = "0x256492d87947589e589FE58805AC1D36E5488b07";
pub const ECO_COIN_DECIMALS: u32 = 18;
pub const BASE_CHAIN_ID: u64 = 8453;
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;
pub const BASESCAN_URL: &str = "https://basescan.org";
pub const BASESCAN_SEPOLIA_URL: &str = "https://sepolia.basescan.org";

/// `transfer(address,uint256)`
const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

fn address_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").ok()).as_ref()
}

/// `0x` followed by 40 hex digits. Checksum casing is not verified.
pub fn is_valid_address(address: &str) -> bool {
    address_pattern().map_or(false, |p| p.is_match(address))
}

/// Decimal string to base units, e.g. `"1.5"` with 18 decimals.
pub fn parse_units(amount: &str, decimals: u32) -> EcoResult<u128> {
    let amount = amount.trim();
    let invalid = || EcoError::InvalidAmount(amount.to_string());
    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > decimals as usize {
        return Err(invalid());
    }

    let scale = 10u128.checked_pow(decimals).ok_or_else(invalid)?;
    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let frac_units: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = decimals as usize);
        padded.parse().map_err(|_| invalid())?
    };

    whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(invalid)
}

/// ABI-encoded calldata for an ERC-20 transfer.
pub fn transfer_calldata(recipient: &str, amount: u128) -> EcoResult<String> {
    if !is_valid_address(recipient) {
        return Err(EcoError::InvalidAddress(recipient.to_string()));
    }
    let recipient = hex::decode(&recipient[2..]).map_err(|_| EcoError::InvalidAddress(recipient.to_string()))?;

    let mut data = Vec::with_capacity(4 + 32 + 32);
    data.extend_from_slice(&TRANSFER_SELECTOR);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&recipient);
    data.extend_from_slice(&[0u8; 16]);
    data.extend_from_slice(&amount.to_be_bytes());
    Ok(format!("0x{}", hex::encode(data)))
}

/// Unsigned `eth_sendTransaction` parameters for the user's wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub chain_id: u64,
    pub to: String,
    pub data: String,
    pub value: String,
}

impl TransferRequest {
    /// Transfer `amount` whole tokens (decimal string) to `recipient` on
    /// the given chain.
    pub fn eco_coin(recipient: &str, amount: &str, chain_id: u64) -> EcoResult<Self> {
        let units = parse_units(amount, ECO_COIN_DECIMALS)?;
        Ok(Self {
            chain_id,
            to: ECO_COIN_ADDRESS.to_string(),
            data: transfer_calldata(recipient, units)?,
            value: "0x0".into(),
        })
    }
}

pub fn basescan_tx_url(chain_id: u64, tx_hash: &str) -> String {
    let base = if chain_id == BASE_SEPOLIA_CHAIN_ID { BASESCAN_SEPOLIA_URL } else { BASESCAN_URL };
    format!("{base}/tx/{tx_hash}")
}
