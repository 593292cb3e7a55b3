use serde::{Deserialize, Serialize};
use std::io::{Error, ErrorKind};

fn default_min_address_count() -> u32 {
    50
}
fn default_max_address_count() -> u32 {
    u32::MAX
}
fn default_unused_address_count() -> u32 {
    10
}
fn default_instant_coin_records() -> bool {
    true
}

/// Address scanning bounds and local bookkeeping switches for a wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletOptions {
    /// Addresses always derived, used or not.
    #[serde(default = "default_min_address_count")]
    pub min_address_count: u32,
    #[serde(default = "default_max_address_count")]
    pub max_address_count: u32,
    /// Gap limit: consecutive never used addresses kept at the tail.
    #[serde(default = "default_unused_address_count")]
    pub unused_address_count: u32,
    /// Reflect created coins locally as soon as a spend is pushed.
    #[serde(default = "default_instant_coin_records")]
    pub instant_coin_records: bool,
}
impl Default for WalletOptions {
    fn default() -> Self {
        WalletOptions {
            min_address_count: default_min_address_count(),
            max_address_count: default_max_address_count(),
            unused_address_count: default_unused_address_count(),
            instant_coin_records: default_instant_coin_records(),
        }
    }
}
impl WalletOptions {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| {
            Error::new(
                ErrorKind::InvalidData,
                format!("Failed to parse wallet options: {e}"),
            )
        })
    }
}
