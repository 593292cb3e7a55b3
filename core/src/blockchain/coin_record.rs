use crate::blockchain::coin::Coin;
use dg_wallet_macros::ChiaSerial;
use serde::{Deserialize, Serialize};

#[derive(ChiaSerial, Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct CoinRecord {
    pub coin: Coin,
    pub confirmed_block_index: u32,
    /// Zero while the coin is unspent.
    pub spent_block_index: u32,
    pub timestamp: u64,
    pub coinbase: bool,
    pub spent: bool,
}

impl CoinRecord {
    /// Records the wallet may still spend. A record counts while either flag says it is unspent.
    #[must_use]
    pub fn is_spendable(&self) -> bool {
        self.spent_block_index == 0 || !self.spent
    }
    /// Records counted towards the balance need both flags to agree the coin is unspent.
    #[must_use]
    pub fn is_unspent(&self) -> bool {
        self.spent_block_index == 0 && !self.spent
    }
}
