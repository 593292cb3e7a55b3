use crate::blockchain::sized_bytes::{u64_to_bytes, Bytes32, SizedBytes};
use dg_wallet_macros::ChiaSerial;
use dg_wallet_serialize::hash_all;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(ChiaSerial, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Coin {
    pub parent_coin_info: Bytes32,
    pub puzzle_hash: Bytes32,
    pub amount: u64,
}
impl Coin {
    #[must_use]
    pub fn name(&self) -> Bytes32 {
        self.coin_id()
    }
    /// `sha256(parent ‖ puzzle_hash ‖ amount)` with the amount as a minimal clvm integer.
    #[must_use]
    pub fn coin_id(&self) -> Bytes32 {
        Bytes32::new(&hash_all([
            self.parent_coin_info.as_slice(),
            self.puzzle_hash.as_slice(),
            &u64_to_bytes(self.amount),
        ]))
    }
}
impl Hash for Coin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(self.name().as_ref());
    }
}
