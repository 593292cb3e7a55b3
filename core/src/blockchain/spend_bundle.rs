use crate::blockchain::coin::Coin;
use crate::blockchain::coin_spend::CoinSpend;
use crate::blockchain::sized_bytes::{Bytes32, Bytes96, SizedBytes};
use crate::clvm::bls_bindings::{aggregate_signatures, INFINITE_SIGNATURE};
use blst::min_pk::Signature;
use dg_wallet_macros::ChiaSerial;
use dg_wallet_serialize::{hash_256, ChiaSerialize};
use serde::{Deserialize, Serialize};
use std::io::Error;

#[derive(ChiaSerial, Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct SpendBundle {
    pub coin_spends: Vec<CoinSpend>,
    pub aggregated_signature: Bytes96,
}
impl SpendBundle {
    #[must_use]
    pub fn name(&self) -> Bytes32 {
        Bytes32::new(&hash_256(self.to_bytes()))
    }

    /// Joins bundles, aggregating their signatures. Infinity signatures contribute nothing.
    pub fn aggregate(bundles: Vec<SpendBundle>) -> Result<Self, Error> {
        let mut coin_spends = vec![];
        let mut signatures: Vec<Signature> = vec![];
        for bundle in bundles {
            coin_spends.extend(bundle.coin_spends);
            if bundle.aggregated_signature.as_slice() != INFINITE_SIGNATURE {
                signatures.push(bundle.aggregated_signature.try_into()?);
            }
        }
        Ok(SpendBundle {
            coin_spends,
            aggregated_signature: aggregate_signatures(&signatures)?,
        })
    }

    #[must_use]
    pub fn empty() -> Self {
        SpendBundle {
            coin_spends: vec![],
            aggregated_signature: Bytes96::new(&INFINITE_SIGNATURE),
        }
    }

    pub fn additions(&self) -> Result<Vec<Coin>, Error> {
        self.coin_spends.iter().try_fold(vec![], |mut prev, cur| {
            prev.extend(cur.additions()?);
            Ok(prev)
        })
    }

    #[must_use]
    pub fn removals(&self) -> Vec<Coin> {
        self.coin_spends.iter().map(|c| c.coin).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clvm::bls_bindings::sign;
    use crate::clvm::program::Program;
    use blst::min_pk::SecretKey;

    fn spend(seed: u8) -> CoinSpend {
        let coin = Coin {
            parent_coin_info: Bytes32::new(&[seed; 32]),
            puzzle_hash: Program::null().tree_hash(),
            amount: u64::from(seed),
        };
        CoinSpend::new(coin, &Program::null(), &Program::null())
    }

    #[test]
    fn test_empty_bundle_has_infinite_signature() {
        let empty = SpendBundle::empty();
        assert!(empty.coin_spends.is_empty());
        assert_eq!(empty.aggregated_signature.as_slice()[0], 0xc0);
        assert!(empty.aggregated_signature.as_slice()[1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_aggregate_merges_spends() {
        let sk = SecretKey::key_gen(&[7u8; 32], &[]).unwrap();
        let signed = SpendBundle {
            coin_spends: vec![spend(1)],
            aggregated_signature: sign(&sk, b"message").into(),
        };
        let unsigned = SpendBundle {
            coin_spends: vec![spend(2)],
            aggregated_signature: SpendBundle::empty().aggregated_signature,
        };
        let merged = SpendBundle::aggregate(vec![signed.clone(), unsigned]).unwrap();
        assert_eq!(merged.coin_spends.len(), 2);
        assert_eq!(merged.aggregated_signature, signed.aggregated_signature);
        assert_eq!(merged.removals()[1], spend(2).coin);
    }

    #[test]
    fn test_name_is_hash_of_serialization() {
        let bundle = SpendBundle {
            coin_spends: vec![spend(1)],
            aggregated_signature: SpendBundle::empty().aggregated_signature,
        };
        assert_eq!(bundle.name(), Bytes32::new(&hash_256(bundle.to_bytes())));
        assert_ne!(bundle.name(), SpendBundle::empty().name());
    }
}
