use crate::coin_selection::CoinSelection;
use crate::error::WalletError;
use crate::options::WalletOptions;
use crate::wallet::{Wallet, WalletKind, WalletPuzzle};
use dg_wallet_clients::api::full_node::FullnodeAPI;
use dg_wallet_core::blockchain::coin_record::CoinRecord;
use dg_wallet_core::blockchain::coin_spend::CoinSpend;
use dg_wallet_core::blockchain::sized_bytes::Bytes32;
use dg_wallet_core::clvm::program::Program;
use dg_wallet_keys::key_pair::KeyPair;
use dg_wallet_keys::key_store::KeyStore;
use dg_wallet_puzzles::p2_delegated_puzzle_or_hidden_puzzle::{
    calculate_synthetic_public_key, default_hidden_puzzle_hash, puzzle_for_synthetic_public_key,
    solution_for_conditions,
};
use dg_wallet_puzzles::utils::make_create_coin_condition;
use log::debug;
use std::io::{Error, ErrorKind};
use std::sync::Arc;

/// Standard pay to delegated or hidden puzzle for the synthetic key of each address.
#[derive(Clone, Debug)]
pub struct StandardPuzzles {
    hidden_puzzle_hash: Bytes32,
}
impl StandardPuzzles {
    pub fn new() -> Result<Self, WalletError> {
        Ok(StandardPuzzles::with_hidden_puzzle_hash(
            default_hidden_puzzle_hash()?,
        ))
    }
    #[must_use]
    pub fn with_hidden_puzzle_hash(hidden_puzzle_hash: Bytes32) -> Self {
        StandardPuzzles { hidden_puzzle_hash }
    }
}

/// Standard puzzle for the synthetic form of `key_pair`.
pub(crate) fn standard_puzzle(
    key_pair: &KeyPair,
    hidden_puzzle_hash: &Bytes32,
) -> Result<Program, WalletError> {
    let synthetic_public_key =
        calculate_synthetic_public_key(&key_pair.public_key_bytes(), hidden_puzzle_hash)?;
    Ok(puzzle_for_synthetic_public_key(&synthetic_public_key)?)
}

impl WalletKind for StandardPuzzles {
    fn hidden_puzzle_hash(&self) -> &Bytes32 {
        &self.hidden_puzzle_hash
    }
    fn create_puzzle(&self, key_pair: &KeyPair) -> Result<WalletPuzzle, WalletError> {
        Ok(WalletPuzzle::unwrapped(standard_puzzle(
            key_pair,
            &self.hidden_puzzle_hash,
        )?))
    }
}

pub type StandardWallet<N> = Wallet<N, StandardPuzzles>;

pub(crate) fn total_amount(records: &[CoinRecord]) -> u128 {
    records.iter().map(|r| u128::from(r.coin.amount)).sum()
}

pub(crate) fn change_amount(spend_amount: u128, total: u64) -> Result<u64, WalletError> {
    u64::try_from(spend_amount.saturating_sub(u128::from(total))).map_err(|_| {
        WalletError::Io(Error::new(
            ErrorKind::InvalidData,
            format!("Change of {spend_amount} - {total} does not fit in a coin"),
        ))
    })
}

impl<N: FullnodeAPI> Wallet<N, StandardPuzzles> {
    pub fn standard(node: Arc<N>, key_store: KeyStore, options: WalletOptions) -> Result<Self, WalletError> {
        Ok(Wallet::new(node, key_store, StandardPuzzles::new()?, options))
    }

    /// Pays `amount` to `puzzle_hash`, leaving `fee` unclaimed and sending any remainder to a
    /// fresh change address. All outputs are created by the first spent coin.
    pub async fn send(
        &mut self,
        puzzle_hash: &Bytes32,
        amount: u64,
        fee: u64,
    ) -> Result<Vec<CoinSpend>, WalletError> {
        let total = amount.checked_add(fee).ok_or(WalletError::InsufficientFunds)?;
        let payment = make_create_coin_condition(*puzzle_hash, amount, &[]);
        self.spend_with_change(total, Some(payment)).await
    }

    /// Spends coins worth at least `amount` and returns everything above it as change.
    pub async fn send_fee(&mut self, amount: u64) -> Result<Vec<CoinSpend>, WalletError> {
        self.spend_with_change(amount, None).await
    }

    async fn spend_with_change(
        &mut self,
        total: u64,
        payment: Option<Program>,
    ) -> Result<Vec<CoinSpend>, WalletError> {
        let records = self.select_coin_records(total, CoinSelection::Oldest, 0, true)?;
        let spend_amount = total_amount(&records);
        let change = self.change_puzzle().await?;
        let mut coin_spends = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let address = self
                .address_for_puzzle_hash(&record.coin.puzzle_hash)
                .ok_or(WalletError::UnknownPuzzleHash(record.coin.puzzle_hash))?;
            let mut conditions = vec![];
            if i == 0 {
                conditions.extend(payment.clone());
                if spend_amount > u128::from(total) {
                    conditions.push(make_create_coin_condition(
                        change.puzzle_hash,
                        change_amount(spend_amount, total)?,
                        &[],
                    ));
                }
            }
            let solution = solution_for_conditions(Program::to(conditions))?;
            coin_spends.push(CoinSpend::new(
                record.coin,
                &address.puzzle.puzzle,
                &solution,
            ));
        }
        debug!(
            "Built {} standard spends for {total} with {} change",
            coin_spends.len(),
            spend_amount.saturating_sub(u128::from(total))
        );
        Ok(coin_spends)
    }
}
