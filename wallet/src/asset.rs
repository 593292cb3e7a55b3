use crate::coin_selection::CoinSelection;
use crate::error::WalletError;
use crate::options::WalletOptions;
use crate::standard::{change_amount, standard_puzzle, total_amount};
use crate::wallet::{Wallet, WalletKind, WalletPuzzle};
use dg_wallet_clients::api::full_node::FullnodeAPI;
use dg_wallet_core::blockchain::coin::Coin;
use dg_wallet_core::blockchain::coin_record::CoinRecord;
use dg_wallet_core::blockchain::coin_spend::CoinSpend;
use dg_wallet_core::blockchain::condition_opcode::ConditionOpcode;
use dg_wallet_core::blockchain::sized_bytes::Bytes32;
use dg_wallet_core::clvm::program::Program;
use dg_wallet_keys::key_pair::KeyPair;
use dg_wallet_keys::key_store::KeyStore;
use dg_wallet_puzzles::cats::{cat_puzzle, issuance_payment_puzzle, uncurry_cat};
use dg_wallet_puzzles::p2_delegated_puzzle_or_hidden_puzzle::{
    default_hidden_puzzle_hash, solution_for_conditions,
};
use dg_wallet_puzzles::puzzle_store::PuzzleStore;
use dg_wallet_puzzles::utils::{make_create_coin_condition, TAIL_MARKER_AMOUNT};
use log::{debug, info};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::collections::HashSet;
use std::io::{Error, ErrorKind};
use std::sync::Arc;

/// Upper bound on the parents visited while looking for an asset's genesis.
pub const MAX_ANCESTRY_DEPTH: usize = 1024;

/// An asset token coin together with the proof that its parent was one too.
#[derive(Clone, Debug)]
pub struct AssetCoin {
    pub parent_coin_spend: CoinSpend,
    pub coin: Coin,
    pub asset_id: Bytes32,
    pub lineage_proof: Program,
}
impl AssetCoin {
    /// Reads the asset id and lineage proof from the parent's asset token puzzle.
    pub fn from_parent_spend(
        store: &PuzzleStore,
        parent_coin_spend: CoinSpend,
        coin: Coin,
    ) -> Result<Self, WalletError> {
        let parent_puzzle = parent_coin_spend.puzzle_reveal.to_program()?;
        let args = uncurry_cat(store, &parent_puzzle)?.ok_or(WalletError::NotAssetToken)?;
        if args.len() <= 2 {
            return Err(WalletError::InvalidLineage);
        }
        let asset_id = Bytes32::try_from(&args[1]).map_err(|_| WalletError::InvalidLineage)?;
        let lineage_proof = Program::to(vec![
            Program::from(parent_coin_spend.coin.parent_coin_info),
            Program::from(args[2].tree_hash()),
            Program::from(parent_coin_spend.coin.amount),
        ]);
        Ok(AssetCoin {
            parent_coin_spend,
            coin,
            asset_id,
            lineage_proof,
        })
    }
    /// An eve coin, whose parent is not an asset token. Its lineage proof is empty.
    #[must_use]
    pub fn eve(parent_coin_spend: CoinSpend, coin: Coin, asset_id: Bytes32) -> Self {
        AssetCoin {
            parent_coin_spend,
            coin,
            asset_id,
            lineage_proof: Program::null(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SpendableAssetCoin {
    pub asset_coin: AssetCoin,
    pub inner_puzzle: Program,
    pub inner_solution: Program,
    /// Amount issued (positive) or melted (negative) by this spend.
    pub extra_delta: i64,
    pub puzzle: Program,
}
impl SpendableAssetCoin {
    pub fn new(
        store: &PuzzleStore,
        asset_coin: AssetCoin,
        inner_puzzle: Program,
        inner_solution: Program,
        extra_delta: i64,
    ) -> Result<Self, WalletError> {
        let puzzle = cat_puzzle(store, &asset_coin.asset_id, &inner_puzzle)?;
        Ok(SpendableAssetCoin {
            asset_coin,
            inner_puzzle,
            inner_solution,
            extra_delta,
            puzzle,
        })
    }
    #[must_use]
    pub fn coin(&self) -> &Coin {
        &self.asset_coin.coin
    }
    /// Sum of the amounts created by the inner spend, less `extra_delta`. The tail reveal
    /// marker is not an amount.
    pub fn delta(&self) -> Result<i128, WalletError> {
        let output = self.inner_puzzle.run_unbounded(&self.inner_solution)?;
        let marker = BigInt::from(TAIL_MARKER_AMOUNT);
        let mut total = -i128::from(self.extra_delta);
        for condition in output.as_list() {
            let items = condition.as_list();
            if items.len() < 3 || !items[..3].iter().all(Program::is_atom) {
                continue;
            }
            if ConditionOpcode::from(&items[0]) != ConditionOpcode::CreateCoin {
                continue;
            }
            let amount = items[2].as_int()?;
            if amount == marker {
                continue;
            }
            total += amount.to_i128().ok_or_else(|| {
                Error::new(ErrorKind::InvalidData, format!("Amount out of range: {amount}"))
            })?;
        }
        Ok(total)
    }
}

/// Running total before each delta, shifted so the smallest is zero.
#[must_use]
pub fn calculate_subtotals(deltas: &[i128]) -> Vec<i128> {
    let mut subtotal = 0;
    let prefixes: Vec<i128> = deltas
        .iter()
        .map(|delta| {
            let current = subtotal;
            subtotal += delta;
            current
        })
        .collect();
    let offset = prefixes.iter().min().copied().unwrap_or_default();
    prefixes.iter().map(|p| p - offset).collect()
}

/// Builds the ring spend for coins of one asset. Every coin commits to the id of the coin
/// before it and to the coin state and inner puzzle hash of the coin after it.
pub fn spend_asset_coins(coins: &[SpendableAssetCoin]) -> Result<Vec<CoinSpend>, WalletError> {
    let first = coins.first().ok_or(WalletError::EmptyRing)?;
    if coins
        .iter()
        .any(|c| c.asset_coin.asset_id != first.asset_coin.asset_id)
    {
        return Err(WalletError::MixedAssetIds);
    }
    let deltas = coins
        .iter()
        .map(SpendableAssetCoin::delta)
        .collect::<Result<Vec<i128>, WalletError>>()?;
    let subtotals = calculate_subtotals(&deltas);
    let n = coins.len();
    let mut coin_spends = Vec::with_capacity(n);
    for (i, spendable) in coins.iter().enumerate() {
        let previous = &coins[(i + n - 1) % n];
        let next = &coins[(i + 1) % n];
        let coin = spendable.coin();
        let solution = Program::to(vec![
            spendable.inner_solution.clone(),
            spendable.asset_coin.lineage_proof.clone(),
            Program::from(previous.coin().name()),
            Program::to(vec![
                Program::from(coin.parent_coin_info),
                Program::from(coin.puzzle_hash),
                Program::from(coin.amount),
            ]),
            Program::to(vec![
                Program::from(next.coin().parent_coin_info),
                Program::from(next.inner_puzzle.tree_hash()),
                Program::from(next.coin().amount),
            ]),
            Program::to(BigInt::from(subtotals[i])),
            Program::from(spendable.extra_delta),
        ]);
        coin_spends.push(CoinSpend::new(*coin, &spendable.puzzle, &solution));
    }
    Ok(coin_spends)
}

/// Spends the eve coin created by `origin_coin_spend`, minting `amount` of the asset
/// governed by `tail` to `inner_puzzle_hash`.
pub fn issue(
    store: &PuzzleStore,
    origin_coin_spend: &CoinSpend,
    tail: &Program,
    tail_solution: &Program,
    inner_puzzle_hash: Bytes32,
    amount: u64,
) -> Result<CoinSpend, WalletError> {
    let asset_id = tail.tree_hash();
    let payment = issuance_payment_puzzle(tail, tail_solution, inner_puzzle_hash, amount);
    let eve_puzzle = cat_puzzle(store, &asset_id, &payment)?;
    let eve_coin = Coin {
        parent_coin_info: origin_coin_spend.coin.name(),
        puzzle_hash: eve_puzzle.tree_hash(),
        amount,
    };
    let eve = SpendableAssetCoin::new(
        store,
        AssetCoin::eve(origin_coin_spend.clone(), eve_coin, asset_id),
        payment,
        Program::null(),
        0,
    )?;
    spend_asset_coins(&[eve])?
        .pop()
        .ok_or(WalletError::EmptyRing)
}

/// Asset token puzzles wrapping the standard puzzle of each address.
#[derive(Debug)]
pub struct AssetPuzzles {
    store: Arc<PuzzleStore>,
    asset_id: Bytes32,
    hidden_puzzle_hash: Bytes32,
    tail: Option<Program>,
}
impl AssetPuzzles {
    pub fn new(store: Arc<PuzzleStore>, asset_id: Bytes32) -> Result<Self, WalletError> {
        Ok(AssetPuzzles::with_hidden_puzzle_hash(
            store,
            asset_id,
            default_hidden_puzzle_hash()?,
        ))
    }
    #[must_use]
    pub fn with_hidden_puzzle_hash(
        store: Arc<PuzzleStore>,
        asset_id: Bytes32,
        hidden_puzzle_hash: Bytes32,
    ) -> Self {
        AssetPuzzles {
            store,
            asset_id,
            hidden_puzzle_hash,
            tail: None,
        }
    }
    #[must_use]
    pub fn asset_id(&self) -> &Bytes32 {
        &self.asset_id
    }
    #[must_use]
    pub fn store(&self) -> &PuzzleStore {
        &self.store
    }
}
impl WalletKind for AssetPuzzles {
    fn hidden_puzzle_hash(&self) -> &Bytes32 {
        &self.hidden_puzzle_hash
    }
    fn create_puzzle(&self, key_pair: &KeyPair) -> Result<WalletPuzzle, WalletError> {
        let inner_puzzle = standard_puzzle(key_pair, &self.hidden_puzzle_hash)?;
        let puzzle = cat_puzzle(&self.store, &self.asset_id, &inner_puzzle)?;
        Ok(WalletPuzzle::new(puzzle, inner_puzzle))
    }
}

pub type AssetWallet<N> = Wallet<N, AssetPuzzles>;

impl<N: FullnodeAPI> Wallet<N, AssetPuzzles> {
    pub fn asset(
        node: Arc<N>,
        key_store: KeyStore,
        store: Arc<PuzzleStore>,
        asset_id: Bytes32,
        options: WalletOptions,
    ) -> Result<Self, WalletError> {
        Ok(Wallet::new(
            node,
            key_store,
            AssetPuzzles::new(store, asset_id)?,
            options,
        ))
    }

    /// Spend of the coin that created `coin_record`.
    pub async fn parent_coin_spend(&self, coin_record: &CoinRecord) -> Result<CoinSpend, WalletError> {
        let parent_id = coin_record.coin.parent_coin_info;
        let parent = self
            .cancellable(self.node.get_coin_record_by_name(&parent_id))
            .await?
            .ok_or(WalletError::CoinRecordNotFound(parent_id))?;
        self.cancellable(
            self.node
                .get_puzzle_and_solution(&parent_id, parent.spent_block_index),
        )
        .await
    }

    /// Finds the tail program that governs this asset by walking up from a tracked coin to
    /// its eve coin. `None` when the wallet tracks no coins yet.
    pub async fn find_tail(&mut self) -> Result<Option<Program>, WalletError> {
        if let Some(tail) = &self.kind.tail {
            return Ok(Some(tail.clone()));
        }
        let Some(mut current) = self.coin_records().next().cloned() else {
            return Ok(None);
        };
        let mut visited = HashSet::new();
        for _ in 0..MAX_ANCESTRY_DEPTH {
            if !visited.insert(current.coin.name()) {
                break;
            }
            let eve = current;
            let parent_id = eve.coin.parent_coin_info;
            current = self
                .cancellable(self.node.get_coin_record_by_name(&parent_id))
                .await?
                .ok_or(WalletError::CoinRecordNotFound(parent_id))?;
            let parent_spend = self
                .cancellable(self.node.get_coin_spend(&current))
                .await?;
            if uncurry_cat(&self.kind.store, &parent_spend.puzzle_reveal.to_program()?)?.is_some() {
                continue;
            }
            if eve.spent_block_index == 0 {
                return Err(WalletError::GenesisNotFound);
            }
            let eve_spend = self.cancellable(self.node.get_coin_spend(&eve)).await?;
            let tail = find_tail_in_eve_spend(&self.kind.store, &eve_spend)?;
            info!("Found tail {} for asset {}", tail.tree_hash(), self.kind.asset_id);
            self.kind.tail = Some(tail.clone());
            return Ok(Some(tail));
        }
        Err(WalletError::AncestryTooDeep(MAX_ANCESTRY_DEPTH))
    }

    /// Sends `amount` to the inner puzzle hash `puzzle_hash` with a hint memo, returning the
    /// remainder to a fresh change address.
    pub async fn send(
        &mut self,
        puzzle_hash: &Bytes32,
        amount: u64,
    ) -> Result<Vec<CoinSpend>, WalletError> {
        let records = self.select_coin_records(amount, CoinSelection::Oldest, 0, true)?;
        let spend_amount = total_amount(&records);
        let change = self.change_puzzle().await?;
        let mut spendable = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let inner_puzzle = self
                .address_for_puzzle_hash(&record.coin.puzzle_hash)
                .map(|a| a.puzzle.inner_puzzle.clone())
                .ok_or(WalletError::UnknownPuzzleHash(record.coin.puzzle_hash))?;
            let mut conditions = vec![];
            if i == 0 {
                conditions.push(make_create_coin_condition(*puzzle_hash, amount, &[*puzzle_hash]));
                if spend_amount > u128::from(amount) {
                    conditions.push(make_create_coin_condition(
                        change.inner_puzzle.tree_hash(),
                        change_amount(spend_amount, amount)?,
                        &[],
                    ));
                }
            }
            let inner_solution = solution_for_conditions(Program::to(conditions))?;
            let parent_spend = self.parent_coin_spend(record).await?;
            let asset_coin = AssetCoin::from_parent_spend(&self.kind.store, parent_spend, record.coin)?;
            spendable.push(SpendableAssetCoin::new(
                &self.kind.store,
                asset_coin,
                inner_puzzle,
                inner_solution,
                0,
            )?);
        }
        debug!("Built asset ring of {} coins for {amount}", spendable.len());
        spend_asset_coins(&spendable)
    }

    /// Mints `amount` of this wallet's asset from `origin_coin_spend` to a fresh address.
    pub async fn issue(
        &mut self,
        origin_coin_spend: &CoinSpend,
        tail: &Program,
        tail_solution: &Program,
        amount: u64,
    ) -> Result<CoinSpend, WalletError> {
        if tail.tree_hash() != self.kind.asset_id {
            return Err(WalletError::MixedAssetIds);
        }
        let destination = self.change_puzzle().await?;
        issue(
            &self.kind.store,
            origin_coin_spend,
            tail,
            tail_solution,
            destination.inner_puzzle.tree_hash(),
            amount,
        )
    }
}

/// Recovers the tail from the issuance payment curried into an eve coin's puzzle.
fn find_tail_in_eve_spend(store: &PuzzleStore, eve_spend: &CoinSpend) -> Result<Program, WalletError> {
    let args = uncurry_cat(store, &eve_spend.puzzle_reveal.to_program()?)?
        .ok_or(WalletError::EveNotAssetToken)?;
    let payment = args.get(2).ok_or(WalletError::EveNotAssetToken)?;
    let output = payment.run_unbounded(&Program::null())?;
    if output.is_atom() {
        return Err(WalletError::EveOutputAtom);
    }
    let marker = BigInt::from(TAIL_MARKER_AMOUNT);
    for condition in output.as_list() {
        let items = condition.as_list();
        if items.len() < 5 || !items[0].is_atom() || !items[2].is_atom() {
            continue;
        }
        if ConditionOpcode::from(&items[0]) != ConditionOpcode::CreateCoin
            || items[2].as_int()? != marker
        {
            continue;
        }
        return Ok(items[3].clone());
    }
    Err(WalletError::GenesisNotFound)
}
