use crate::coin_selection::{select_coin_records, CoinSelection};
use crate::error::WalletError;
use crate::options::WalletOptions;
use crate::sign::{sign_spend_bundle, wallet_signing_keys};
use dg_wallet_clients::api::full_node::FullnodeAPI;
use dg_wallet_core::blockchain::coin_record::CoinRecord;
use dg_wallet_core::blockchain::sized_bytes::Bytes32;
use dg_wallet_core::blockchain::spend_bundle::SpendBundle;
use dg_wallet_core::blockchain::tx_status::TXStatus;
use dg_wallet_core::clvm::program::Program;
use dg_wallet_keys::key_pair::KeyPair;
use dg_wallet_keys::key_store::KeyStore;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::io::{Error, ErrorKind};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::select;
use tokio_util::sync::CancellationToken;

/// Puzzle locking the coins of one wallet address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletPuzzle {
    pub puzzle: Program,
    /// Puzzle that authorizes spends. Equal to `puzzle` unless it is wrapped.
    pub inner_puzzle: Program,
    pub puzzle_hash: Bytes32,
}
impl WalletPuzzle {
    #[must_use]
    pub fn new(puzzle: Program, inner_puzzle: Program) -> Self {
        WalletPuzzle {
            puzzle_hash: puzzle.tree_hash(),
            puzzle,
            inner_puzzle,
        }
    }
    #[must_use]
    pub fn unwrapped(puzzle: Program) -> Self {
        WalletPuzzle::new(puzzle.clone(), puzzle)
    }
}

/// One derived key, its puzzle and the coins last seen under that puzzle.
#[derive(Clone, Debug)]
pub struct AddressRecord {
    pub index: u32,
    pub key_pair: KeyPair,
    pub puzzle: WalletPuzzle,
    pub coin_records: Vec<CoinRecord>,
}
impl AddressRecord {
    #[must_use]
    pub fn is_unused(&self) -> bool {
        self.coin_records.is_empty()
    }
}

/// What distinguishes one kind of wallet from another.
pub trait WalletKind: Send + Sync {
    fn hidden_puzzle_hash(&self) -> &Bytes32;
    fn create_puzzle(&self, key_pair: &KeyPair) -> Result<WalletPuzzle, WalletError>;
    /// Adds every signature the key store can produce, leaving the rest to other signers.
    fn sign_spend(
        &self,
        key_store: &KeyStore,
        spend_bundle: &SpendBundle,
        agg_sig_me_extra_data: &[u8],
    ) -> Result<SpendBundle, WalletError> {
        let keys = wallet_signing_keys(key_store, self.hidden_puzzle_hash())?;
        sign_spend_bundle(spend_bundle, agg_sig_me_extra_data, true, &keys)
    }
}

/// Tracks the coins of a gap limited sequence of addresses derived from one key store.
///
/// A wallet assumes a single writer. Every network call races the wallet's cancellation token,
/// and the address list is only replaced once a refresh has fully succeeded.
pub struct Wallet<N: FullnodeAPI, K: WalletKind> {
    pub(crate) node: Arc<N>,
    pub(crate) key_store: KeyStore,
    pub(crate) kind: K,
    pub(crate) options: WalletOptions,
    pub(crate) addresses: Vec<AddressRecord>,
    pub(crate) artificial_coin_records: Vec<CoinRecord>,
    pub(crate) cancellation_token: CancellationToken,
}

impl<N: FullnodeAPI, K: WalletKind> Wallet<N, K> {
    pub fn new(node: Arc<N>, key_store: KeyStore, kind: K, options: WalletOptions) -> Self {
        Wallet {
            node,
            key_store,
            kind,
            options,
            addresses: vec![],
            artificial_coin_records: vec![],
            cancellation_token: CancellationToken::new(),
        }
    }
    #[must_use]
    pub fn node(&self) -> &Arc<N> {
        &self.node
    }
    #[must_use]
    pub fn key_store(&self) -> &KeyStore {
        &self.key_store
    }
    #[must_use]
    pub fn kind(&self) -> &K {
        &self.kind
    }
    #[must_use]
    pub fn options(&self) -> &WalletOptions {
        &self.options
    }
    #[must_use]
    pub fn addresses(&self) -> &[AddressRecord] {
        &self.addresses
    }
    #[must_use]
    pub fn address(&self, index: u32) -> Option<&AddressRecord> {
        self.addresses.get(index as usize)
    }
    #[must_use]
    pub fn address_for_puzzle_hash(&self, puzzle_hash: &Bytes32) -> Option<&AddressRecord> {
        self.addresses
            .iter()
            .find(|a| a.puzzle.puzzle_hash == *puzzle_hash)
    }
    #[must_use]
    pub fn artificial_coin_records(&self) -> &[CoinRecord] {
        &self.artificial_coin_records
    }
    pub fn coin_records(&self) -> impl Iterator<Item = &CoinRecord> {
        self.addresses.iter().flat_map(|a| a.coin_records.iter())
    }
    /// Token that aborts the wallet's pending network calls when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }
    pub fn set_cancellation_token(&mut self, token: CancellationToken) {
        self.cancellation_token = token;
    }

    pub(crate) async fn cancellable<T, F>(&self, future: F) -> Result<T, WalletError>
    where
        F: Future<Output = Result<T, std::io::Error>>,
    {
        select! {
            () = self.cancellation_token.cancelled() => Err(WalletError::Cancelled),
            result = future => Ok(result?),
        }
    }

    fn derive_next_key(&mut self) -> Result<KeyPair, WalletError> {
        if self.key_store.hardened() && self.key_store.secret_key().is_none() {
            return Err(WalletError::HardenedWithoutPrivateKey);
        }
        self.key_store.generate(1)?;
        self.key_store.keys().last().cloned().ok_or_else(|| {
            WalletError::Io(Error::new(ErrorKind::Other, "Key store did not grow"))
        })
    }

    /// Derives addresses until the gap limit holds, then refreshes every address.
    ///
    /// `options` overrides the wallet's own bounds for this call.
    pub async fn sync(&mut self, options: Option<WalletOptions>) -> Result<(), WalletError> {
        let options = options.unwrap_or_else(|| self.options.clone());
        let max_address_count = options.max_address_count as usize;
        let min_address_count = options.min_address_count as usize;
        let unused_address_count = options.unused_address_count as usize;
        let mut key_count = self.key_store.len();
        let mut unused_count = self
            .addresses
            .iter()
            .rev()
            .take_while(|a| a.is_unused())
            .count();
        let mut created: HashMap<usize, WalletPuzzle> = HashMap::new();
        while key_count < max_address_count
            && (unused_count < unused_address_count || key_count < min_address_count)
        {
            let key_pair = self.derive_next_key()?;
            let puzzle = self.kind.create_puzzle(&key_pair)?;
            let coin_records = self
                .cancellable(self.node.get_coin_records_by_puzzle_hash(
                    &puzzle.puzzle_hash,
                    Some(true),
                    None,
                    None,
                ))
                .await?;
            if coin_records.is_empty() {
                unused_count += 1;
            } else {
                unused_count = 0;
            }
            created.insert(self.key_store.len() - 1, puzzle);
            key_count += 1;
        }
        debug!(
            "Derived {} keys, {unused_count} unused at the tail",
            self.key_store.len()
        );
        let mut addresses = self.addresses.clone();
        for (index, key_pair) in self.key_store.keys().iter().enumerate().skip(addresses.len()) {
            let puzzle = match created.remove(&index) {
                Some(puzzle) => puzzle,
                None => self.kind.create_puzzle(key_pair)?,
            };
            addresses.push(AddressRecord {
                index: u32::try_from(index).map_err(|_| WalletError::UnusedIndices)?,
                key_pair: key_pair.clone(),
                puzzle,
                coin_records: vec![],
            });
        }
        self.refresh(addresses).await
    }

    /// Reloads the coins of every known address in one batched query.
    pub async fn fetch_coin_records(&mut self) -> Result<(), WalletError> {
        let addresses = self.addresses.clone();
        self.refresh(addresses).await
    }

    async fn refresh(&mut self, mut addresses: Vec<AddressRecord>) -> Result<(), WalletError> {
        let puzzle_hashes: Vec<Bytes32> = addresses.iter().map(|a| a.puzzle.puzzle_hash).collect();
        let confirmed = self
            .cancellable(self.node.get_coin_records_by_puzzle_hashes(
                &puzzle_hashes,
                Some(true),
                None,
                None,
            ))
            .await?;
        let confirmed_ids: HashSet<Bytes32> = confirmed.iter().map(|r| r.coin.name()).collect();
        let pending = self.artificial_coin_records.len();
        self.artificial_coin_records
            .retain(|r| !confirmed_ids.contains(&r.coin.name()));
        if pending != self.artificial_coin_records.len() {
            debug!(
                "{} unconfirmed coin records were confirmed",
                pending - self.artificial_coin_records.len()
            );
        }
        let mut by_puzzle_hash: HashMap<Bytes32, Vec<CoinRecord>> = HashMap::new();
        for record in confirmed
            .into_iter()
            .chain(self.artificial_coin_records.iter().cloned())
        {
            by_puzzle_hash
                .entry(record.coin.puzzle_hash)
                .or_default()
                .push(record);
        }
        for address in &mut addresses {
            address.coin_records = by_puzzle_hash
                .get(&address.puzzle.puzzle_hash)
                .cloned()
                .unwrap_or_default();
        }
        self.addresses = addresses;
        Ok(())
    }

    /// Drops every locally synthesized record and reloads from the node.
    pub async fn clear_unconfirmed_transactions(&mut self) -> Result<(), WalletError> {
        self.artificial_coin_records.clear();
        self.fetch_coin_records().await
    }

    #[must_use]
    pub fn create_spend(&self) -> SpendBundle {
        SpendBundle::empty()
    }

    /// Reserves `amount` never used address indices, skipping and extending `used`.
    ///
    /// On a shortfall the wallet syncs once with a larger gap limit before giving up.
    pub async fn find_unused_indices(
        &mut self,
        amount: usize,
        used: &mut Vec<u32>,
        presynced: bool,
    ) -> Result<Vec<u32>, WalletError> {
        let mut amount = amount;
        let mut presynced = presynced;
        loop {
            let found: Vec<u32> = self
                .addresses
                .iter()
                .filter(|a| a.is_unused() && !used.contains(&a.index))
                .map(|a| a.index)
                .take(amount)
                .collect();
            if found.len() == amount {
                used.extend_from_slice(&found);
                return Ok(found);
            }
            if presynced {
                return Err(WalletError::UnusedIndices);
            }
            amount += used.len();
            let requested = u32::try_from(amount).unwrap_or(u32::MAX);
            let options = (requested > self.options.unused_address_count).then(|| WalletOptions {
                unused_address_count: requested,
                ..self.options.clone()
            });
            debug!("Found {} of {amount} unused indices, syncing", found.len());
            self.sync(options).await?;
            presynced = true;
        }
    }

    /// Puzzle of a freshly reserved unused address.
    pub(crate) async fn change_puzzle(&mut self) -> Result<WalletPuzzle, WalletError> {
        let index = self
            .find_unused_indices(1, &mut vec![], false)
            .await?
            .first()
            .copied()
            .ok_or(WalletError::UnusedIndices)?;
        self.address(index)
            .map(|a| a.puzzle.clone())
            .ok_or(WalletError::UnusedIndices)
    }

    /// Sum of records that are unspent by both height and flag.
    #[must_use]
    pub fn balance(&self) -> u128 {
        self.coin_records()
            .filter(|r| r.is_unspent())
            .map(|r| u128::from(r.coin.amount))
            .sum()
    }

    pub fn select_coin_records(
        &self,
        amount: u64,
        selection: CoinSelection,
        minimum_coin_records: usize,
        required: bool,
    ) -> Result<Vec<CoinRecord>, WalletError> {
        select_coin_records(
            self.coin_records(),
            amount,
            selection,
            minimum_coin_records,
            required,
        )
    }

    pub fn sign_spend(
        &self,
        spend_bundle: &SpendBundle,
        agg_sig_me_extra_data: &[u8],
    ) -> Result<SpendBundle, WalletError> {
        self.kind
            .sign_spend(&self.key_store, spend_bundle, agg_sig_me_extra_data)
    }

    /// Pushes the bundle, then records the coins it creates for this wallet as unconfirmed
    /// when enabled.
    pub async fn complete_spend(&mut self, spend_bundle: &SpendBundle) -> Result<(), WalletError> {
        match self.cancellable(self.node.push_tx(spend_bundle)).await {
            Ok(TXStatus::SUCCESS | TXStatus::PENDING) => {
                info!("Pushed spend bundle {}", spend_bundle.name());
            }
            Ok(TXStatus::FAILED) => return Err(WalletError::PushTx),
            Err(WalletError::Io(e)) => {
                warn!("Failed to push spend bundle {}: {e}", spend_bundle.name());
                return Err(WalletError::PushTx);
            }
            Err(e) => return Err(e),
        }
        if !self.options.instant_coin_records {
            return Ok(());
        }
        let removals: HashSet<Bytes32> = spend_bundle
            .removals()
            .iter()
            .map(|c| c.name())
            .collect();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        // the bundle is already broadcast, so bad outputs are skipped rather than failing
        let mut additions = vec![];
        for coin_spend in &spend_bundle.coin_spends {
            match coin_spend.additions() {
                Ok(coins) => additions.extend(coins),
                Err(e) => warn!(
                    "Skipping outputs of coin {} in pushed bundle: {e}",
                    coin_spend.coin.name()
                ),
            }
        }
        for coin in additions {
            if self.address_for_puzzle_hash(&coin.puzzle_hash).is_none() {
                continue;
            }
            let spent = removals.contains(&coin.name());
            self.artificial_coin_records.push(CoinRecord {
                coin,
                confirmed_block_index: 0,
                spent_block_index: u32::from(spent),
                timestamp,
                coinbase: false,
                spent,
            });
        }
        self.fetch_coin_records().await
    }
}
