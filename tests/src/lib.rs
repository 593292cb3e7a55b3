use async_trait::async_trait;
use blst::min_pk::SecretKey;
use dg_wallet::options::WalletOptions;
use dg_wallet_clients::api::full_node::FullnodeAPI;
use dg_wallet_core::blockchain::coin::Coin;
use dg_wallet_core::blockchain::coin_record::CoinRecord;
use dg_wallet_core::blockchain::coin_spend::CoinSpend;
use dg_wallet_core::blockchain::sized_bytes::Bytes32;
use dg_wallet_core::blockchain::spend_bundle::SpendBundle;
use dg_wallet_core::blockchain::tx_status::TXStatus;
use dg_wallet_keys::key_store::{KeyStore, RootKey};
use log::debug;
use std::collections::HashMap;
use std::io::{Error, ErrorKind};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// In memory full node. Coins are added with [`MockFullnode::add_coin`] and spends are
/// only applied to the coin set when [`MockFullnode::confirm`] is called.
#[derive(Debug)]
pub struct MockFullnode {
    coin_records: Mutex<Vec<CoinRecord>>,
    by_name: Mutex<HashMap<Bytes32, usize>>,
    misreported: Mutex<HashMap<Bytes32, CoinRecord>>,
    coin_spends: Mutex<HashMap<Bytes32, CoinSpend>>,
    pushed: Mutex<Vec<SpendBundle>>,
    push_status: Mutex<TXStatus>,
    stalled: AtomicBool,
    queries: AtomicUsize,
}
impl Default for MockFullnode {
    fn default() -> Self {
        MockFullnode {
            coin_records: Mutex::new(vec![]),
            by_name: Mutex::new(HashMap::new()),
            misreported: Mutex::new(HashMap::new()),
            coin_spends: Mutex::new(HashMap::new()),
            pushed: Mutex::new(vec![]),
            push_status: Mutex::new(TXStatus::SUCCESS),
            stalled: AtomicBool::new(false),
            queries: AtomicUsize::new(0),
        }
    }
}
impl MockFullnode {
    pub fn add_coin(&self, coin: Coin, height: u32) -> CoinRecord {
        let record = CoinRecord {
            coin,
            confirmed_block_index: height,
            spent_block_index: 0,
            timestamp: 1_700_000_000 + u64::from(height),
            coinbase: false,
            spent: false,
        };
        let mut records = self.coin_records.lock().unwrap();
        self.by_name
            .lock()
            .unwrap()
            .insert(record.coin.name(), records.len());
        records.push(record.clone());
        record
    }

    /// Answers lookups of `name` with `record`, like a node with a corrupt coin store.
    pub fn misreport(&self, name: Bytes32, record: CoinRecord) {
        self.misreported.lock().unwrap().insert(name, record);
    }

    /// Marks the spent coin and remembers its puzzle and solution.
    pub fn add_spend(&self, coin_spend: CoinSpend, height: u32) {
        let name = coin_spend.coin.name();
        let mut records = self.coin_records.lock().unwrap();
        let mut by_name = self.by_name.lock().unwrap();
        match by_name.get(&name) {
            Some(index) => {
                let record = &mut records[*index];
                record.spent_block_index = height;
                record.spent = true;
            }
            None => {
                by_name.insert(name, records.len());
                records.push(CoinRecord {
                    coin: coin_spend.coin,
                    confirmed_block_index: height.saturating_sub(1),
                    spent_block_index: height,
                    timestamp: 1_700_000_000 + u64::from(height),
                    coinbase: false,
                    spent: true,
                });
            }
        }
        self.coin_spends.lock().unwrap().insert(name, coin_spend);
    }

    /// Applies every spend of the bundle and adds the coins it creates.
    pub fn confirm(&self, spend_bundle: &SpendBundle, height: u32) {
        for coin in spend_bundle.additions().unwrap() {
            self.add_coin(coin, height);
        }
        for coin_spend in &spend_bundle.coin_spends {
            self.add_spend(coin_spend.clone(), height);
        }
    }

    pub fn pushed(&self) -> Vec<SpendBundle> {
        self.pushed.lock().unwrap().clone()
    }

    pub fn set_push_status(&self, status: TXStatus) {
        *self.push_status.lock().unwrap() = status;
    }

    /// Every request waits forever while stalled.
    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    async fn request(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl FullnodeAPI for MockFullnode {
    async fn get_coin_records_by_puzzle_hash(
        &self,
        puzzle_hash: &Bytes32,
        include_spent_coins: Option<bool>,
        start_height: Option<u32>,
        end_height: Option<u32>,
    ) -> Result<Vec<CoinRecord>, Error> {
        self.get_coin_records_by_puzzle_hashes(
            &[*puzzle_hash],
            include_spent_coins,
            start_height,
            end_height,
        )
        .await
    }
    async fn get_coin_records_by_puzzle_hashes(
        &self,
        puzzle_hashes: &[Bytes32],
        include_spent_coins: Option<bool>,
        _start_height: Option<u32>,
        _end_height: Option<u32>,
    ) -> Result<Vec<CoinRecord>, Error> {
        self.request().await;
        let include_spent_coins = include_spent_coins.unwrap_or(false);
        Ok(self
            .coin_records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| puzzle_hashes.contains(&r.coin.puzzle_hash))
            .filter(|r| include_spent_coins || !r.spent)
            .cloned()
            .collect())
    }
    async fn get_coin_record_by_name(&self, name: &Bytes32) -> Result<Option<CoinRecord>, Error> {
        self.request().await;
        if let Some(record) = self.misreported.lock().unwrap().get(name) {
            return Ok(Some(record.clone()));
        }
        let index = self.by_name.lock().unwrap().get(name).copied();
        Ok(index.map(|i| self.coin_records.lock().unwrap()[i].clone()))
    }
    async fn push_tx(&self, spend_bundle: &SpendBundle) -> Result<TXStatus, Error> {
        self.request().await;
        let status = *self.push_status.lock().unwrap();
        debug!("Mock node received {} with {status:?}", spend_bundle.name());
        if status != TXStatus::FAILED {
            self.pushed.lock().unwrap().push(spend_bundle.clone());
        }
        Ok(status)
    }
    async fn get_puzzle_and_solution(
        &self,
        coin_id: &Bytes32,
        _height: u32,
    ) -> Result<CoinSpend, Error> {
        self.request().await;
        self.coin_spends
            .lock()
            .unwrap()
            .get(coin_id)
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("No spend for {coin_id}")))
    }
}

pub fn secret_key(seed: u8) -> SecretKey {
    SecretKey::key_gen(&[seed; 32], &[]).unwrap()
}

pub fn key_store(seed: u8) -> KeyStore {
    KeyStore::new(RootKey::Secret(secret_key(seed)), false)
}

/// Small gap limit and no minimum so tests control how many addresses exist.
pub fn options(unused_address_count: u32) -> WalletOptions {
    WalletOptions {
        min_address_count: 0,
        unused_address_count,
        ..Default::default()
    }
}
