use async_trait::async_trait;
use dg_wallet_core::blockchain::coin_record::CoinRecord;
use dg_wallet_core::blockchain::coin_spend::CoinSpend;
use dg_wallet_core::blockchain::sized_bytes::Bytes32;
use dg_wallet_core::blockchain::spend_bundle::SpendBundle;
use dg_wallet_core::blockchain::tx_status::TXStatus;
use std::io::Error;

/// Full node queries used by the wallet.
#[async_trait]
pub trait FullnodeAPI: Send + Sync {
    async fn get_coin_records_by_puzzle_hash(
        &self,
        puzzle_hash: &Bytes32,
        include_spent_coins: Option<bool>,
        start_height: Option<u32>,
        end_height: Option<u32>,
    ) -> Result<Vec<CoinRecord>, Error>;
    async fn get_coin_records_by_puzzle_hashes(
        &self,
        puzzle_hashes: &[Bytes32],
        include_spent_coins: Option<bool>,
        start_height: Option<u32>,
        end_height: Option<u32>,
    ) -> Result<Vec<CoinRecord>, Error>;
    async fn get_coin_record_by_name(&self, name: &Bytes32) -> Result<Option<CoinRecord>, Error>;
    async fn push_tx(&self, spend_bundle: &SpendBundle) -> Result<TXStatus, Error>;
    async fn get_puzzle_and_solution(
        &self,
        coin_id: &Bytes32,
        height: u32,
    ) -> Result<CoinSpend, Error>;
    /// Spend of a coin that the node reports as spent.
    async fn get_coin_spend(&self, coin_record: &CoinRecord) -> Result<CoinSpend, Error> {
        self.get_puzzle_and_solution(&coin_record.coin.name(), coin_record.spent_block_index)
            .await
    }
}
