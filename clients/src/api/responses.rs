use dg_wallet_core::blockchain::coin_record::CoinRecord;
use dg_wallet_core::blockchain::coin_spend::CoinSpend;
use dg_wallet_core::blockchain::tx_status::TXStatus;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CoinRecordResp {
    pub coin_record: Option<CoinRecord>,
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoinRecordAryResp {
    pub coin_records: Vec<CoinRecord>,
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoinSpendResp {
    pub coin_solution: CoinSpend,
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TXResp {
    pub status: TXStatus,
    pub success: bool,
}
