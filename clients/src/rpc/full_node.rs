use crate::api::full_node::FullnodeAPI;
use crate::api::responses::{CoinRecordAryResp, CoinRecordResp, CoinSpendResp, TXResp};
use crate::rpc::{get_client, get_url, post};
use async_trait::async_trait;
use dg_wallet_core::blockchain::coin_record::CoinRecord;
use dg_wallet_core::blockchain::coin_spend::CoinSpend;
use dg_wallet_core::blockchain::sized_bytes::Bytes32;
use dg_wallet_core::blockchain::spend_bundle::SpendBundle;
use dg_wallet_core::blockchain::tx_status::TXStatus;
use log::debug;
use reqwest::Client;
use serde_json::{json, Map};
use std::collections::HashMap;
use std::io::Error;

pub struct FullnodeClient {
    client: Client,
    pub host: String,
    pub port: u16,
    pub ssl_path: Option<String>,
    pub additional_headers: Option<HashMap<String, String>>,
}

impl FullnodeClient {
    pub fn new(
        host: &str,
        port: u16,
        ssl_path: Option<String>,
        additional_headers: &Option<HashMap<String, String>>,
    ) -> Result<Self, Error> {
        Ok(FullnodeClient {
            client: get_client(ssl_path.as_deref())?,
            host: host.to_string(),
            port,
            ssl_path,
            additional_headers: additional_headers.clone(),
        })
    }
    fn url(&self, request_uri: &str) -> String {
        get_url(self.host.as_str(), self.port, request_uri)
    }
}

#[async_trait]
impl FullnodeAPI for FullnodeClient {
    async fn get_coin_records_by_puzzle_hash(
        &self,
        puzzle_hash: &Bytes32,
        include_spent_coins: Option<bool>,
        start_height: Option<u32>,
        end_height: Option<u32>,
    ) -> Result<Vec<CoinRecord>, Error> {
        let mut request_body = Map::new();
        request_body.insert("puzzle_hash".to_string(), json!(puzzle_hash));
        if let Some(include_spent_coins) = include_spent_coins {
            request_body.insert(
                "include_spent_coins".to_string(),
                json!(include_spent_coins),
            );
        }
        if let Some(start_height) = start_height {
            request_body.insert("start_height".to_string(), json!(start_height));
        }
        if let Some(end_height) = end_height {
            request_body.insert("end_height".to_string(), json!(end_height));
        }
        Ok(post::<CoinRecordAryResp>(
            &self.client,
            &self.url("get_coin_records_by_puzzle_hash"),
            &request_body,
            &self.additional_headers,
        )
        .await?
        .coin_records)
    }
    async fn get_coin_records_by_puzzle_hashes(
        &self,
        puzzle_hashes: &[Bytes32],
        include_spent_coins: Option<bool>,
        start_height: Option<u32>,
        end_height: Option<u32>,
    ) -> Result<Vec<CoinRecord>, Error> {
        let mut request_body = Map::new();
        request_body.insert("puzzle_hashes".to_string(), json!(puzzle_hashes));
        request_body.insert(
            "include_spent_coins".to_string(),
            json!(include_spent_coins.unwrap_or(true)),
        );
        if let Some(sh) = start_height {
            request_body.insert("start_height".to_string(), json!(sh));
        }
        if let Some(eh) = end_height {
            request_body.insert("end_height".to_string(), json!(eh));
        }
        Ok(post::<CoinRecordAryResp>(
            &self.client,
            &self.url("get_coin_records_by_puzzle_hashes"),
            &request_body,
            &self.additional_headers,
        )
        .await?
        .coin_records)
    }
    async fn get_coin_record_by_name(&self, name: &Bytes32) -> Result<Option<CoinRecord>, Error> {
        let mut request_body = Map::new();
        request_body.insert("name".to_string(), json!(name));
        Ok(post::<CoinRecordResp>(
            &self.client,
            &self.url("get_coin_record_by_name"),
            &request_body,
            &self.additional_headers,
        )
        .await?
        .coin_record)
    }
    async fn push_tx(&self, spend_bundle: &SpendBundle) -> Result<TXStatus, Error> {
        debug!("Pushing spend bundle {}", spend_bundle.name());
        let mut request_body = Map::new();
        request_body.insert("spend_bundle".to_string(), json!(spend_bundle));
        Ok(post::<TXResp>(
            &self.client,
            &self.url("push_tx"),
            &request_body,
            &self.additional_headers,
        )
        .await?
        .status)
    }
    async fn get_puzzle_and_solution(
        &self,
        coin_id: &Bytes32,
        height: u32,
    ) -> Result<CoinSpend, Error> {
        let mut request_body = Map::new();
        request_body.insert("coin_id".to_string(), json!(coin_id));
        request_body.insert("height".to_string(), json!(height));
        Ok(post::<CoinSpendResp>(
            &self.client,
            &self.url("get_puzzle_and_solution"),
            &request_body,
            &self.additional_headers,
        )
        .await?
        .coin_solution)
    }
}
