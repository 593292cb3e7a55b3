use dg_wallet_core::blockchain::sized_bytes::{Bytes32, Bytes48};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Cannot generate private key without root private key.")]
    HardenedWithoutPrivateKey,
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Insufficient number of coin records.")]
    InsufficientCoinRecords,
    #[error("Insufficient funds.")]
    InsufficientFunds,
    #[error("Could not find enough unused indices.")]
    UnusedIndices,

    #[error("Parent puzzle is not asset token.")]
    NotAssetToken,
    #[error("Invalid parent puzzle reveal.")]
    InvalidLineage,
    #[error("Mixed asset ids in spend.")]
    MixedAssetIds,
    #[error("Missing spendable asset coin.")]
    EmptyRing,
    #[error("Coin record is not a genesis.")]
    GenesisNotFound,
    #[error("Eve is not an asset token.")]
    EveNotAssetToken,
    #[error("Asset spend output is atom.")]
    EveOutputAtom,
    #[error("Ancestry walk exceeded {0} coins or revisited a coin.")]
    AncestryTooDeep(usize),
    #[error("Invalid condition length.")]
    InvalidConditionLength,
    #[error("Invalid public key.")]
    InvalidPublicKey,
    #[error("Invalid message.")]
    InvalidMessage,
    #[error("Could not find private key for {0}.")]
    MissingPrivateKey(Bytes48),
    #[error("Could not find coin record {0}.")]
    CoinRecordNotFound(Bytes32),
    #[error("No wallet address for puzzle hash {0}.")]
    UnknownPuzzleHash(Bytes32),

    #[error("Could not push transaction.")]
    PushTx,
    #[error("Operation cancelled.")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
