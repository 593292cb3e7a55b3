use crate::puzzle_store::PuzzleStore;
use dg_wallet_core::blockchain::sized_bytes::{Bytes32, Bytes48};
use dg_wallet_core::clvm::program::Program;
use std::io::Error;

pub const DELEGATED: &str = "delegated";
pub const EVERYTHING_WITH_SIGNATURE: &str = "everything_with_signature";
pub const INDEXED_WITH_SIGNATURE: &str = "indexed_with_signature";
pub const GENESIS_BY_COIN_ID: &str = "genesis_by_coin_id";
pub const MELTABLE_GENESIS_BY_COIN_ID: &str = "meltable_genesis_by_coin_id";

/// Lets the holder of `public_key` sign arbitrary delegated tails.
pub fn delegated(store: &PuzzleStore, public_key: &Bytes48) -> Result<Program, Error> {
    Ok(store.get(DELEGATED)?.curry(&[public_key.into()]))
}

/// Allows any issuance or melt signed by `public_key`.
pub fn everything_with_signature(store: &PuzzleStore, public_key: &Bytes48) -> Result<Program, Error> {
    Ok(store.get(EVERYTHING_WITH_SIGNATURE)?.curry(&[public_key.into()]))
}

/// Like [`everything_with_signature`] with an index so one key can own several assets.
pub fn indexed_with_signature(
    store: &PuzzleStore,
    public_key: &Bytes48,
    index: u64,
) -> Result<Program, Error> {
    Ok(store
        .get(INDEXED_WITH_SIGNATURE)?
        .curry(&[public_key.into(), index.into()]))
}

/// Single issuance from the coin `coin_id`.
pub fn genesis_by_coin_id(store: &PuzzleStore, coin_id: &Bytes32) -> Result<Program, Error> {
    Ok(store.get(GENESIS_BY_COIN_ID)?.curry(&[coin_id.into()]))
}

pub fn meltable_genesis_by_coin_id(store: &PuzzleStore, coin_id: &Bytes32) -> Result<Program, Error> {
    Ok(store.get(MELTABLE_GENESIS_BY_COIN_ID)?.curry(&[coin_id.into()]))
}
