pub mod coin;
pub mod coin_record;
pub mod coin_spend;
pub mod condition_opcode;
pub mod sized_bytes;
pub mod spend_bundle;
pub mod tx_status;
