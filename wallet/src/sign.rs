use crate::error::WalletError;
use blst::min_pk::{SecretKey, Signature};
use dg_wallet_core::blockchain::coin_spend::CoinSpend;
use dg_wallet_core::blockchain::condition_opcode::ConditionOpcode;
use dg_wallet_core::blockchain::sized_bytes::{Bytes32, Bytes48, Bytes96, SizedBytes};
use dg_wallet_core::blockchain::spend_bundle::SpendBundle;
use dg_wallet_core::clvm::bls_bindings::{aggregate_signatures, sign, INFINITE_SIGNATURE};
use dg_wallet_keys::key_store::KeyStore;
use dg_wallet_puzzles::p2_delegated_puzzle_or_hidden_puzzle::calculate_synthetic_secret_key;
use log::debug;

pub const MAX_MESSAGE_LENGTH: usize = 1024;

/// Public key and message pairs requested by the `AGG_SIG_UNSAFE` and `AGG_SIG_ME` conditions
/// of a spend. `AGG_SIG_ME` messages are bound to the coin id and `agg_sig_me_extra_data`.
pub fn pkm_pairs(
    coin_spend: &CoinSpend,
    agg_sig_me_extra_data: &[u8],
) -> Result<Vec<(Bytes48, Vec<u8>)>, WalletError> {
    let output = coin_spend.output()?;
    let mut pairs = vec![];
    for condition in output.as_list() {
        let Some((opcode, _)) = condition.as_pair() else {
            continue;
        };
        let opcode = ConditionOpcode::from(&opcode);
        if !matches!(
            opcode,
            ConditionOpcode::AggSigUnsafe | ConditionOpcode::AggSigMe
        ) {
            continue;
        }
        let args = condition.as_list();
        if args.len() != 3 {
            return Err(WalletError::InvalidConditionLength);
        }
        let public_key = match args[1].as_vec() {
            Some(bytes) if bytes.len() == Bytes48::SIZE => Bytes48::new(&bytes),
            _ => return Err(WalletError::InvalidPublicKey),
        };
        let mut message = match args[2].as_vec() {
            Some(bytes) if bytes.len() <= MAX_MESSAGE_LENGTH => bytes,
            _ => return Err(WalletError::InvalidMessage),
        };
        if opcode == ConditionOpcode::AggSigMe {
            message.extend_from_slice(coin_spend.coin.coin_id().as_slice());
            message.extend_from_slice(agg_sig_me_extra_data);
        }
        pairs.push((public_key, message));
    }
    Ok(pairs)
}

/// Signs every request of the spend that one of `secret_keys` can answer.
///
/// A request with no matching key is skipped when `partial`, otherwise it fails with
/// [`WalletError::MissingPrivateKey`]. Returns the infinity signature when nothing was signed.
pub fn sign_coin_spend(
    coin_spend: &CoinSpend,
    agg_sig_me_extra_data: &[u8],
    partial: bool,
    secret_keys: &[SecretKey],
) -> Result<Bytes96, WalletError> {
    let candidates: Vec<(Bytes48, &SecretKey)> = secret_keys
        .iter()
        .map(|sk| (Bytes48::from(sk.sk_to_pk()), sk))
        .collect();
    let pairs = pkm_pairs(coin_spend, agg_sig_me_extra_data)?;
    let total_messages = pairs.len();
    let mut signatures: Vec<Signature> = vec![];
    for (public_key, message) in pairs {
        match candidates.iter().find(|(pk, _)| *pk == public_key) {
            Some((_, secret_key)) => signatures.push(sign(secret_key, &message)),
            None if partial => continue,
            None => return Err(WalletError::MissingPrivateKey(public_key)),
        }
    }
    debug!(
        "Signed {}/{total_messages} messages for coin {}",
        signatures.len(),
        coin_spend.coin.name()
    );
    Ok(aggregate_signatures(&signatures)?)
}

/// Signs each spend of the bundle and folds the result into its existing signature.
pub fn sign_spend_bundle(
    spend_bundle: &SpendBundle,
    agg_sig_me_extra_data: &[u8],
    partial: bool,
    secret_keys: &[SecretKey],
) -> Result<SpendBundle, WalletError> {
    let mut signatures = vec![];
    push_signature(&mut signatures, &spend_bundle.aggregated_signature)?;
    for coin_spend in &spend_bundle.coin_spends {
        let signature = sign_coin_spend(coin_spend, agg_sig_me_extra_data, partial, secret_keys)?;
        push_signature(&mut signatures, &signature)?;
    }
    Ok(SpendBundle {
        coin_spends: spend_bundle.coin_spends.clone(),
        aggregated_signature: aggregate_signatures(&signatures)?,
    })
}

fn push_signature(signatures: &mut Vec<Signature>, signature: &Bytes96) -> Result<(), WalletError> {
    if signature.as_slice() != INFINITE_SIGNATURE {
        signatures.push(Signature::try_from(signature)?);
    }
    Ok(())
}

/// Candidate keys for wallet spends: the synthetic key of every derived secret key, the root
/// secret key, then the raw derived secret keys.
pub fn wallet_signing_keys(
    key_store: &KeyStore,
    hidden_puzzle_hash: &Bytes32,
) -> Result<Vec<SecretKey>, WalletError> {
    let derived: Vec<&SecretKey> = key_store
        .keys()
        .iter()
        .filter_map(|k| k.secret_key.as_ref())
        .collect();
    let mut keys = Vec::with_capacity(derived.len() * 2 + 1);
    for secret_key in &derived {
        keys.push(
            calculate_synthetic_secret_key(secret_key, hidden_puzzle_hash)
                .map_err(|e| WalletError::InvalidKey(e.to_string()))?,
        );
    }
    if let Some(root) = key_store.secret_key() {
        keys.push(root.clone());
    }
    keys.extend(derived.into_iter().cloned());
    Ok(keys)
}
