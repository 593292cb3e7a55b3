pub mod key_pair;
pub mod key_store;

use bech32::{Bech32m, Hrp};
use bip39::Mnemonic;
use blst::min_pk::{AggregatePublicKey, PublicKey, SecretKey};
use blst::{blst_bendian_from_scalar, blst_scalar, blst_scalar_from_be_bytes, blst_sk_add_n_check};
use dg_wallet_core::blockchain::sized_bytes::{hex_to_bytes, prep_hex_str, Bytes32, SizedBytes};
use dg_wallet_puzzles::p2_delegated_puzzle_or_hidden_puzzle::puzzle_hash_for_pk;
use dg_wallet_serialize::{hash_256, hash_all};
use hkdf::Hkdf;
use sha2::Sha256;
use std::io::{Error, ErrorKind};
use std::mem::size_of;
use std::str::FromStr;

fn _version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
fn _pkg_name() -> &'static str {
    env!("CARGO_PKG_NAME")
}

#[must_use]
pub fn version() -> String {
    format!("{}: {}", _pkg_name(), _version())
}

#[test]
fn test_version() {
    println!("{}", version());
}

pub const BLS_SPEC_NUMBER: u32 = 12381;
pub const CHIA_BLOCKCHAIN_NUMBER: u32 = 8444;
pub const WALLET_PATH: u32 = 2;

fn blst_error<T: std::fmt::Debug>(e: T) -> Error {
    Error::new(ErrorKind::InvalidInput, format!("{e:?}"))
}

pub fn hmac_extract_expand(
    length: usize,
    key: &[u8],
    salt: &[u8],
    info: &[u8],
) -> Result<Vec<u8>, Error> {
    let hk = Hkdf::<Sha256>::new(Some(salt), key);
    let mut out = vec![0u8; length];
    hk.expand(info, &mut out)
        .map_err(|e| Error::new(ErrorKind::InvalidInput, e.to_string()))?;
    Ok(out)
}

fn ikm_to_lamport_sk(ikm: &[u8], salt: &[u8]) -> Result<Vec<u8>, Error> {
    hmac_extract_expand(32 * 255, ikm, salt, &[])
}

fn parent_sk_to_lamport_pk(parent_sk: &SecretKey, index: u32) -> Result<Vec<u8>, Error> {
    let salt = index.to_be_bytes();
    let ikm = parent_sk.to_bytes();
    let not_ikm: Vec<u8> = ikm.iter().map(|e| e ^ 0xFF).collect();
    let lamport0 = ikm_to_lamport_sk(&ikm, &salt)?;
    let lamport1 = ikm_to_lamport_sk(&not_ikm, &salt)?;
    let lamport_pk: Vec<Vec<u8>> = lamport0
        .chunks(32)
        .chain(lamport1.chunks(32))
        .map(hash_256)
        .collect();
    Ok(hash_all(lamport_pk))
}

/// Reduces a 32 byte digest modulo the group order.
fn scalar_from_hash(hash: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut scalar = blst_scalar::default();
    unsafe {
        blst_scalar_from_be_bytes(&mut scalar, hash.as_ptr(), hash.len());
        blst_bendian_from_scalar(out.as_mut_ptr(), &scalar);
    }
    out
}

fn unhardened_offset(public_key: &PublicKey, index: u32) -> [u8; 32] {
    scalar_from_hash(&hash_all([
        public_key.to_bytes().as_slice(),
        &index.to_be_bytes(),
    ]))
}

pub fn derive_child_sk(key: &SecretKey, index: u32) -> Result<SecretKey, Error> {
    let lamport_pk = parent_sk_to_lamport_pk(key, index)?;
    SecretKey::key_gen_v3(&lamport_pk, &[]).map_err(blst_error)
}

pub fn derive_child_sk_unhardened(key: &SecretKey, index: u32) -> Result<SecretKey, Error> {
    let offset = unhardened_offset(&key.sk_to_pk(), index);
    let kb = key.to_bytes();
    let mut out = [0u8; 32];
    let mut o = blst_scalar::default();
    let mut h = blst_scalar::default();
    let mut s = blst_scalar::default();
    let agg = unsafe {
        blst_scalar_from_be_bytes(&mut h, offset.as_ptr(), offset.len());
        blst_scalar_from_be_bytes(&mut s, kb.as_ptr(), kb.len());
        blst_sk_add_n_check(&mut o, &h, &s);
        blst_bendian_from_scalar(out.as_mut_ptr(), &o);
        out
    };
    SecretKey::from_bytes(&agg).map_err(blst_error)
}

/// Public counterpart of [`derive_child_sk_unhardened`]: `pk + G1 * offset`.
pub fn derive_child_pk_unhardened(key: &PublicKey, index: u32) -> Result<PublicKey, Error> {
    let offset = SecretKey::from_bytes(&unhardened_offset(key, index)).map_err(blst_error)?;
    let mut agg = AggregatePublicKey::from_public_key(key);
    agg.add_public_key(&offset.sk_to_pk(), false)
        .map_err(blst_error)?;
    Ok(agg.to_public_key())
}

pub fn derive_path(key: &SecretKey, paths: &[u32]) -> Result<SecretKey, Error> {
    let mut key: SecretKey = key.clone();
    for index in paths {
        key = derive_child_sk(&key, *index)?;
    }
    Ok(key)
}

pub fn derive_path_unhardened(key: &SecretKey, paths: &[u32]) -> Result<SecretKey, Error> {
    let mut key: SecretKey = key.clone();
    for index in paths {
        key = derive_child_sk_unhardened(&key, *index)?;
    }
    Ok(key)
}

pub fn derive_path_pk_unhardened(key: &PublicKey, paths: &[u32]) -> Result<PublicKey, Error> {
    let mut key: PublicKey = *key;
    for index in paths {
        key = derive_child_pk_unhardened(&key, *index)?;
    }
    Ok(key)
}

fn wallet_path(index: u32) -> [u32; 4] {
    [BLS_SPEC_NUMBER, CHIA_BLOCKCHAIN_NUMBER, WALLET_PATH, index]
}

pub fn master_sk_to_wallet_sk(key: &SecretKey, index: u32) -> Result<SecretKey, Error> {
    derive_path(key, &wallet_path(index))
}

pub fn master_sk_to_wallet_sk_unhardened(key: &SecretKey, index: u32) -> Result<SecretKey, Error> {
    derive_path_unhardened(key, &wallet_path(index))
}

pub fn master_pk_to_wallet_pk_unhardened(key: &PublicKey, index: u32) -> Result<PublicKey, Error> {
    derive_path_pk_unhardened(key, &wallet_path(index))
}

pub fn key_from_mnemonic_str(mnemonic: &str) -> Result<SecretKey, Error> {
    let mnemonic = Mnemonic::from_str(mnemonic)
        .map_err(|e| Error::new(ErrorKind::InvalidInput, format!("{e:?}")))?;
    key_from_mnemonic(&mnemonic)
}

pub fn key_from_mnemonic(mnemonic: &Mnemonic) -> Result<SecretKey, Error> {
    let seed = mnemonic.to_seed("");
    SecretKey::key_gen_v3(&seed, &[]).map_err(blst_error)
}

#[must_use]
pub fn fingerprint(key: &PublicKey) -> u32 {
    let mut int_buf = [0; size_of::<u32>()];
    int_buf.copy_from_slice(&hash_256(key.to_bytes())[0..size_of::<u32>()]);
    u32::from_be_bytes(int_buf)
}

pub fn encode_puzzle_hash(puzzle_hash: &Bytes32, prefix: &str) -> Result<String, Error> {
    let hrp = Hrp::parse(prefix)
        .map_err(|e| Error::new(ErrorKind::InvalidInput, format!("Invalid prefix {prefix}: {e:?}")))?;
    bech32::encode::<Bech32m>(hrp, puzzle_hash.as_slice())
        .map_err(|e| Error::new(ErrorKind::InvalidInput, format!("{e:?}")))
}

pub fn decode_puzzle_hash(address: &str) -> Result<Bytes32, Error> {
    let (_, data) = bech32::decode(address).map_err(|e| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Error Decoding address: ({address}): {e:?}"),
        )
    })?;
    Bytes32::parse(&data)
}

/// Address of the standard puzzle for the hardened wallet key at `index`.
pub fn get_address(key: &SecretKey, index: u32, prefix: &str) -> Result<String, Error> {
    let wallet_sk = master_sk_to_wallet_sk(key, index)?;
    let puzzle_hash = puzzle_hash_for_pk(&wallet_sk.sk_to_pk().into())?;
    encode_puzzle_hash(&puzzle_hash, prefix)
}

/// Accepts either a bech32m address or a 32 byte hex puzzle hash.
pub fn parse_payout_address(s: &str) -> Result<Bytes32, Error> {
    if s.starts_with("xch") || s.starts_with("txch") {
        decode_puzzle_hash(s)
    } else if prep_hex_str(s).len() == 64 {
        let bytes = hex_to_bytes(s).map_err(|e| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Error Parsing Payout Address({s}): {e:?}"),
            )
        })?;
        Bytes32::parse(&bytes)
    } else {
        Err(Error::new(
            ErrorKind::InvalidInput,
            "String does not appear to be a valid XCH Payout Address",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SecretKey {
        SecretKey::from_bytes(
            &hex::decode("6bb19282e27bc6e7e397fb19efc2627a412410fdfd13bf14f4ce5bfdce084c71")
                .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_unhardened_public_matches_private() {
        let sk = test_key();
        for index in 0..4 {
            let private = master_sk_to_wallet_sk_unhardened(&sk, index).unwrap();
            let public = master_pk_to_wallet_pk_unhardened(&sk.sk_to_pk(), index).unwrap();
            assert_eq!(private.sk_to_pk(), public);
        }
    }

    #[test]
    fn test_hardened_differs_from_unhardened() {
        let sk = test_key();
        let hardened = master_sk_to_wallet_sk(&sk, 0).unwrap();
        let unhardened = master_sk_to_wallet_sk_unhardened(&sk, 0).unwrap();
        assert_ne!(hardened.to_bytes(), unhardened.to_bytes());
        assert_eq!(
            hardened.to_bytes(),
            master_sk_to_wallet_sk(&sk, 0).unwrap().to_bytes()
        );
    }

    #[test]
    fn test_address_encoding() {
        let puzzle_hash = Bytes32::new(&[0xAB; 32]);
        let address = encode_puzzle_hash(&puzzle_hash, "xch").unwrap();
        assert!(address.starts_with("xch1"));
        assert_eq!(decode_puzzle_hash(&address).unwrap(), puzzle_hash);
        assert_eq!(parse_payout_address(&address).unwrap(), puzzle_hash);
        assert_eq!(
            parse_payout_address(&hex::encode([0xAB; 32])).unwrap(),
            puzzle_hash
        );
        assert!(parse_payout_address("nope").is_err());
    }

    #[test]
    fn test_mnemonic_key() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let first = key_from_mnemonic_str(phrase).unwrap();
        let second = key_from_mnemonic_str(phrase).unwrap();
        assert_eq!(first.to_bytes(), second.to_bytes());
        assert_eq!(fingerprint(&first.sk_to_pk()), fingerprint(&second.sk_to_pk()));
        assert_eq!(fingerprint(&first.sk_to_pk()), 3_781_984_839);
        assert_eq!(
            hex::encode(first.sk_to_pk().to_bytes()),
            "82ae65efe846b15a92c51b7ad6c32589fd79d38263d3cbefbeeba08be8e90d8bc335a1e2fcc66a10b8c817c06232285a"
        );
        assert!(key_from_mnemonic_str("not a mnemonic").is_err());
    }

    #[test]
    fn test_wallet_key_vectors() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let root = key_from_mnemonic_str(phrase).unwrap();
        assert_eq!(
            hex::encode(master_sk_to_wallet_sk(&root, 0).unwrap().sk_to_pk().to_bytes()),
            "939eb1a48083df34941708e3fcf917eb828c6d314ac70f2c70f2ab6b894766ef79da9aa3cb467ccdeea9602360bd746a"
        );
        let unhardened = master_sk_to_wallet_sk_unhardened(&root, 0).unwrap().sk_to_pk();
        assert_eq!(
            hex::encode(unhardened.to_bytes()),
            "89e2f0cd40015e10ff92a1223acb5ce1de3c7d77163ee36896f095d6a1f118c797994291b7124c82d809802c5223d26c"
        );
        assert_eq!(
            master_pk_to_wallet_pk_unhardened(&root.sk_to_pk(), 0).unwrap(),
            unhardened
        );
    }
}
