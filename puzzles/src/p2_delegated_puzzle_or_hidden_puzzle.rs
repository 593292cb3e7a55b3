use crate::p2_conditions::puzzle_for_conditions;
use blst::min_pk::{AggregatePublicKey, PublicKey, SecretKey};
use dg_wallet_core::blockchain::sized_bytes::{Bytes32, Bytes48, SizedBytes};
use dg_wallet_core::clvm::curry_utils::{calculate_hash_of_quoted_mod_hash, curry_and_treehash};
use dg_wallet_core::clvm::more_ops::GROUP_ORDER;
use dg_wallet_core::clvm::program::Program;
use dg_wallet_core::clvm::sexp::{IntoSExp, NULL};
use dg_wallet_serialize::hash_all;
use num_bigint::BigInt;
use num_integer::Integer;
use once_cell::sync::OnceCell;
use std::io::{Error, ErrorKind};

pub const P2_DELEGATED_PUZZLE_OR_HIDDEN_PUZZLE_HEX: &str = "ff02ffff01ff02ffff03ff0bffff01ff02ffff03ffff09ff05ffff1dff0bffff1effff0bff0bffff02ff06ffff04ff02ffff04ff17ff8080808080808080ffff01ff02ff17ff2f80ffff01ff088080ff0180ffff01ff04ffff04ff04ffff04ff05ffff04ffff02ff06ffff04ff02ffff04ff17ff80808080ff80808080ffff02ff17ff2f808080ff0180ffff04ffff01ff32ff02ffff03ffff07ff0580ffff01ff0bffff0102ffff02ff06ffff04ff02ffff04ff09ff80808080ffff02ff06ffff04ff02ffff04ff0dff8080808080ffff01ff0bffff0101ff058080ff0180ff018080";
pub const DEFAULT_HIDDEN_PUZZLE_HEX: &str = "ff0980";
/// `(point_add 2 (pubkey_for_exp (sha256 2 5)))`
pub const SYNTHETIC_PUBLIC_KEY_HEX: &str = "ff1dff02ffff1effff0bff02ff05808080";

static MOD: OnceCell<Program> = OnceCell::new();
static QUOTED_MOD_HASH: OnceCell<Bytes32> = OnceCell::new();
static DEFAULT_HIDDEN_PUZZLE: OnceCell<Program> = OnceCell::new();

pub fn p2_delegated_or_hidden_mod() -> Result<&'static Program, Error> {
    MOD.get_or_try_init(|| Program::from_hex(P2_DELEGATED_PUZZLE_OR_HIDDEN_PUZZLE_HEX))
}

fn quoted_mod_hash() -> Result<&'static Bytes32, Error> {
    QUOTED_MOD_HASH.get_or_try_init(|| {
        Ok(calculate_hash_of_quoted_mod_hash(
            &p2_delegated_or_hidden_mod()?.tree_hash(),
        ))
    })
}

pub fn default_hidden_puzzle() -> Result<&'static Program, Error> {
    DEFAULT_HIDDEN_PUZZLE.get_or_try_init(|| Program::from_hex(DEFAULT_HIDDEN_PUZZLE_HEX))
}

pub fn default_hidden_puzzle_hash() -> Result<Bytes32, Error> {
    Ok(default_hidden_puzzle()?.tree_hash())
}

/// `sha256(public_key ‖ hidden_puzzle_hash)` read as a signed integer, reduced modulo the group order.
#[must_use]
pub fn calculate_synthetic_offset(public_key: &Bytes48, hidden_puzzle_hash: &Bytes32) -> BigInt {
    let blob = hash_all([public_key.as_slice(), hidden_puzzle_hash.as_slice()]);
    BigInt::from_signed_bytes_be(&blob).mod_floor(&GROUP_ORDER)
}

/// Big endian scalar left padded to 32 bytes.
fn scalar_bytes(value: &BigInt) -> Result<[u8; 32], Error> {
    let (_, bytes) = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("Scalar does not fit in 32 bytes: {value}"),
        ));
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

pub fn calculate_synthetic_public_key(
    public_key: &Bytes48,
    hidden_puzzle_hash: &Bytes32,
) -> Result<Bytes48, Error> {
    let offset = scalar_bytes(&calculate_synthetic_offset(public_key, hidden_puzzle_hash))?;
    let synthetic_offset = SecretKey::from_bytes(&offset).map_err(|e| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Synthetic offset Error: {e:?}"),
        )
    })?;
    let public_key = PublicKey::try_from(public_key)?;
    let mut agg = AggregatePublicKey::from_public_key(&public_key);
    agg.add_public_key(&synthetic_offset.sk_to_pk(), false)
        .map_err(|e| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Synthetic PK Error: {e:?}"),
            )
        })?;
    Ok(agg.to_public_key().into())
}

pub fn calculate_synthetic_secret_key(
    secret_key: &SecretKey,
    hidden_puzzle_hash: &Bytes32,
) -> Result<SecretKey, Error> {
    let secret_exponent = BigInt::from_bytes_be(num_bigint::Sign::Plus, &secret_key.to_bytes());
    let public_key: Bytes48 = secret_key.sk_to_pk().into();
    let synthetic_offset = calculate_synthetic_offset(&public_key, hidden_puzzle_hash);
    let synthetic_secret_exponent = (secret_exponent + synthetic_offset).mod_floor(&GROUP_ORDER);
    SecretKey::from_bytes(&scalar_bytes(&synthetic_secret_exponent)?).map_err(|e| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Synthetic SK Error: {e:?}"),
        )
    })
}

pub fn puzzle_for_synthetic_public_key(synthetic_public_key: &Bytes48) -> Result<Program, Error> {
    Ok(p2_delegated_or_hidden_mod()?.curry(&[Program::from(synthetic_public_key)]))
}

pub fn puzzle_hash_for_synthetic_public_key(
    synthetic_public_key: &Bytes48,
) -> Result<Bytes32, Error> {
    let public_key_hash = Program::from(synthetic_public_key).tree_hash();
    Ok(curry_and_treehash(quoted_mod_hash()?, &[public_key_hash]))
}

pub fn puzzle_for_public_key_and_hidden_puzzle_hash(
    public_key: &Bytes48,
    hidden_puzzle_hash: &Bytes32,
) -> Result<Program, Error> {
    let synthetic_public_key = calculate_synthetic_public_key(public_key, hidden_puzzle_hash)?;
    puzzle_for_synthetic_public_key(&synthetic_public_key)
}

pub fn puzzle_hash_for_public_key_and_hidden_puzzle_hash(
    public_key: &Bytes48,
    hidden_puzzle_hash: &Bytes32,
) -> Result<Bytes32, Error> {
    let synthetic_public_key = calculate_synthetic_public_key(public_key, hidden_puzzle_hash)?;
    puzzle_hash_for_synthetic_public_key(&synthetic_public_key)
}

pub fn puzzle_for_pk(public_key: &Bytes48) -> Result<Program, Error> {
    puzzle_for_public_key_and_hidden_puzzle_hash(public_key, &default_hidden_puzzle_hash()?)
}

pub fn puzzle_hash_for_pk(public_key: &Bytes48) -> Result<Bytes32, Error> {
    puzzle_hash_for_public_key_and_hidden_puzzle_hash(public_key, &default_hidden_puzzle_hash()?)
}

/// `(() delegated_puzzle solution)`
#[must_use]
pub fn solution_for_delegated_puzzle(delegated_puzzle: &Program, solution: &Program) -> Program {
    Program::to(vec![
        NULL.clone(),
        delegated_puzzle.to_sexp(),
        solution.to_sexp(),
    ])
}

#[must_use]
pub fn solution_for_hidden_puzzle(
    hidden_public_key: &Bytes48,
    hidden_puzzle: &Program,
    solution_to_hidden_puzzle: &Program,
) -> Program {
    Program::to(vec![
        hidden_public_key.to_sexp(),
        hidden_puzzle.to_sexp(),
        solution_to_hidden_puzzle.to_sexp(),
    ])
}

pub fn solution_for_conditions<T: IntoSExp>(conditions: T) -> Result<Program, Error> {
    let delegated_puzzle = puzzle_for_conditions(conditions)?;
    Ok(solution_for_delegated_puzzle(
        &delegated_puzzle,
        &Program::null(),
    ))
}
