use crate::puzzle_store::{PuzzleStore, CAT};
use crate::utils::{make_create_coin_condition, make_tail_reveal_condition};
use dg_wallet_core::blockchain::sized_bytes::Bytes32;
use dg_wallet_core::clvm::program::Program;
use std::io::Error;

/// Curried arguments of an asset token puzzle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatArgs {
    pub mod_hash: Bytes32,
    pub asset_id: Bytes32,
    pub inner_puzzle: Program,
}

/// The asset token mod curried with `(mod_hash, asset_id, inner_puzzle)`.
pub fn cat_puzzle(store: &PuzzleStore, asset_id: &Bytes32, inner_puzzle: &Program) -> Result<Program, Error> {
    let cat = store.get(CAT)?;
    let mod_hash = cat.tree_hash();
    Ok(cat.curry(&[mod_hash.into(), asset_id.into(), inner_puzzle.clone()]))
}

/// Curried arguments of `puzzle` when it is built on the asset token mod, `None` otherwise.
pub fn uncurry_cat(store: &PuzzleStore, puzzle: &Program) -> Result<Option<Vec<Program>>, Error> {
    let cat = store.get(CAT)?;
    Ok(match puzzle.uncurry() {
        Some((module, args)) if module == cat => Some(args),
        _ => None,
    })
}

/// Parses all three asset token arguments, `None` when `puzzle` is not a well formed asset token.
pub fn match_cat_puzzle(store: &PuzzleStore, puzzle: &Program) -> Result<Option<CatArgs>, Error> {
    let Some(args) = uncurry_cat(store, puzzle)? else {
        return Ok(None);
    };
    let [mod_hash, asset_id, inner_puzzle] = args.as_slice() else {
        return Ok(None);
    };
    Ok(Some(CatArgs {
        mod_hash: Bytes32::try_from(mod_hash)?,
        asset_id: Bytes32::try_from(asset_id)?,
        inner_puzzle: inner_puzzle.clone(),
    }))
}

/// `(q . ((51 0 -113 tail tail_solution) (51 inner_puzzle_hash amount (inner_puzzle_hash))))`
///
/// Inner puzzle of an eve coin. It reveals the tail and pays the issued amount to `inner_puzzle_hash`.
#[must_use]
pub fn issuance_payment_puzzle(
    tail: &Program,
    tail_solution: &Program,
    inner_puzzle_hash: Bytes32,
    amount: u64,
) -> Program {
    let conditions = Program::to(vec![
        make_tail_reveal_condition(tail, tail_solution),
        make_create_coin_condition(inner_puzzle_hash, amount, &[inner_puzzle_hash]),
    ]);
    Program::to((1u8, conditions))
}
