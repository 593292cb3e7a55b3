use crate::blockchain::sized_bytes::{Bytes32, SizedBytes};
use crate::clvm::dialect::{APPLY_KW, QUOTE_KW};
use crate::clvm::program::Program;
use crate::clvm::sexp::{IntoSExp, SExp};
use dg_wallet_serialize::hash_all;
use once_cell::sync::Lazy;

const CONS_KW: u8 = 4;

static Q_KW_TREEHASH: Lazy<Bytes32> = Lazy::new(|| atom_hash(&[QUOTE_KW]));
static A_KW_TREEHASH: Lazy<Bytes32> = Lazy::new(|| atom_hash(&[APPLY_KW]));
static C_KW_TREEHASH: Lazy<Bytes32> = Lazy::new(|| atom_hash(&[CONS_KW]));
static NULL_TREEHASH: Lazy<Bytes32> = Lazy::new(|| atom_hash(&[]));

fn atom_hash(atom: &[u8]) -> Bytes32 {
    Bytes32::new(&hash_all([&[1u8][..], atom]))
}

fn pair_hash(first: &Bytes32, rest: &Bytes32) -> Bytes32 {
    Bytes32::new(&hash_all([&[2u8][..], first.as_slice(), rest.as_slice()]))
}

fn list_hash(items: &[&Bytes32]) -> Bytes32 {
    items
        .iter()
        .rev()
        .fold(*NULL_TREEHASH, |rest, item| pair_hash(item, &rest))
}

/// Builds `(a (q . program) (c (q . arg1) (c (q . arg2) ... 1)))`.
pub fn curry(program: &Program, args: &[Program]) -> Program {
    let mut fixed_args = 1u8.to_sexp();
    for arg in args.iter().rev() {
        fixed_args = vec![
            CONS_KW.to_sexp(),
            (QUOTE_KW.to_sexp(), arg.sexp.clone()).to_sexp(),
            fixed_args,
        ]
        .to_sexp();
    }
    Program::to(vec![
        APPLY_KW.to_sexp(),
        (QUOTE_KW.to_sexp(), program.sexp.clone()).to_sexp(),
        fixed_args,
    ])
}

fn is_atom_byte(sexp: &SExp, value: u8) -> bool {
    matches!(sexp.atom(), Ok(atom) if atom.data == [value])
}

fn unquote(sexp: &SExp) -> Option<&SExp> {
    let (kw, body) = sexp.split().ok()?;
    is_atom_byte(kw, QUOTE_KW).then_some(body)
}

/// Inverse of [`curry`]. Returns `None` when the program is not in curried form.
pub fn uncurry(program: &Program) -> Option<(Program, Vec<Program>)> {
    let items = program.sexp.proper_list()?;
    if items.len() != 3 || !is_atom_byte(&items[0], APPLY_KW) {
        return None;
    }
    let module = unquote(&items[1])?;
    let mut args = Vec::new();
    let mut current = &items[2];
    while !is_atom_byte(current, 1) {
        let (kw, rest) = current.split().ok()?;
        if !is_atom_byte(kw, CONS_KW) {
            return None;
        }
        let (quoted_arg, rest) = rest.split().ok()?;
        let (next, terminator) = rest.split().ok()?;
        if terminator.non_nil() {
            return None;
        }
        args.push(Program::to(unquote(quoted_arg)?));
        current = next;
    }
    Some((Program::to(module), args))
}

/// Tree hash of `(q . mod)` given the hash of `mod`.
pub fn calculate_hash_of_quoted_mod_hash(mod_hash: &Bytes32) -> Bytes32 {
    pair_hash(&Q_KW_TREEHASH, mod_hash)
}

/// Tree hash of a curried program computed from hashes alone.
pub fn curry_and_treehash(quoted_mod_hash: &Bytes32, arg_hashes: &[Bytes32]) -> Bytes32 {
    let mut curried_values = *Q_KW_TREEHASH; // atom 1 shares the quote keyword hash
    for arg_hash in arg_hashes.iter().rev() {
        let quoted_arg = pair_hash(&Q_KW_TREEHASH, arg_hash);
        curried_values = list_hash(&[&C_KW_TREEHASH, &quoted_arg, &curried_values]);
    }
    list_hash(&[&A_KW_TREEHASH, quoted_mod_hash, &curried_values])
}
