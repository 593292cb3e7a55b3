use dg_wallet_core::blockchain::condition_opcode::ConditionOpcode;
use dg_wallet_core::blockchain::sized_bytes::{Bytes32, Bytes48};
use dg_wallet_core::clvm::program::Program;
use dg_wallet_core::clvm::sexp::{AtomBuf, IntoSExp, SExp};

/// Amount used by the create coin condition that reveals an asset token tail.
pub const TAIL_MARKER_AMOUNT: i64 = -113;

pub fn make_create_coin_condition(puzzle_hash: Bytes32, amount: u64, memos: &[Bytes32]) -> Program {
    if memos.is_empty() {
        Program::to(vec![
            ConditionOpcode::CreateCoin.to_sexp(),
            puzzle_hash.to_sexp(),
            amount.to_sexp(),
        ])
    } else {
        Program::to(vec![
            ConditionOpcode::CreateCoin.to_sexp(),
            puzzle_hash.to_sexp(),
            amount.to_sexp(),
            memos.to_sexp(),
        ])
    }
}

/// `(51 0 -113 tail tail_solution)`
pub fn make_tail_reveal_condition(tail: &Program, tail_solution: &Program) -> Program {
    Program::to(vec![
        ConditionOpcode::CreateCoin.to_sexp(),
        0u8.to_sexp(),
        TAIL_MARKER_AMOUNT.to_sexp(),
        tail.to_sexp(),
        tail_solution.to_sexp(),
    ])
}

pub fn make_agg_sig_unsafe_condition(public_key: &Bytes48, message: &[u8]) -> Program {
    Program::to(vec![
        ConditionOpcode::AggSigUnsafe.to_sexp(),
        public_key.to_sexp(),
        SExp::Atom(AtomBuf::new(message.to_vec())),
    ])
}

pub fn make_agg_sig_me_condition(public_key: &Bytes48, message: &[u8]) -> Program {
    Program::to(vec![
        ConditionOpcode::AggSigMe.to_sexp(),
        public_key.to_sexp(),
        SExp::Atom(AtomBuf::new(message.to_vec())),
    ])
}
