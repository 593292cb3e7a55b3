use dg_wallet_core::clvm::program::Program;
use dg_wallet_core::clvm::sexp::IntoSExp;
use dg_wallet_core::clvm::utils::INFINITE_COST;
use once_cell::sync::OnceCell;
use std::io::Error;

pub const P2_CONDITIONS_HEX: &str = "ff04ffff0101ff0280";

static MOD: OnceCell<Program> = OnceCell::new();

pub fn p2_conditions_mod() -> Result<&'static Program, Error> {
    MOD.get_or_try_init(|| Program::from_hex(P2_CONDITIONS_HEX))
}

/// `(q . conditions)`, produced by running the pay to conditions mod.
pub fn puzzle_for_conditions<T: IntoSExp>(conditions: T) -> Result<Program, Error> {
    let (_cost, result) = p2_conditions_mod()?.run(INFINITE_COST, 0, &Program::to(vec![conditions]))?;
    Ok(result)
}

pub fn solution_for_conditions<T: IntoSExp>(conditions: T) -> Result<Program, Error> {
    Ok(Program::to(vec![
        puzzle_for_conditions(conditions)?.to_sexp(),
        0.to_sexp(),
    ]))
}
