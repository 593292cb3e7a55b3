use crate::blockchain::coin::Coin;
use crate::blockchain::condition_opcode::ConditionOpcode;
use crate::blockchain::sized_bytes::Bytes32;
use crate::clvm::program::{Program, SerializedProgram};
use crate::clvm::utils::INFINITE_COST;
use dg_wallet_macros::ChiaSerial;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::io::{Error, ErrorKind};

#[derive(ChiaSerial, Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct CoinSpend {
    pub coin: Coin,
    pub puzzle_reveal: SerializedProgram,
    pub solution: SerializedProgram,
}

impl CoinSpend {
    #[must_use]
    pub fn new(coin: Coin, puzzle_reveal: &Program, solution: &Program) -> Self {
        CoinSpend {
            coin,
            puzzle_reveal: puzzle_reveal.into(),
            solution: solution.into(),
        }
    }
    /// Runs the puzzle reveal against the solution.
    pub fn output(&self) -> Result<Program, Error> {
        let (_, output) = self
            .puzzle_reveal
            .run_with_cost(INFINITE_COST, &self.solution.to_program()?)?;
        Ok(output)
    }
    /// Coins created by this spend. An atom output creates nothing.
    pub fn additions(&self) -> Result<Vec<Coin>, Error> {
        let parent_coin_info = self.coin.coin_id();
        let output = self.output()?;
        let mut additions = vec![];
        if output.is_atom() {
            return Ok(additions);
        }
        for condition in output.as_list() {
            let atoms = condition.as_list();
            if atoms.len() < 3
                || ConditionOpcode::from(&atoms[0]) != ConditionOpcode::CreateCoin
                || !atoms[1].is_atom()
                || !atoms[2].is_atom()
            {
                continue;
            }
            let amount = atoms[2].as_int()?;
            // negative amounts are magic values such as the tail reveal marker
            let Some(amount) = amount.to_u64() else {
                continue;
            };
            additions.push(Coin {
                parent_coin_info,
                puzzle_hash: Bytes32::try_from(&atoms[1]).map_err(|e| {
                    Error::new(ErrorKind::InvalidData, format!("Invalid puzzle hash: {e}"))
                })?,
                amount,
            });
        }
        Ok(additions)
    }
}
