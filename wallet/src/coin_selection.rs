use crate::error::WalletError;
use dg_wallet_core::blockchain::coin_record::CoinRecord;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinSelection {
    Smallest,
    Largest,
    Newest,
    #[default]
    Oldest,
}

/// Greedily takes spendable records in `selection` order until both `amount` and
/// `minimum_coin_records` are met. Sorting is stable, so ties keep their bucket order.
pub fn select_coin_records<'a, I>(
    records: I,
    amount: u64,
    selection: CoinSelection,
    minimum_coin_records: usize,
    required: bool,
) -> Result<Vec<CoinRecord>, WalletError>
where
    I: IntoIterator<Item = &'a CoinRecord>,
{
    let mut viable: Vec<&CoinRecord> = records
        .into_iter()
        .filter(|r| r.is_spendable())
        .collect();
    match selection {
        CoinSelection::Smallest => viable.sort_by_key(|r| r.coin.amount),
        CoinSelection::Largest => viable.sort_by(|a, b| b.coin.amount.cmp(&a.coin.amount)),
        CoinSelection::Newest => viable.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        CoinSelection::Oldest => viable.sort_by_key(|r| r.timestamp),
    }
    let mut selected = vec![];
    let mut total: u128 = 0;
    for record in viable {
        if total >= u128::from(amount) && selected.len() >= minimum_coin_records {
            break;
        }
        total += u128::from(record.coin.amount);
        selected.push(record.clone());
    }
    if selected.len() < minimum_coin_records {
        return Err(WalletError::InsufficientCoinRecords);
    }
    if required && total < u128::from(amount) {
        return Err(WalletError::InsufficientFunds);
    }
    Ok(selected)
}
