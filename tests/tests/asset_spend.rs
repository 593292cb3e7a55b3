#[cfg(test)]
mod tests {
    use blst::min_pk::Signature;
    use dg_wallet::asset::{AssetWallet, MAX_ANCESTRY_DEPTH};
    use dg_wallet::error::WalletError;
    use dg_wallet::sign::pkm_pairs;
    use dg_wallet_core::blockchain::coin::Coin;
    use dg_wallet_core::blockchain::coin_spend::CoinSpend;
    use dg_wallet_core::blockchain::sized_bytes::{Bytes32, SizedBytes};
    use dg_wallet_core::blockchain::spend_bundle::SpendBundle;
    use dg_wallet_core::clvm::bls_bindings::aggregate_verify_signature;
    use dg_wallet_core::clvm::program::Program;
    use dg_wallet_puzzles::puzzle_store::{PuzzleStore, CAT};
    use dg_wallet_tests::{key_store, options, MockFullnode};
    use std::sync::Arc;

    const DESTINATION: [u8; 32] = [0xEE; 32];

    /// Runs the curried inner puzzle with the inner solution and passes its conditions through.
    fn store() -> Arc<PuzzleStore> {
        let store = PuzzleStore::new().unwrap();
        store.register(CAT, Program::from_hex("ff02ff0bff1780").unwrap());
        Arc::new(store)
    }

    fn tail() -> Program {
        Program::from_hex("ff0180").unwrap()
    }

    fn origin() -> Coin {
        Coin {
            parent_coin_info: Bytes32::new(&[2u8; 32]),
            puzzle_hash: Bytes32::new(&[3u8; 32]),
            amount: 1000,
        }
    }

    async fn empty_wallet() -> (Arc<MockFullnode>, AssetWallet<MockFullnode>, CoinSpend) {
        let node = Arc::new(MockFullnode::default());
        node.add_coin(origin(), 1);
        let origin_spend = CoinSpend::new(origin(), &Program::null(), &Program::null());
        node.add_spend(origin_spend.clone(), 2);
        let mut wallet = AssetWallet::asset(
            node.clone(),
            key_store(4),
            store(),
            tail().tree_hash(),
            options(3),
        )
        .unwrap();
        wallet.sync(None).await.unwrap();
        (node, wallet, origin_spend)
    }

    /// Issues 1000 to the first address and confirms the eve spend. The fake asset mod does
    /// not wrap its outputs, so the wrapped coins are added to the node directly.
    async fn issued_wallet(amounts: &[u64]) -> (Arc<MockFullnode>, AssetWallet<MockFullnode>, CoinSpend) {
        let (node, mut wallet, origin_spend) = empty_wallet().await;
        let eve_spend = wallet
            .issue(&origin_spend, &tail(), &Program::null(), 1000)
            .await
            .unwrap();
        node.add_coin(eve_spend.coin, 2);
        node.add_spend(eve_spend.clone(), 3);
        let puzzle_hash = wallet.address(0).unwrap().puzzle.puzzle_hash;
        for amount in amounts {
            node.add_coin(
                Coin {
                    parent_coin_info: eve_spend.coin.name(),
                    puzzle_hash,
                    amount: *amount,
                },
                3,
            );
        }
        wallet.fetch_coin_records().await.unwrap();
        (node, wallet, eve_spend)
    }

    fn solution(coin_spend: &CoinSpend) -> Vec<Program> {
        coin_spend.solution.to_program().unwrap().as_list()
    }

    #[tokio::test]
    async fn test_issue_pays_fresh_address() {
        let (_node, mut wallet, origin_spend) = empty_wallet().await;
        let eve_spend = wallet
            .issue(&origin_spend, &tail(), &Program::null(), 1000)
            .await
            .unwrap();
        assert_eq!(eve_spend.coin.parent_coin_info, origin().name());
        let additions = eve_spend.additions().unwrap();
        assert_eq!(additions.len(), 1);
        assert_eq!(
            additions[0].puzzle_hash,
            wallet.address(0).unwrap().puzzle.inner_puzzle.tree_hash()
        );
        assert_eq!(additions[0].amount, 1000);
        let solution = solution(&eve_spend);
        assert_eq!(solution[1], Program::null());
        assert_eq!(Bytes32::try_from(&solution[2]).unwrap(), eve_spend.coin.name());

        let other_tail = Program::from_hex("ff01ff0180").unwrap();
        assert!(matches!(
            wallet.issue(&origin_spend, &other_tail, &Program::null(), 1).await,
            Err(WalletError::MixedAssetIds)
        ));
    }

    #[tokio::test]
    async fn test_find_tail_walks_to_eve() {
        let (node, mut wallet, _) = issued_wallet(&[1000]).await;
        assert_eq!(wallet.find_tail().await.unwrap(), Some(tail()));
        node.set_stalled(true);
        assert_eq!(wallet.find_tail().await.unwrap(), Some(tail()));
    }

    #[tokio::test]
    async fn test_find_tail_without_coins() {
        let (_node, mut wallet, _) = empty_wallet().await;
        assert_eq!(wallet.find_tail().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_coin_without_asset_parent() {
        let (node, mut wallet, _) = empty_wallet().await;
        node.add_coin(
            Coin {
                parent_coin_info: origin().name(),
                puzzle_hash: wallet.address(0).unwrap().puzzle.puzzle_hash,
                amount: 10,
            },
            3,
        );
        wallet.fetch_coin_records().await.unwrap();
        assert!(matches!(
            wallet.find_tail().await,
            Err(WalletError::GenesisNotFound)
        ));
        assert!(matches!(
            wallet.send(&Bytes32::new(&DESTINATION), 5).await,
            Err(WalletError::NotAssetToken)
        ));
    }

    #[tokio::test]
    async fn test_spent_eve_without_asset_puzzle() {
        let (node, mut wallet, _) = empty_wallet().await;
        let coin = Coin {
            parent_coin_info: origin().name(),
            puzzle_hash: wallet.address(0).unwrap().puzzle.puzzle_hash,
            amount: 10,
        };
        node.add_coin(coin, 3);
        node.add_spend(CoinSpend::new(coin, &Program::null(), &Program::null()), 4);
        wallet.fetch_coin_records().await.unwrap();
        assert!(matches!(
            wallet.find_tail().await,
            Err(WalletError::EveNotAssetToken)
        ));
    }

    #[tokio::test]
    async fn test_find_tail_stops_on_repeated_ancestor() {
        let (node, mut wallet, _) = empty_wallet().await;
        let puzzle = wallet.address(0).unwrap().puzzle.puzzle.clone();
        let coin = Coin {
            parent_coin_info: Bytes32::new(&[5u8; 32]),
            puzzle_hash: puzzle.tree_hash(),
            amount: 10,
        };
        node.add_coin(coin, 3);
        node.add_spend(CoinSpend::new(coin, &puzzle, &Program::null()), 4);
        wallet.fetch_coin_records().await.unwrap();
        let record = wallet.coin_records().next().cloned().unwrap();
        assert_eq!(record.coin, coin);
        // the node reports the coin as its own parent
        node.misreport(coin.parent_coin_info, record);
        let queries = node.queries();
        assert!(matches!(
            wallet.find_tail().await,
            Err(WalletError::AncestryTooDeep(MAX_ANCESTRY_DEPTH))
        ));
        assert_eq!(node.queries() - queries, 2);
    }

    #[tokio::test]
    async fn test_find_tail_gives_up_past_max_depth() {
        let (node, mut wallet, _) = empty_wallet().await;
        let puzzle = wallet.address(0).unwrap().puzzle.puzzle.clone();
        let mut chain = vec![Coin {
            parent_coin_info: Bytes32::new(&[5u8; 32]),
            puzzle_hash: puzzle.tree_hash(),
            amount: 1,
        }];
        for _ in 0..MAX_ANCESTRY_DEPTH {
            let parent = chain[chain.len() - 1];
            chain.push(Coin {
                parent_coin_info: parent.name(),
                ..parent
            });
        }
        // the tip is tracked first so the walk starts there
        for coin in chain.iter().rev() {
            node.add_coin(*coin, 3);
        }
        for coin in &chain[..MAX_ANCESTRY_DEPTH] {
            node.add_spend(CoinSpend::new(*coin, &puzzle, &Program::null()), 4);
        }
        wallet.fetch_coin_records().await.unwrap();
        assert_eq!(
            wallet.coin_records().next().map(|r| r.coin),
            chain.last().copied()
        );
        assert!(matches!(
            wallet.find_tail().await,
            Err(WalletError::AncestryTooDeep(MAX_ANCESTRY_DEPTH))
        ));
    }

    #[tokio::test]
    async fn test_send_builds_signed_ring() {
        let (_node, mut wallet, eve_spend) = issued_wallet(&[1000]).await;
        let destination = Bytes32::new(&DESTINATION);
        let spends = wallet.send(&destination, 400).await.unwrap();
        assert_eq!(spends.len(), 1);
        let address = wallet.address(0).unwrap();
        assert_eq!(spends[0].puzzle_reveal.to_program().unwrap(), address.puzzle.puzzle);
        assert_eq!(spends[0].coin.puzzle_hash, address.puzzle.puzzle_hash);

        let solution = solution(&spends[0]);
        assert_eq!(solution.len(), 7);
        let lineage = solution[1].as_list();
        assert_eq!(Bytes32::try_from(&lineage[0]).unwrap(), origin().name());
        assert_eq!(u64::try_from(&lineage[2]).unwrap(), 1000);
        assert_eq!(spends[0].coin.parent_coin_info, eve_spend.coin.name());
        assert_eq!(Bytes32::try_from(&solution[2]).unwrap(), spends[0].coin.name());

        let additions = spends[0].additions().unwrap();
        assert_eq!(additions.len(), 2);
        assert_eq!((additions[0].puzzle_hash, additions[0].amount), (destination, 400));
        assert_eq!(
            additions[1].puzzle_hash,
            wallet.address(1).unwrap().puzzle.inner_puzzle.tree_hash()
        );
        assert_eq!(additions[1].amount, 600);

        let extra = [0xAB; 32];
        let signed = wallet
            .sign_spend(
                &SpendBundle {
                    coin_spends: spends.clone(),
                    ..SpendBundle::empty()
                },
                &extra,
            )
            .unwrap();
        let pairs = pkm_pairs(&spends[0], &extra).unwrap();
        let keys: Vec<_> = pairs.iter().map(|(pk, _)| pk).collect();
        let msgs: Vec<&[u8]> = pairs.iter().map(|(_, m)| m.as_slice()).collect();
        let signature = Signature::try_from(&signed.aggregated_signature).unwrap();
        assert!(aggregate_verify_signature(&keys, &msgs, &signature).unwrap());
    }

    #[tokio::test]
    async fn test_send_links_ring_of_coins() {
        let (_node, mut wallet, _) = issued_wallet(&[700, 500]).await;
        let spends = wallet.send(&Bytes32::new(&DESTINATION), 1100).await.unwrap();
        assert_eq!(spends.len(), 2);
        let inner_puzzle_hash = wallet.address(0).unwrap().puzzle.inner_puzzle.tree_hash();
        for (i, spend) in spends.iter().enumerate() {
            let other = &spends[1 - i];
            let solution = solution(spend);
            assert_eq!(Bytes32::try_from(&solution[2]).unwrap(), other.coin.name());
            let next = solution[4].as_list();
            assert_eq!(Bytes32::try_from(&next[0]).unwrap(), other.coin.parent_coin_info);
            assert_eq!(Bytes32::try_from(&next[1]).unwrap(), inner_puzzle_hash);
            assert_eq!(u64::try_from(&next[2]).unwrap(), other.coin.amount);
        }
        assert_eq!(spends[1].additions().unwrap(), vec![]);
        assert!(matches!(
            wallet.send(&Bytes32::new(&DESTINATION), 5000).await,
            Err(WalletError::InsufficientFunds)
        ));
    }
}
