#[cfg(test)]
mod tests {
    use blst::min_pk::Signature;
    use dg_wallet::error::WalletError;
    use dg_wallet::options::WalletOptions;
    use dg_wallet::sign::pkm_pairs;
    use dg_wallet::standard::{StandardPuzzles, StandardWallet};
    use dg_wallet::wallet::WalletKind;
    use dg_wallet_core::blockchain::coin::Coin;
    use dg_wallet_core::blockchain::coin_spend::CoinSpend;
    use dg_wallet_core::blockchain::sized_bytes::{Bytes32, SizedBytes};
    use dg_wallet_core::blockchain::spend_bundle::SpendBundle;
    use dg_wallet_core::blockchain::tx_status::TXStatus;
    use dg_wallet_core::clvm::bls_bindings::aggregate_verify_signature;
    use dg_wallet_core::clvm::program::Program;
    use dg_wallet_tests::{key_store, options, MockFullnode};
    use simple_logger::SimpleLogger;
    use std::sync::Arc;

    const DESTINATION: [u8; 32] = [0xDD; 32];
    const EXTRA_DATA: [u8; 32] = [0xCC; 32];

    async fn funded_wallet(
        amount: u64,
        options: WalletOptions,
    ) -> (Arc<MockFullnode>, StandardWallet<MockFullnode>) {
        let _ = SimpleLogger::new().env().init();
        let node = Arc::new(MockFullnode::default());
        let mut store = key_store(3);
        store.generate(1).unwrap();
        let puzzle_hash = StandardPuzzles::new()
            .unwrap()
            .create_puzzle(&store.keys()[0])
            .unwrap()
            .puzzle_hash;
        node.add_coin(
            Coin {
                parent_coin_info: Bytes32::new(&[1u8; 32]),
                puzzle_hash,
                amount,
            },
            1,
        );
        let mut wallet = StandardWallet::standard(node.clone(), key_store(3), options).unwrap();
        wallet.sync(None).await.unwrap();
        (node, wallet)
    }

    fn bundle(coin_spends: Vec<CoinSpend>) -> SpendBundle {
        SpendBundle {
            coin_spends,
            ..SpendBundle::empty()
        }
    }

    #[tokio::test]
    async fn test_send_pays_destination_and_change() {
        let (_node, mut wallet) = funded_wallet(1000, options(3)).await;
        assert_eq!(wallet.addresses().len(), 4);
        let destination = Bytes32::new(&DESTINATION);
        let spends = wallet.send(&destination, 600, 50).await.unwrap();
        assert_eq!(spends.len(), 1);
        assert_eq!(
            spends[0].puzzle_reveal.to_program().unwrap(),
            wallet.address(0).unwrap().puzzle.puzzle
        );
        let additions = spends[0].additions().unwrap();
        assert_eq!(additions.len(), 2);
        assert_eq!((additions[0].puzzle_hash, additions[0].amount), (destination, 600));
        let change = wallet.address(1).unwrap().puzzle.puzzle_hash;
        assert_eq!((additions[1].puzzle_hash, additions[1].amount), (change, 350));
    }

    #[tokio::test]
    async fn test_exact_send_has_no_change() {
        let (_node, mut wallet) = funded_wallet(1000, options(3)).await;
        let spends = wallet.send(&Bytes32::new(&DESTINATION), 990, 10).await.unwrap();
        let additions = spends[0].additions().unwrap();
        assert_eq!(additions.len(), 1);
        assert_eq!(additions[0].amount, 990);
        assert!(matches!(
            wallet.send(&Bytes32::new(&DESTINATION), 1000, 1).await,
            Err(WalletError::InsufficientFunds)
        ));
    }

    #[tokio::test]
    async fn test_signed_send_verifies() {
        let (_node, mut wallet) = funded_wallet(1000, options(3)).await;
        let spends = wallet.send(&Bytes32::new(&DESTINATION), 100, 0).await.unwrap();
        let signed = wallet.sign_spend(&bundle(spends.clone()), &EXTRA_DATA).unwrap();
        let pairs = pkm_pairs(&spends[0], &EXTRA_DATA).unwrap();
        assert_eq!(pairs.len(), 1);
        let keys: Vec<_> = pairs.iter().map(|(pk, _)| pk).collect();
        let msgs: Vec<&[u8]> = pairs.iter().map(|(_, m)| m.as_slice()).collect();
        let signature = Signature::try_from(&signed.aggregated_signature).unwrap();
        assert!(aggregate_verify_signature(&keys, &msgs, &signature).unwrap());
    }

    #[tokio::test]
    async fn test_complete_spend_reconciles_artificial_records() {
        let (node, mut wallet) = funded_wallet(1000, options(3)).await;
        let spends = wallet.send(&Bytes32::new(&DESTINATION), 600, 50).await.unwrap();
        let signed = wallet.sign_spend(&bundle(spends), &EXTRA_DATA).unwrap();
        wallet.complete_spend(&signed).await.unwrap();
        assert_eq!(node.pushed(), vec![signed.clone()]);
        assert_eq!(wallet.artificial_coin_records().len(), 1);
        let change = wallet.address(1).unwrap();
        assert_eq!(change.coin_records.len(), 1);
        assert_eq!(change.coin_records[0].confirmed_block_index, 0);
        assert_eq!(wallet.balance(), 1350);

        node.confirm(&signed, 2);
        wallet.fetch_coin_records().await.unwrap();
        let change = wallet.address(1).unwrap();
        assert_eq!(change.coin_records.len(), 1);
        assert_eq!(change.coin_records[0].confirmed_block_index, 2);
        assert_eq!(wallet.balance(), 350);
        assert!(wallet.artificial_coin_records().is_empty());

        let spends = wallet.send_fee(100).await.unwrap();
        let additions = spends[0].additions().unwrap();
        assert_eq!(additions.len(), 1);
        assert_eq!(additions[0].amount, 250);
        assert_eq!(additions[0].puzzle_hash, wallet.address(2).unwrap().puzzle.puzzle_hash);
    }

    #[tokio::test]
    async fn test_outside_payments_are_not_tracked() {
        let (node, mut wallet) = funded_wallet(10_000, options(3)).await;
        for height in 2..5 {
            let spends = wallet.send(&Bytes32::new(&DESTINATION), 10, 0).await.unwrap();
            let bundle = bundle(spends);
            wallet.complete_spend(&bundle).await.unwrap();
            assert_eq!(wallet.artificial_coin_records().len(), 1);
            node.confirm(&bundle, height);
            wallet.fetch_coin_records().await.unwrap();
            assert!(wallet.artificial_coin_records().is_empty());
        }
        assert_eq!(wallet.balance(), 9_970);
    }

    #[tokio::test]
    async fn test_malformed_output_after_push_is_skipped() {
        let (node, mut wallet) = funded_wallet(1000, options(3)).await;
        let mut spends = wallet.send(&Bytes32::new(&DESTINATION), 600, 50).await.unwrap();
        let short_puzzle_hash =
            Program::from_hex(&format!("ff01ffff33ff9f{}ff0a8080", "ab".repeat(31))).unwrap();
        spends.push(CoinSpend::new(
            Coin {
                parent_coin_info: Bytes32::new(&[7u8; 32]),
                puzzle_hash: short_puzzle_hash.tree_hash(),
                amount: 10,
            },
            &short_puzzle_hash,
            &Program::null(),
        ));
        let bundle = bundle(spends);
        assert!(bundle.additions().is_err());
        wallet.complete_spend(&bundle).await.unwrap();
        assert_eq!(node.pushed().len(), 1);
        assert_eq!(wallet.artificial_coin_records().len(), 1);
        assert_eq!(wallet.balance(), 1350);
    }

    #[tokio::test]
    async fn test_clear_unconfirmed_drops_pending_change() {
        let (node, mut wallet) = funded_wallet(1000, options(3)).await;
        let spends = wallet.send(&Bytes32::new(&DESTINATION), 600, 50).await.unwrap();
        wallet.complete_spend(&bundle(spends)).await.unwrap();
        assert_eq!(wallet.artificial_coin_records().len(), 1);
        wallet.clear_unconfirmed_transactions().await.unwrap();
        assert!(wallet.artificial_coin_records().is_empty());
        assert_eq!(wallet.balance(), 1000);
        assert_eq!(node.pushed().len(), 1);
    }

    #[tokio::test]
    async fn test_pending_push_counts_as_success() {
        let (node, mut wallet) = funded_wallet(1000, options(3)).await;
        node.set_push_status(TXStatus::PENDING);
        let spends = wallet.send(&Bytes32::new(&DESTINATION), 10, 0).await.unwrap();
        wallet.complete_spend(&bundle(spends)).await.unwrap();
        assert_eq!(node.pushed().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_push_records_nothing() {
        let (node, mut wallet) = funded_wallet(1000, options(3)).await;
        node.set_push_status(TXStatus::FAILED);
        let spends = wallet.send(&Bytes32::new(&DESTINATION), 10, 0).await.unwrap();
        assert!(matches!(
            wallet.complete_spend(&bundle(spends)).await,
            Err(WalletError::PushTx)
        ));
        assert!(node.pushed().is_empty());
        assert!(wallet.artificial_coin_records().is_empty());
    }

    #[tokio::test]
    async fn test_instant_records_disabled() {
        let (node, mut wallet) = funded_wallet(
            1000,
            WalletOptions {
                instant_coin_records: false,
                ..options(3)
            },
        )
        .await;
        let spends = wallet.send(&Bytes32::new(&DESTINATION), 10, 0).await.unwrap();
        wallet.complete_spend(&bundle(spends)).await.unwrap();
        assert_eq!(node.pushed().len(), 1);
        assert!(wallet.artificial_coin_records().is_empty());
        assert_eq!(wallet.balance(), 1000);
    }

    #[tokio::test]
    async fn test_cancelled_push_is_not_a_rejection() {
        let (node, mut wallet) = funded_wallet(1000, options(3)).await;
        let spends = wallet.send(&Bytes32::new(&DESTINATION), 10, 0).await.unwrap();
        node.set_stalled(true);
        wallet.cancellation_token().cancel();
        assert!(matches!(
            wallet.complete_spend(&bundle(spends)).await,
            Err(WalletError::Cancelled)
        ));
    }
}
