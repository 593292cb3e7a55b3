#[cfg(test)]
mod tests {
    use dg_wallet::error::WalletError;
    use dg_wallet::standard::{StandardPuzzles, StandardWallet};
    use dg_wallet::wallet::WalletKind;
    use dg_wallet::options::WalletOptions;
    use dg_wallet_core::blockchain::coin::Coin;
    use dg_wallet_core::blockchain::sized_bytes::{Bytes32, SizedBytes};
    use dg_wallet_keys::key_store::{KeyStore, RootKey};
    use dg_wallet_logger::DruidGardenLogger;
    use log::Level;
    use dg_wallet_tests::{key_store, options, secret_key, MockFullnode};
    use std::sync::Arc;
    use std::time::Duration;

    fn puzzle_hash(seed: u8, index: usize) -> Bytes32 {
        let mut store = key_store(seed);
        store.generate(index + 1).unwrap();
        StandardPuzzles::new()
            .unwrap()
            .create_puzzle(&store.keys()[index])
            .unwrap()
            .puzzle_hash
    }

    fn fund(node: &MockFullnode, puzzle_hash: Bytes32, seed: u8, amount: u64) {
        node.add_coin(
            Coin {
                parent_coin_info: Bytes32::new(&[seed; 32]),
                puzzle_hash,
                amount,
            },
            1,
        );
    }

    fn wallet(node: &Arc<MockFullnode>, options: WalletOptions) -> StandardWallet<MockFullnode> {
        StandardWallet::standard(node.clone(), key_store(1), options).unwrap()
    }

    #[tokio::test]
    async fn test_sync_keeps_gap_limit() {
        let node = Arc::new(MockFullnode::default());
        fund(&node, puzzle_hash(1, 2), 7, 1000);
        let mut wallet = wallet(&node, options(3));
        wallet.sync(None).await.unwrap();
        assert_eq!(wallet.addresses().len(), 6);
        assert_eq!(wallet.address(2).unwrap().coin_records.len(), 1);
        assert!(wallet.addresses()[3..].iter().all(|a| a.is_unused()));
        assert_eq!(wallet.balance(), 1000);
    }

    #[tokio::test]
    async fn test_min_and_max_address_count() {
        let node = Arc::new(MockFullnode::default());
        let mut wallet = wallet(
            &node,
            WalletOptions {
                min_address_count: 5,
                unused_address_count: 1,
                ..Default::default()
            },
        );
        wallet.sync(None).await.unwrap();
        assert_eq!(wallet.addresses().len(), 5);

        let mut bounded = StandardWallet::standard(node.clone(), key_store(2), options(10)).unwrap();
        bounded
            .sync(Some(WalletOptions {
                max_address_count: 2,
                ..options(10)
            }))
            .await
            .unwrap();
        assert_eq!(bounded.addresses().len(), 2);
    }

    #[tokio::test]
    async fn test_resync_extends_past_new_coins() {
        let node = Arc::new(MockFullnode::default());
        let mut wallet = wallet(&node, options(3));
        wallet.sync(None).await.unwrap();
        assert_eq!(wallet.addresses().len(), 3);
        fund(&node, puzzle_hash(1, 2), 8, 50);
        wallet.sync(None).await.unwrap();
        assert_eq!(wallet.addresses().len(), 3);
        assert!(!wallet.address(2).unwrap().is_unused());
        wallet.sync(None).await.unwrap();
        assert_eq!(wallet.addresses().len(), 6);
        let indices: Vec<u32> = wallet.addresses().iter().map(|a| a.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_find_unused_indices_resyncs_once() {
        let node = Arc::new(MockFullnode::default());
        let mut wallet = wallet(&node, options(3));
        wallet.sync(None).await.unwrap();
        let mut used = vec![];
        let found = wallet.find_unused_indices(5, &mut used, false).await.unwrap();
        assert_eq!(found, vec![0, 1, 2, 3, 4]);
        assert_eq!(used, found);
        assert_eq!(wallet.addresses().len(), 5);
        assert_eq!(wallet.options().unused_address_count, 3);
        assert!(matches!(
            wallet.find_unused_indices(1, &mut used, true).await,
            Err(WalletError::UnusedIndices)
        ));
    }

    #[tokio::test]
    async fn test_sync_cancelled_leaves_addresses_untouched() {
        let node = Arc::new(MockFullnode::default());
        let mut wallet = wallet(&node, options(3));
        node.set_stalled(true);
        let token = wallet.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });
        assert!(matches!(wallet.sync(None).await, Err(WalletError::Cancelled)));
        assert!(wallet.addresses().is_empty());
        assert_eq!(node.queries(), 1);
    }

    #[tokio::test]
    async fn test_hardened_watch_only_wallet_cannot_sync() {
        let node = Arc::new(MockFullnode::default());
        let store = KeyStore::new(RootKey::Public(secret_key(1).sk_to_pk()), true);
        let mut wallet = StandardWallet::standard(node, store, options(3)).unwrap();
        assert!(matches!(
            wallet.sync(None).await,
            Err(WalletError::HardenedWithoutPrivateKey)
        ));
    }

    #[tokio::test]
    async fn test_watch_only_wallet_tracks_same_addresses() {
        let node = Arc::new(MockFullnode::default());
        fund(&node, puzzle_hash(1, 0), 9, 20);
        let store = KeyStore::new(RootKey::Public(secret_key(1).sk_to_pk()), false);
        let mut watch_only = StandardWallet::standard(node.clone(), store, options(2)).unwrap();
        watch_only.sync(None).await.unwrap();
        let mut full = wallet(&node, options(2));
        full.sync(None).await.unwrap();
        assert_eq!(watch_only.balance(), 20);
        let hashes = |w: &StandardWallet<MockFullnode>| -> Vec<Bytes32> {
            w.addresses().iter().map(|a| a.puzzle.puzzle_hash).collect()
        };
        assert_eq!(hashes(&watch_only), hashes(&full));
    }

    #[tokio::test]
    async fn test_sync_logs_progress() {
        let logger = DruidGardenLogger::build()
            .current_level(Level::Debug)
            .quiet_transport()
            .init()
            .unwrap();
        let mut events = logger.subscribe();
        let node = Arc::new(MockFullnode::default());
        let mut wallet = StandardWallet::standard(node, key_store(5), options(2)).unwrap();
        wallet.sync(None).await.unwrap();
        let mut messages = vec![];
        while let Ok(event) = events.try_recv() {
            if event.target == "dg_wallet::wallet" {
                messages.push(event.message);
            }
        }
        assert!(messages.iter().any(|m| m == "Derived 2 keys, 2 unused at the tail"));
    }
}
