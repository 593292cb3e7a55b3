#[cfg(test)]
mod tests {
    use blst::min_pk::SecretKey;
    use dg_wallet_core::blockchain::sized_bytes::{Bytes32, Bytes48, SizedBytes};
    use dg_wallet_keys::key_store::{KeyStore, RootKey};
    use dg_wallet_keys::master_pk_to_wallet_pk_unhardened;
    use dg_wallet_puzzles::p2_delegated_puzzle_or_hidden_puzzle::{
        calculate_synthetic_public_key, calculate_synthetic_secret_key,
        default_hidden_puzzle_hash,
    };

    const ROOT_SECRET_KEY: &str =
        "6bb19282e27bc6e7e397fb19efc2627a412410fdfd13bf14f4ce5bfdce084c71";

    const SYNTHETIC_PUBLIC_KEYS: [&str; 16] = [
        "b0c8cf08fdbe7fdb7bb1795740153b944c32364b100c372a05833554cb97794563b096cb5f57bfa09f38d7aebb48704e",
        "8b1b92da63fdf8c4b53349da2fdd84685303587653f1a75826a56a97ea50b86ca8a0fbf6a5d6605c70b6be324bc59c85",
        "a472c01f0b32457aea348ef0493e1d394445df528e0d4139056ba6b4eb57eed593732c830acd897dab502f119d1ae2ff",
        "8b9e4040514e55110cd899b43a5fb8fa6f74e28620f80d20401101f88a77624128c818238073f618b72065a7a7264402",
        "ac334afc58318068c6ec2daffb336cedc8a01d382e87852c62846fa17f9249c8b0896d1c09a26c80ec945f93002d0ff4",
        "8d63ad4f29c7f163f6742f41bb3dc08ea6975ecad0b76324545e6154d89370a695b9ae803bc65c3384d8557f3de67a40",
        "b5d5540d7e5721688fa7876a49028135d42b67a0e73c257463f01775b1c973b6161973608469b3a42b20b0392aeca46c",
        "92fd0374247c22e2deaaccd844dc152b87a736d4df531fa94fdd04948295310c21a2fbe5ff6b25e12ae12afcc90716d8",
        "adda2cfe848768537074e91f4e08136fe85e7315e326063c6945314492e1eb6903911176dcbdb84637d49a26afbf5437",
        "b0d252b37fc5b50f281c1d27151963e13be1d6bc2f9f32e263806b03e843ff9198a6128247b9d51b64d28bc7c8646674",
        "95873a2fff6e139c257be5eee37262e0774920965c26483c9b32cceb565abbc74dcfb36679224fb7f7d5ac0060015aea",
        "8b8b469a973a5702bb0b51f774041da814c2b0d81a0d0a58b946c9c995be9dfaadc1501f0adf2088a66d67a4a6f92193",
        "b27b87ea6b1e9653b54d2377e95708444f886ca0fc1728889bf3afee2f8cbe4c618b7127e9f38a189e6d56dd7933cfff",
        "b46d152384d888737aebe52bb9127314f678733c45948b00075575db79b732a2bbfa47dab0886863ade7f5fbdc4a14fa",
        "ada6da1ce6464d22dcbc1fe4396a0d1aa8a486fc7094f89a5d11a81cf75a1209eca7bae3b1d943dcff6e39c163d29fb5",
        "b3b4ceea11bbc6fafb5800caa593385644a3262245357e5013be5c1cf622bf7cb0b667e586269c346459c3b5faf0eaef",
    ];

    fn root_secret_key() -> SecretKey {
        SecretKey::from_bytes(&hex::decode(ROOT_SECRET_KEY).unwrap()).unwrap()
    }

    fn hidden_puzzle_hash() -> Bytes32 {
        default_hidden_puzzle_hash().unwrap()
    }

    #[test]
    fn test_default_hidden_puzzle_hash() {
        assert_eq!(
            hex::encode(hidden_puzzle_hash().as_slice()),
            "711d6c4e32c92e53179b199484cf8c897542bc57f2b22582799f9d657eec4699"
        );
    }

    #[test]
    fn test_unhardened_synthetic_public_keys() {
        let root = root_secret_key().sk_to_pk();
        let hidden = hidden_puzzle_hash();
        for (index, expected) in SYNTHETIC_PUBLIC_KEYS.iter().enumerate() {
            let wallet_pk = master_pk_to_wallet_pk_unhardened(&root, index as u32).unwrap();
            let synthetic = calculate_synthetic_public_key(&Bytes48::from(wallet_pk), &hidden).unwrap();
            assert_eq!(hex::encode(synthetic.as_slice()), *expected, "index {index}");
        }
    }

    #[test]
    fn test_key_store_matches_public_derivation() {
        let mut private = KeyStore::new(RootKey::Secret(root_secret_key()), false);
        let mut public = KeyStore::new(RootKey::Public(root_secret_key().sk_to_pk()), false);
        private.generate(4).unwrap();
        public.generate(4).unwrap();
        let hidden = hidden_puzzle_hash();
        for (index, (a, b)) in private.keys().iter().zip(public.keys()).enumerate() {
            assert_eq!(a.public_key, b.public_key);
            assert!(b.is_watch_only());
            let synthetic_sk =
                calculate_synthetic_secret_key(a.secret_key.as_ref().unwrap(), &hidden).unwrap();
            assert_eq!(
                hex::encode(Bytes48::from(synthetic_sk.sk_to_pk()).as_slice()),
                SYNTHETIC_PUBLIC_KEYS[index]
            );
        }
    }

    #[test]
    fn test_hardened_watch_only_store_cannot_derive() {
        let mut store = KeyStore::new(RootKey::Public(root_secret_key().sk_to_pk()), true);
        assert!(store.generate(1).is_err());
        assert!(store.is_empty());
        let mut hardened = KeyStore::new(RootKey::Secret(root_secret_key()), true);
        hardened.generate_until(3).unwrap();
        assert_eq!(hardened.len(), 3);
        assert_ne!(
            hardened.keys()[0].public_key,
            master_pk_to_wallet_pk_unhardened(&root_secret_key().sk_to_pk(), 0).unwrap()
        );
    }
}
