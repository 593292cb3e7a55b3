use blst::min_pk::{PublicKey, SecretKey};
use dg_wallet_core::blockchain::sized_bytes::Bytes48;

/// A derived key. Watch only pairs carry no secret key.
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub secret_key: Option<SecretKey>,
}

impl KeyPair {
    #[must_use]
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        KeyPair {
            public_key: secret_key.sk_to_pk(),
            secret_key: Some(secret_key),
        }
    }
    #[must_use]
    pub fn watch_only(public_key: PublicKey) -> Self {
        KeyPair {
            public_key,
            secret_key: None,
        }
    }
    #[must_use]
    pub fn public_key_bytes(&self) -> Bytes48 {
        self.public_key.into()
    }
    #[must_use]
    pub fn is_watch_only(&self) -> bool {
        self.secret_key.is_none()
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}
