use crate::key_pair::KeyPair;
use crate::{
    key_from_mnemonic_str, master_pk_to_wallet_pk_unhardened, master_sk_to_wallet_sk,
    master_sk_to_wallet_sk_unhardened,
};
use blst::min_pk::{PublicKey, SecretKey};
use dg_wallet_core::blockchain::sized_bytes::{Bytes48, SizedBytes};
use log::debug;
use std::io::{Error, ErrorKind};

/// Root of a key store. Only a secret root can produce spending keys.
#[derive(Clone, Debug)]
pub enum RootKey {
    Secret(SecretKey),
    Public(PublicKey),
}

/// Grows an ordered list of wallet keys derived from a single root.
///
/// With a secret root every derived pair carries a secret key, using the hardened or unhardened
/// child rule at every path segment. A public root can only derive unhardened watch only pairs.
#[derive(Clone, Debug)]
pub struct KeyStore {
    secret_key: Option<SecretKey>,
    public_key: PublicKey,
    hardened: bool,
    keys: Vec<KeyPair>,
}

impl KeyStore {
    #[must_use]
    pub fn new(root: RootKey, hardened: bool) -> Self {
        let (secret_key, public_key) = match root {
            RootKey::Secret(sk) => {
                let pk = sk.sk_to_pk();
                (Some(sk), pk)
            }
            RootKey::Public(pk) => (None, pk),
        };
        KeyStore {
            secret_key,
            public_key,
            hardened,
            keys: vec![],
        }
    }
    pub fn from_public_key(public_key: &Bytes48, hardened: bool) -> Result<Self, Error> {
        let public_key = PublicKey::from_bytes(public_key.as_slice()).map_err(|e| {
            Error::new(ErrorKind::InvalidInput, format!("Invalid public key: {e:?}"))
        })?;
        Ok(KeyStore::new(RootKey::Public(public_key), hardened))
    }
    pub fn from_mnemonic(mnemonic: &str, hardened: bool) -> Result<Self, Error> {
        Ok(KeyStore::new(
            RootKey::Secret(key_from_mnemonic_str(mnemonic)?),
            hardened,
        ))
    }
    #[must_use]
    pub fn secret_key(&self) -> Option<&SecretKey> {
        self.secret_key.as_ref()
    }
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
    #[must_use]
    pub fn hardened(&self) -> bool {
        self.hardened
    }
    #[must_use]
    pub fn keys(&self) -> &[KeyPair] {
        &self.keys
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
    /// Appends `amount` new pairs. Nothing is appended if any derivation fails.
    pub fn generate(&mut self, amount: usize) -> Result<(), Error> {
        let start = self.keys.len();
        let mut generated = Vec::with_capacity(amount);
        for index in start..start + amount {
            let index = u32::try_from(index).map_err(|_| {
                Error::new(ErrorKind::InvalidInput, "Key index exceeds u32 range")
            })?;
            generated.push(self.generate_key_pair(index)?);
        }
        debug!("Derived keys {start}..{}", start + amount);
        self.keys.extend(generated);
        Ok(())
    }
    /// Grows the list to at least `amount` pairs.
    pub fn generate_until(&mut self, amount: usize) -> Result<(), Error> {
        if amount > self.keys.len() {
            self.generate(amount - self.keys.len())?;
        }
        Ok(())
    }
    fn generate_key_pair(&self, index: u32) -> Result<KeyPair, Error> {
        if self.hardened || self.secret_key.is_some() {
            let root = self.secret_key.as_ref().ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidInput,
                    "Cannot generate private key without root private key.",
                )
            })?;
            let secret_key = if self.hardened {
                master_sk_to_wallet_sk(root, index)?
            } else {
                master_sk_to_wallet_sk_unhardened(root, index)?
            };
            Ok(KeyPair::from_secret_key(secret_key))
        } else {
            Ok(KeyPair::watch_only(master_pk_to_wallet_pk_unhardened(
                &self.public_key,
                index,
            )?))
        }
    }
}
