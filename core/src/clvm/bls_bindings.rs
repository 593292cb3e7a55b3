use crate::blockchain::sized_bytes::{Bytes48, Bytes96, SizedBytes};
use blst::min_pk::{AggregateSignature, PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;
use std::io::{Error, ErrorKind};

pub const AUG_SCHEME_DST: &[u8; 43] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_AUG_";

/// Compressed encoding of the point at infinity in G2.
pub const INFINITE_SIGNATURE: [u8; 96] = {
    let mut bytes = [0u8; 96];
    bytes[0] = 0xc0;
    bytes
};

#[must_use]
pub fn verify_signature(public_key: &PublicKey, msg: &[u8], signature: &Signature) -> bool {
    matches!(
        signature.verify(
            true,
            msg,
            AUG_SCHEME_DST,
            &public_key.to_bytes(),
            public_key,
            true
        ),
        BLST_ERROR::BLST_SUCCESS
    )
}

pub fn aggregate_verify_signature(
    public_keys: &[&Bytes48],
    msgs: &[&[u8]],
    signature: &Signature,
) -> Result<bool, Error> {
    let mut keys: Vec<PublicKey> = Vec::with_capacity(public_keys.len());
    for key in public_keys {
        keys.push(PublicKey::from_bytes(key.as_slice()).map_err(|e| {
            Error::new(ErrorKind::InvalidInput, format!("Invalid public key: {e:?}"))
        })?);
    }
    let combined: Vec<Vec<u8>> = keys
        .iter()
        .zip(msgs)
        .map(|(key, msg)| [key.to_bytes().as_slice(), *msg].concat())
        .collect();
    Ok(matches!(
        signature.aggregate_verify(
            true,
            &combined.iter().map(Vec::as_slice).collect::<Vec<&[u8]>>(),
            AUG_SCHEME_DST,
            &keys.iter().collect::<Vec<&PublicKey>>(),
            true,
        ),
        BLST_ERROR::BLST_SUCCESS
    ))
}

#[must_use]
pub fn sign(local_sk: &SecretKey, msg: &[u8]) -> Signature {
    local_sk.sign(msg, AUG_SCHEME_DST, &local_sk.sk_to_pk().to_bytes())
}

/// Aggregates signatures, returning the infinity signature for an empty input.
pub fn aggregate_signatures(signatures: &[Signature]) -> Result<Bytes96, Error> {
    if signatures.is_empty() {
        return Ok(Bytes96::new(&INFINITE_SIGNATURE));
    }
    let refs: Vec<&Signature> = signatures.iter().collect();
    let aggregate = AggregateSignature::aggregate(&refs, true)
        .map_err(|e| Error::new(ErrorKind::InvalidInput, format!("{e:?}")))?;
    Ok(aggregate.to_signature().into())
}
