use rand_core::CryptoRngCore;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha1::{Digest, Sha1};

use crate::cert::{InfoBlock, Signature};
use crate::error::{MiniCertError, Result};
use crate::issuer::IssuerKeyPair;

/// Length of the SHA-1 digest that gets signed.
pub const DIGEST_LEN: usize = 20;

/// SHA-1 digest of `data`.
pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    Sha1::digest(data).into()
}

/// The padding used for MiniCert signatures: PKCS#1 v1.5 type 1 over the
/// bare digest, with no DigestInfo prefix. Devices recover the raw digest
/// with a public-key operation and compare it byte for byte.
fn padding() -> Pkcs1v15Sign {
    Pkcs1v15Sign::new_unprefixed()
}

/// Signs the digest of `info` with the issuer's private key.
///
/// `rng` only blinds the private-key operation; the signature itself is
/// deterministic.
///
/// # Returns
/// A signature exactly as long as the issuer modulus.
pub fn sign<R: CryptoRngCore>(
    info: &InfoBlock,
    issuer: &IssuerKeyPair,
    rng: &mut R,
) -> Result<Signature> {
    let digest = digest(&info.to_bytes());
    tracing::debug!(digest_len = digest.len(), "hashed info block with sha1");

    let signature = issuer
        .private_key()
        .sign_with_rng(rng, padding(), &digest)
        .map_err(|err| MiniCertError::SigningFailed(err.to_string()))?;
    tracing::debug!(signature_len = signature.len(), "signed info block");

    Signature::new(signature, issuer.size())
}

/// Checks `signature` over `info` against the issuer's public key.
pub fn verify(info: &InfoBlock, signature: &Signature, issuer: &RsaPublicKey) -> Result<()> {
    let digest = digest(&info.to_bytes());
    issuer
        .verify(padding(), &digest, signature.as_bytes())
        .map_err(|err| MiniCertError::SigningFailed(format!("signature does not verify: {err}")))
}
