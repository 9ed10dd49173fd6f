use rand_core::CryptoRngCore;
use rsa::{
    BigUint, RsaPrivateKey, RsaPublicKey,
    traits::{PrivateKeyParts, PublicKeyParts},
};
use zeroize::Zeroizing;

use crate::error::{MiniCertError, Result};

/// Modulus size of every subject key.
pub const SUBJECT_KEY_BITS: usize = 512;

/// The fixed public exponent F4.
pub const PUBLIC_EXPONENT: u32 = 65_537;

/// How many candidates are tried before key generation gives up.
pub const MAX_KEYGEN_ATTEMPTS: usize = 16;

/// A freshly generated key that must be checked before it is used.
pub trait KeyCandidate {
    /// Verifies that the public and private halves belong together.
    fn check_consistency(&self) -> Result<()>;
}

impl KeyCandidate for RsaPrivateKey {
    fn check_consistency(&self) -> Result<()> {
        check_consistency(self)
    }
}

/// Checks that `n` is the product of the key's primes and that `e·d ≡ 1`
/// modulo `p - 1` for every prime, which together give `e·d ≡ 1 mod λ(n)`.
pub fn check_consistency(key: &RsaPrivateKey) -> Result<()> {
    key.validate()
        .map_err(|err| MiniCertError::InvalidKey(format!("consistency check failed: {err}")))
}

/// Draws candidates from `generate` until one passes the consistency check.
///
/// Rejected candidates are dropped right away, which zeroizes RSA key
/// material. A candidate that fails to generate at all also uses up an
/// attempt.
///
/// # Arguments
/// * `max_attempts` - Upper bound on the number of candidates drawn.
/// * `generate` - Produces one candidate per call.
///
/// # Returns
/// The first consistent candidate, or `KeyGenerationExhausted`.
pub fn generate_valid_key<K, F>(max_attempts: usize, mut generate: F) -> Result<K>
where
    K: KeyCandidate,
    F: FnMut() -> Result<K>,
{
    for attempt in 1..=max_attempts {
        match generate() {
            Ok(candidate) => match candidate.check_consistency() {
                Ok(()) => {
                    tracing::debug!(attempt, "subject key usable");
                    return Ok(candidate);
                }
                Err(err) => tracing::debug!(attempt, %err, "discarding subject key"),
            },
            Err(err) => tracing::warn!(attempt, %err, "subject key generation failed"),
        }
    }
    Err(MiniCertError::KeyGenerationExhausted {
        attempts: max_attempts,
    })
}

/// The subject's RSA key pair: 512-bit modulus, exponent 65537.
///
/// The private half is zeroized when the pair is dropped.
pub struct SubjectKeyPair {
    private: RsaPrivateKey,
}

impl SubjectKeyPair {
    /// Generates a consistent subject key pair, retrying up to
    /// [`MAX_KEYGEN_ATTEMPTS`] times.
    pub fn generate<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Result<Self> {
        let exponent = BigUint::from(PUBLIC_EXPONENT);
        tracing::debug!(bits = SUBJECT_KEY_BITS, "generating subject RSA key");
        let private = generate_valid_key(MAX_KEYGEN_ATTEMPTS, || {
            RsaPrivateKey::new_with_exp(&mut *rng, SUBJECT_KEY_BITS, &exponent)
                .map_err(|err| MiniCertError::InvalidKey(err.to_string()))
        })?;
        Ok(Self { private })
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.private.to_public_key()
    }

    /// The public modulus, big-endian with no leading zero bytes.
    pub fn public_modulus(&self) -> Vec<u8> {
        self.private.n().to_bytes_be()
    }

    /// The private exponent, big-endian with no leading zero bytes.
    ///
    /// The returned buffer is zeroed when dropped.
    pub fn export_private_exponent(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.private.d().to_bytes_be())
    }
}

impl std::fmt::Debug for SubjectKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubjectKeyPair")
            .field("bits", &self.private.n().bits())
            .finish_non_exhaustive()
    }
}
