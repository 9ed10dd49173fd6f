//! Decoding of CA key PEM blocks into RSA keys.
//!
//! Keys are rebuilt from their raw components so that a key which decodes but
//! fails validation surfaces as `InvalidKey` rather than as a decoding error.

use cbc::cipher::{BlockCipher, BlockDecryptMut, KeyInit, KeyIvInit, block_padding::Pkcs7};
use md5::{Digest, Md5};
use pkcs8::{EncryptedPrivateKeyInfo, PrivateKeyInfo};
use rsa::{BigUint, RsaPrivateKey, pkcs1};
use zeroize::Zeroizing;

use crate::error::{MiniCertError, Result};

/// Password bytes for an encrypted key, zeroed when dropped.
pub type Password = Zeroizing<Vec<u8>>;

/// Decodes a PEM encoded RSA private key.
///
/// `password` is only called for encrypted blocks, either PKCS#8
/// `ENCRYPTED PRIVATE KEY` or OpenSSL's traditional `Proc-Type: 4,ENCRYPTED`
/// format.
pub(crate) fn decode_private_key<F>(pem: &str, password: F) -> Result<RsaPrivateKey>
where
    F: FnOnce() -> Result<Password>,
{
    let block = pem::parse(pem)?;
    let encrypted = block
        .headers()
        .get("Proc-Type")
        .is_some_and(|value| value.contains("ENCRYPTED"));
    let dek_info = block.headers().get("DEK-Info").map(str::to_string);
    let tag = block.tag().to_string();
    let der = Zeroizing::new(block.into_contents());

    match tag.as_str() {
        "RSA PRIVATE KEY" if encrypted => {
            let dek_info = dek_info.ok_or_else(|| {
                MiniCertError::KeyLoadError("encrypted PEM block has no DEK-Info header".into())
            })?;
            let plain = decrypt_traditional(&der, &dek_info, &password()?)?;
            decode_pkcs1(&plain)
        }
        "RSA PRIVATE KEY" => decode_pkcs1(&der),
        "PRIVATE KEY" => decode_pkcs8(&der),
        "ENCRYPTED PRIVATE KEY" => {
            let info = EncryptedPrivateKeyInfo::try_from(der.as_slice())?;
            let document = info.decrypt(password()?.as_slice())?;
            decode_pkcs8(document.as_bytes())
        }
        other => Err(MiniCertError::KeyLoadError(format!(
            "unsupported PEM block {other:?}"
        ))),
    }
}

fn decode_pkcs8(der: &[u8]) -> Result<RsaPrivateKey> {
    let info = PrivateKeyInfo::try_from(der)?;
    if info.algorithm.oid != pkcs1::ALGORITHM_OID {
        return Err(MiniCertError::KeyLoadError(format!(
            "the CA key is not an RSA key (algorithm {})",
            info.algorithm.oid
        )));
    }
    decode_pkcs1(info.private_key)
}

fn decode_pkcs1(der: &[u8]) -> Result<RsaPrivateKey> {
    let key = pkcs1::RsaPrivateKey::try_from(der)?;
    if key.version() != pkcs1::Version::TwoPrime {
        return Err(MiniCertError::KeyLoadError(
            "multi-prime CA keys are not supported".to_string(),
        ));
    }

    let private = RsaPrivateKey::from_components(
        BigUint::from_bytes_be(key.modulus.as_bytes()),
        BigUint::from_bytes_be(key.public_exponent.as_bytes()),
        BigUint::from_bytes_be(key.private_exponent.as_bytes()),
        vec![
            BigUint::from_bytes_be(key.prime1.as_bytes()),
            BigUint::from_bytes_be(key.prime2.as_bytes()),
        ],
    )?;
    Ok(private)
}

/// Ciphers OpenSSL writes into the `DEK-Info` header of traditional keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraditionalCipher {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
    DesEde3Cbc,
}

impl TraditionalCipher {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "AES-128-CBC" => Some(Self::Aes128Cbc),
            "AES-192-CBC" => Some(Self::Aes192Cbc),
            "AES-256-CBC" => Some(Self::Aes256Cbc),
            "DES-EDE3-CBC" => Some(Self::DesEde3Cbc),
            _ => None,
        }
    }

    fn key_len(self) -> usize {
        match self {
            Self::Aes128Cbc => 16,
            Self::Aes192Cbc | Self::DesEde3Cbc => 24,
            Self::Aes256Cbc => 32,
        }
    }

    fn decrypt(self, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Self::Aes128Cbc => cbc_decrypt::<aes::Aes128>(key, iv, data),
            Self::Aes192Cbc => cbc_decrypt::<aes::Aes192>(key, iv, data),
            Self::Aes256Cbc => cbc_decrypt::<aes::Aes256>(key, iv, data),
            Self::DesEde3Cbc => cbc_decrypt::<des::TdesEde3>(key, iv, data),
        }
    }
}

/// Decrypts the body of a `Proc-Type: 4,ENCRYPTED` block.
fn decrypt_traditional(
    data: &[u8],
    dek_info: &str,
    password: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let (name, iv) = dek_info.split_once(',').ok_or_else(|| {
        MiniCertError::KeyLoadError(format!("malformed DEK-Info header {dek_info:?}"))
    })?;
    let cipher = TraditionalCipher::from_name(name.trim()).ok_or_else(|| {
        MiniCertError::KeyLoadError(format!("unsupported PEM cipher {:?}", name.trim()))
    })?;
    let iv = hex::decode(iv.trim())
        .map_err(|err| MiniCertError::KeyLoadError(format!("malformed DEK-Info IV: {err}")))?;
    if iv.len() < 8 {
        return Err(MiniCertError::KeyLoadError(
            "DEK-Info IV is too short".to_string(),
        ));
    }

    let key = bytes_to_key(password, &iv[..8], cipher.key_len());
    cipher.decrypt(&key, &iv, data)
}

/// OpenSSL's `EVP_BytesToKey` with MD5 and one iteration, as used for
/// traditional PEM encryption. The salt is the first 8 bytes of the IV.
fn bytes_to_key(password: &[u8], salt: &[u8], key_len: usize) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(Vec::with_capacity(key_len + 16));
    let mut previous = Zeroizing::new(Vec::new());
    while key.len() < key_len {
        let mut hasher = Md5::new();
        hasher.update(previous.as_slice());
        hasher.update(password);
        hasher.update(salt);
        previous.clear();
        previous.extend_from_slice(&hasher.finalize());
        key.extend_from_slice(&previous);
    }
    key.truncate(key_len);
    key
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Zeroizing<Vec<u8>>>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let decryptor = cbc::Decryptor::<C>::new_from_slices(key, iv).map_err(|_| {
        MiniCertError::KeyLoadError("wrong key or IV length for the PEM cipher".to_string())
    })?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map(Zeroizing::new)
        .map_err(|_| {
            MiniCertError::KeyLoadError("decrypting the CA key failed, bad password?".to_string())
        })
}
