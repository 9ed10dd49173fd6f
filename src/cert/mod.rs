pub mod params;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::{MiniCertError, Result};
use crate::expiry::{EXPIRY_FIELD_LEN, ExpiryField};
use crate::identity::{DISPLAY_NAME_LEN, DisplayName, USER_ID_LEN, UserId};

/// Offset of the user id field.
pub const USER_ID_OFFSET: usize = DISPLAY_NAME_LEN;
/// Offset of the expiry field.
pub const EXPIRY_OFFSET: usize = USER_ID_OFFSET + USER_ID_LEN;
/// Offset of the subject public modulus; everything before it is fixed width.
pub const SUBJECT_MODULUS_OFFSET: usize = EXPIRY_OFFSET + EXPIRY_FIELD_LEN;
/// Capacity of a serialized MiniCert, before base64.
pub const MAX_BLOB_LEN: usize = 2048;

/// The signed part of a MiniCert.
///
/// Layout: display name (32) ‖ user id (16) ‖ expiry (12) ‖ subject modulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoBlock {
    pub display_name: DisplayName,
    pub user_id: UserId,
    pub expiry: ExpiryField,
    /// Big-endian, no leading zero bytes.
    pub subject_modulus: Vec<u8>,
}

impl InfoBlock {
    /// Assembles the info block.
    ///
    /// # Errors
    /// `BufferOverflow` if the subject modulus would not fit the blob.
    pub fn assemble(
        display_name: DisplayName,
        user_id: UserId,
        expiry: ExpiryField,
        subject_modulus: Vec<u8>,
    ) -> Result<Self> {
        if SUBJECT_MODULUS_OFFSET + subject_modulus.len() > MAX_BLOB_LEN {
            return Err(MiniCertError::BufferOverflow(format!(
                "subject modulus of {} bytes does not fit the {MAX_BLOB_LEN} byte MiniCert",
                subject_modulus.len()
            )));
        }
        Ok(Self {
            display_name,
            user_id,
            expiry,
            subject_modulus,
        })
    }

    /// Length of the serialized block.
    pub fn encoded_len(&self) -> usize {
        SUBJECT_MODULUS_OFFSET + self.subject_modulus.len()
    }

    /// Serializes the block in device byte order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        bytes.extend_from_slice(self.display_name.as_bytes());
        bytes.extend_from_slice(self.user_id.as_bytes());
        bytes.extend_from_slice(self.expiry.as_bytes());
        debug_assert_eq!(bytes.len(), SUBJECT_MODULUS_OFFSET);
        bytes.extend_from_slice(&self.subject_modulus);
        bytes
    }
}

/// The issuer's signature over an [`InfoBlock`], as long as the issuer
/// modulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Wraps `bytes`, checking they are exactly `modulus_len` long.
    pub fn new(bytes: Vec<u8>, modulus_len: usize) -> Result<Self> {
        if bytes.len() != modulus_len {
            return Err(MiniCertError::SigningFailed(format!(
                "signature is {} bytes, expected {modulus_len}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A complete MiniCert: info block ‖ signature ‖ issuer modulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniCertificate {
    pub info: InfoBlock,
    pub signature: Signature,
    /// Big-endian, no leading zero bytes.
    pub issuer_modulus: Vec<u8>,
}

impl MiniCertificate {
    /// Appends the signature and issuer modulus to the info block.
    ///
    /// # Errors
    /// `BufferOverflow` if the result exceeds [`MAX_BLOB_LEN`].
    pub fn finalize(info: InfoBlock, signature: Signature, issuer_modulus: Vec<u8>) -> Result<Self> {
        let len = info.encoded_len() + signature.as_bytes().len() + issuer_modulus.len();
        if len > MAX_BLOB_LEN {
            return Err(MiniCertError::BufferOverflow(format!(
                "MiniCert of {len} bytes exceeds {MAX_BLOB_LEN} bytes"
            )));
        }
        Ok(Self {
            info,
            signature,
            issuer_modulus,
        })
    }

    /// Offset of the signature in the serialized MiniCert.
    pub fn signature_offset(&self) -> usize {
        self.info.encoded_len()
    }

    /// Offset of the issuer modulus in the serialized MiniCert.
    pub fn issuer_modulus_offset(&self) -> usize {
        self.signature_offset() + self.signature.as_bytes().len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.info.to_bytes();
        bytes.extend_from_slice(self.signature.as_bytes());
        bytes.extend_from_slice(&self.issuer_modulus);
        debug_assert_eq!(
            bytes.len(),
            self.issuer_modulus_offset() + self.issuer_modulus.len()
        );
        bytes
    }

    /// Base64 with no line breaks, as written to the certificate file.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }
}
