//! # MiniCert - Sipura/Linksys MiniCert Generation in Pure Rust
//!
//! MiniCert is a library and command line tool for issuing the compact signed
//! credentials used for SRTP by Sipura and Linksys telephony endpoints. It is
//! built entirely with rustcrypto libraries and needs no OpenSSL at runtime.
//!
//! A MiniCert binds a display name, a user id and an expiry date to a freshly
//! generated 512-bit RSA key, and is countersigned by a 1024-bit CA key.
//! Endpoints parse it by byte offset, so the layout is fixed:
//!
//! | Offset | Length | Content |
//! |---|---|---|
//! | 0 | 32 | display name, zero-padded |
//! | 32 | 16 | user id, zero-padded |
//! | 48 | 12 | expiry, ASCII `HHMMSSMMDDYY` |
//! | 60 | k (≤64) | subject public modulus, big-endian |
//! | 60+k | 128 | signature over the SHA-1 digest of bytes `0..60+k` |
//! | 60+k+128 | ≤128 | CA public modulus, big-endian |
//!
//! The blob is written base64 encoded on a single line. The subject's private
//! exponent is written next to it, also base64 on a single line.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use minicert::{
//!     artifact::ArtifactPaths,
//!     cert::params::CertificateRequest,
//!     expiry::{ExpirySpec, SystemClock},
//!     generate::generate,
//!     issuer::IssuerKeyPair,
//! };
//! use rand_core::OsRng;
//!
//! # fn main() -> Result<(), minicert::error::MiniCertError> {
//! let request = CertificateRequest::builder()
//!     .display_name("My Name")
//!     .user_id("1234567")
//!     .expiry(ExpirySpec::DaysFromNow { days: 365, midnight: true })
//!     .clock(SystemClock)
//!     .build()?;
//!
//! let issuer = IssuerKeyPair::load(Path::new("cakey.pem"), None)?;
//!
//! let issued = generate(&request, &issuer, &ArtifactPaths::default(), &mut OsRng)?;
//! println!("<Mini Certificate>\n{}", issued.encoded);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is reported as a [`error::MiniCertError`] naming the step
//! that failed:
//!
//! ```rust
//! use minicert::{error::MiniCertError, identity};
//!
//! match identity::encode(b"A display name that is far too long", b"1001") {
//!     Ok(_) => println!("fields encoded"),
//!     Err(MiniCertError::InvalidInput(msg)) => println!("Invalid input: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`identity`]: Display name and user id fields
//! - [`expiry`]: Expiry date parsing and day-offset resolution
//! - [`key`]: Subject key generation and the consistency check
//! - [`issuer`]: CA key loading and validation
//! - [`cert`]: Info block and MiniCert layout
//! - [`pki`]: SHA-1 digest and PKCS#1 v1.5 signing
//! - [`artifact`]: Writing the MiniCert and private key files
//! - [`generate`]: The end-to-end pipeline
//! - [`report`]: Console output
//! - [`error`]: Error types

pub mod artifact;
pub mod cert;
pub mod error;
pub mod expiry;
pub mod generate;
pub mod identity;
pub mod issuer;
pub mod key;
mod pem_utils;
pub mod pki;
pub mod report;
