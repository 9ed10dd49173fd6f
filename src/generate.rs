use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::artifact::{ArtifactPaths, write_artifacts};
use crate::cert::params::CertificateRequest;
use crate::cert::{InfoBlock, MiniCertificate};
use crate::error::Result;
use crate::issuer::IssuerKeyPair;
use crate::key::SubjectKeyPair;
use crate::pki;

/// The outcome of a successful run.
pub struct IssuedCertificate {
    pub certificate: MiniCertificate,
    /// The base64 text written to the certificate file.
    pub encoded: String,
    /// The base64 text written to the private key file.
    pub private_key: Zeroizing<String>,
}

/// Generates a subject key, then issues and writes a MiniCert for
/// `request`.
///
/// # Arguments
/// * `request` - Validated user information.
/// * `issuer` - The CA key that signs the MiniCert.
/// * `paths` - Where the MiniCert and private key are written.
/// * `rng` - Randomness for key generation and signature blinding.
pub fn generate<R: CryptoRngCore>(
    request: &CertificateRequest,
    issuer: &IssuerKeyPair,
    paths: &ArtifactPaths,
    rng: &mut R,
) -> Result<IssuedCertificate> {
    let subject = SubjectKeyPair::generate(&mut *rng)?;
    issue(request, &subject, issuer, paths, rng)
}

/// Issues and writes a MiniCert for an existing subject key.
///
/// Nothing is written unless signing succeeds.
pub fn issue<R: CryptoRngCore>(
    request: &CertificateRequest,
    subject: &SubjectKeyPair,
    issuer: &IssuerKeyPair,
    paths: &ArtifactPaths,
    rng: &mut R,
) -> Result<IssuedCertificate> {
    let info = InfoBlock::assemble(
        request.display_name,
        request.user_id,
        request.expiry.field,
        subject.public_modulus(),
    )?;
    let signature = pki::sign(&info, issuer, &mut *rng)?;
    let certificate = MiniCertificate::finalize(info, signature, issuer.public_modulus())?;

    let artifacts = write_artifacts(&certificate, subject, paths)?;
    tracing::info!(
        certificate = %paths.certificate.display(),
        private_key = %paths.private_key.display(),
        expiry = %request.expiry.field,
        "MiniCert issued"
    );

    Ok(IssuedCertificate {
        certificate,
        encoded: artifacts.certificate,
        private_key: artifacts.private_key,
    })
}
