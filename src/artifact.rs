//! Writing the MiniCert and the subject private key to disk.
//!
//! The two files only make sense as a pair: a MiniCert whose private key
//! could not be written is removed again before the error is returned.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use zeroize::Zeroizing;

use crate::cert::MiniCertificate;
use crate::error::{MiniCertError, Result};
use crate::key::SubjectKeyPair;

/// Default file name of the MiniCert.
pub const DEFAULT_CERTIFICATE_FILE: &str = "mini_cert.b64";
/// Default file name of the subject private key.
pub const DEFAULT_PRIVATE_KEY_FILE: &str = "user_pk.b64";

/// Where the two artifacts go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub certificate: PathBuf,
    pub private_key: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            certificate: PathBuf::from(DEFAULT_CERTIFICATE_FILE),
            private_key: PathBuf::from(DEFAULT_PRIVATE_KEY_FILE),
        }
    }
}

impl ArtifactPaths {
    /// Both artifacts under `dir`, with their default names.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            certificate: dir.join(DEFAULT_CERTIFICATE_FILE),
            private_key: dir.join(DEFAULT_PRIVATE_KEY_FILE),
        }
    }
}

/// The encoded contents of both artifacts, as written.
pub struct Artifacts {
    pub certificate: String,
    pub private_key: Zeroizing<String>,
}

/// Base64 of the subject's private exponent, with no line breaks.
pub fn encode_private_key(subject: &SubjectKeyPair) -> Zeroizing<String> {
    let exponent = subject.export_private_exponent();
    Zeroizing::new(STANDARD.encode(exponent.as_slice()))
}

/// Writes the MiniCert and then the subject private key.
///
/// # Errors
/// `IoError` if either write fails. When the private key can't be written the
/// MiniCert is deleted first.
pub fn write_artifacts(
    certificate: &MiniCertificate,
    subject: &SubjectKeyPair,
    paths: &ArtifactPaths,
) -> Result<Artifacts> {
    let encoded = certificate.to_base64();
    let private_key = encode_private_key(subject);

    fs::write(&paths.certificate, encoded.as_bytes())
        .map_err(|err| write_error("MiniCert", &paths.certificate, err))?;
    tracing::debug!(path = %paths.certificate.display(), "wrote MiniCert");

    if let Err(err) = write_secret(&paths.private_key, private_key.as_bytes()) {
        let err = write_error("user PK", &paths.private_key, err);
        tracing::warn!(
            path = %paths.certificate.display(),
            "removing MiniCert without a private key"
        );
        return match fs::remove_file(&paths.certificate) {
            Ok(()) => Err(err),
            Err(remove_err) => Err(MiniCertError::IoError(format!(
                "{err}; removing MiniCert {} also failed: {remove_err}",
                paths.certificate.display()
            ))),
        };
    }
    tracing::debug!(path = %paths.private_key.display(), "wrote user PK");

    Ok(Artifacts {
        certificate: encoded,
        private_key,
    })
}

fn write_secret(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.flush()
}

fn write_error(what: &str, path: &Path, err: std::io::Error) -> MiniCertError {
    MiniCertError::IoError(format!("creating {what} {} failed: {err}", path.display()))
}
