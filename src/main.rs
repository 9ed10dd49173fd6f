use std::io::Write;

use anyhow::{Context, Result};
use minicert::{
    artifact::ArtifactPaths,
    cert::params::CertificateRequest,
    error::MiniCertError,
    expiry::{DEFAULT_EXPIRY, ExpirySpec, SystemClock},
    generate::generate,
    issuer::{IssuerKeyPair, Password},
    report,
};
use rand_core::OsRng;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

mod args;

fn main() -> Result<()> {
    let opts = args::options().run();
    init_tracing(opts.debug);

    let expiry = expiry_spec(&opts)?;
    let request = CertificateRequest::builder()
        .display_name(opts.display_name.clone().into_encoded_bytes())
        .user_id(opts.user_id.clone().into_encoded_bytes())
        .expiry(expiry)
        .clock(SystemClock)
        .build()
        .context("invalid user info")?;

    let issuer = match opts.password.clone().map(Zeroizing::new) {
        Some(password) => IssuerKeyPair::load(&opts.ca_key, Some(password.as_bytes())),
        None => IssuerKeyPair::load_with(&opts.ca_key, prompt_password),
    }
    .with_context(|| format!("reading CA key {}", opts.ca_key.display()))?;

    let paths = ArtifactPaths {
        certificate: opts.minicert_file.clone(),
        private_key: opts.user_pk_file.clone(),
    };
    let issued = generate(&request, &issuer, &paths, &mut OsRng)
        .context("generating the MiniCert")?;

    let mut stdout = std::io::stdout().lock();
    if !opts.quiet {
        report::write_certificate_listing(&mut stdout, &issued.encoded, &issued.private_key)?;
    }
    if opts.verbose {
        report::write_user_info(&mut stdout, &request)?;
    }
    stdout.flush()?;

    Ok(())
}

/// Picks the expiry option, falling back to the default date when neither
/// `-e` nor `-E` was given.
fn expiry_spec(opts: &args::Options) -> Result<ExpirySpec> {
    let date = match (&opts.expiry_date, &opts.expiry_days) {
        (None, None) => Some(DEFAULT_EXPIRY),
        (date, _) => date.as_deref(),
    };
    let spec = ExpirySpec::from_parts(date, opts.expiry_days.as_deref(), opts.midnight)
        .context("invalid expiry")?;
    Ok(spec)
}

/// Asks for the CA key password on the terminal, without echo.
fn prompt_password() -> minicert::error::Result<Password> {
    rpassword::prompt_password("Enter PEM pass phrase: ")
        .map(|password| Zeroizing::new(password.into_bytes()))
        .map_err(|err| {
            MiniCertError::KeyLoadError(format!("reading the CA key password failed: {err}"))
        })
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
