//! Command Line argument parsing
#![allow(missing_docs)]

use std::ffi::OsString;
use std::path::PathBuf;

use bpaf::Bpaf;

#[derive(Clone, Debug, Bpaf)]
#[bpaf(options, version)]
/// gen-mc: Sipura/Linksys MiniCert and SRTP private key generator
///
/// Use the same CA key file for all users who will use SRTP together.
pub struct Options {
    /// A file with the CA's 1024-bit RSA key in PEM format
    #[bpaf(short('k'), long("ca-key"), argument("CA_KEY_FILE"))]
    pub ca_key: PathBuf,
    /// Password for an encrypted CA key file, prompted for when needed and
    /// not given
    #[bpaf(long, argument("PASSWORD"))]
    pub password: Option<String>,
    /// The user's display name, maximum 32 bytes
    #[bpaf(short('d'), long("display-name"), argument("DISPLAY_NAME"))]
    pub display_name: OsString,
    /// The user's user id, maximum 16 bytes
    #[bpaf(short('u'), long("user-id"), argument("USER_ID"))]
    pub user_id: OsString,
    /// The MiniCert expiry date in HHMMSSMMDDYY format, defaults to 000000010138
    #[bpaf(short('e'), long("expiry-date"), argument("HHMMSSMMDDYY"))]
    pub expiry_date: Option<String>,
    /// The MiniCert expiry date in days from today, eg. 31, 365
    #[bpaf(short('E'), long("expiry-days"), argument("DAYS"))]
    pub expiry_days: Option<String>,
    /// When used with -E the MiniCert expires at midnight
    #[bpaf(short('m'), long)]
    pub midnight: bool,
    /// The file to write the MiniCert to, in base64
    #[bpaf(
        short('o'),
        long("output"),
        argument("MINICERT_FILE"),
        fallback(PathBuf::from("mini_cert.b64")),
        debug_fallback
    )]
    pub minicert_file: PathBuf,
    /// The file to write the user's private key to, in base64
    #[bpaf(
        short('p'),
        long("private-key"),
        argument("USERPK_FILE"),
        fallback(PathBuf::from("user_pk.b64")),
        debug_fallback
    )]
    pub user_pk_file: PathBuf,
    /// Don't write the MiniCert and user's private key to stdout
    #[bpaf(short('q'), long)]
    pub quiet: bool,
    /// Write user name, id, and MiniCert expiry date to stdout
    #[bpaf(short('v'), long)]
    pub verbose: bool,
    /// Log every step to stderr
    #[bpaf(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = options()
            .run_inner(&["-k", "cakey.pem", "-d", "My Name", "-u", "1234567"])
            .unwrap();
        assert_eq!(opts.ca_key, PathBuf::from("cakey.pem"));
        assert_eq!(opts.display_name, OsString::from("My Name"));
        assert_eq!(opts.user_id, OsString::from("1234567"));
        assert_eq!(opts.expiry_date, None);
        assert_eq!(opts.expiry_days, None);
        assert_eq!(opts.minicert_file, PathBuf::from("mini_cert.b64"));
        assert_eq!(opts.user_pk_file, PathBuf::from("user_pk.b64"));
        assert!(!opts.midnight && !opts.quiet && !opts.verbose && !opts.debug);
    }

    #[test]
    fn expiry_days_with_midnight() {
        let opts = options()
            .run_inner(&[
                "-k", "cakey.pem", "-d", "My Name", "-u", "1234567", "-E", "365", "-m", "-q",
            ])
            .unwrap();
        assert_eq!(opts.expiry_days.as_deref(), Some("365"));
        assert!(opts.midnight);
        assert!(opts.quiet);
    }

    #[test]
    fn ca_key_is_required() {
        assert!(options().run_inner(&["-d", "My Name", "-u", "1"]).is_err());
    }
}
