//! Console output in the format printed by the Sipura admin manual examples.

use std::io::{self, Write};

use time::OffsetDateTime;
use time::macros::format_description;

use crate::cert::params::CertificateRequest;

/// Echoes both artifacts.
pub fn write_certificate_listing(
    out: &mut impl Write,
    certificate: &str,
    private_key: &str,
) -> io::Result<()> {
    write!(out, "\n<Mini Certificate>\n{certificate}\n")?;
    write!(out, "\n<SRTP Private Key>\n{private_key}\n\n")
}

/// Summarizes the encoded user information and the expiry.
pub fn write_user_info(out: &mut impl Write, request: &CertificateRequest) -> io::Result<()> {
    writeln!(out, "<Encoded User Info>")?;
    writeln!(
        out,
        "User display name..: {}",
        String::from_utf8_lossy(request.display_name.value())
    )?;
    writeln!(
        out,
        "User id............: {}",
        String::from_utf8_lossy(request.user_id.value())
    )?;
    writeln!(out, "Expiry date........: {}\n", request.expiry.field)?;
    writeln!(
        out,
        "This certificate expires on {}\n",
        expiry_date_string(request.expiry.at)
    )
}

/// Formats an instant as `Jan 01 2038, 00:00:00`.
pub fn expiry_date_string(at: OffsetDateTime) -> String {
    let format =
        format_description!("[month repr:short] [day] [year], [hour]:[minute]:[second]");
    at.format(format).unwrap_or_else(|_| at.to_string())
}
