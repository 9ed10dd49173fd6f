use bon::bon;

use crate::error::Result;
use crate::expiry::{Clock, Expiry, ExpirySpec, resolve};
use crate::identity::{DisplayName, UserId, encode};

/// Validated user information for one MiniCert.
///
/// # Fields
/// * `display_name` - The padded display name field.
/// * `user_id` - The padded user id field.
/// * `expiry` - The resolved expiry, guaranteed to lie in the future at
///   construction time.
#[derive(Clone, Debug)]
pub struct CertificateRequest {
    pub display_name: DisplayName,
    pub user_id: UserId,
    pub expiry: Expiry,
}

#[bon]
impl CertificateRequest {
    /// Validates the raw user input.
    ///
    /// Identity fields are checked before the expiry is resolved, and
    /// nothing here touches key material.
    ///
    /// # Example
    /// ```
    /// use minicert::cert::params::CertificateRequest;
    /// use minicert::expiry::{ExpirySpec, SystemClock};
    ///
    /// let request = CertificateRequest::builder()
    ///     .display_name("Alice")
    ///     .user_id("1001")
    ///     .expiry(ExpirySpec::DaysFromNow { days: 365, midnight: true })
    ///     .clock(SystemClock)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(request.user_id.value(), b"1001");
    /// ```
    #[builder]
    pub fn new<C: Clock>(
        #[builder(into)] display_name: Vec<u8>,
        #[builder(into)] user_id: Vec<u8>,
        expiry: ExpirySpec,
        clock: C,
    ) -> Result<Self> {
        let (display_name, user_id) = encode(&display_name, &user_id)?;
        let expiry = resolve(&expiry, &clock)?;
        Ok(Self {
            display_name,
            user_id,
            expiry,
        })
    }
}
