use crate::error::{MiniCertError, Result};

/// Width of the display name field.
pub const DISPLAY_NAME_LEN: usize = 32;
/// Width of the user id field.
pub const USER_ID_LEN: usize = 16;

/// A left-justified, zero-padded identity field of fixed width `N`.
///
/// The bytes are copied verbatim; no character set normalization is done, so
/// the caller's encoding reaches the device unchanged.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PaddedField<const N: usize>([u8; N]);

/// The 32-byte display name field.
pub type DisplayName = PaddedField<DISPLAY_NAME_LEN>;
/// The 16-byte user id field.
pub type UserId = PaddedField<USER_ID_LEN>;

impl<const N: usize> PaddedField<N> {
    /// Validates `value` and pads it to `N` bytes.
    ///
    /// # Arguments
    /// * `what` - Field name used in error messages.
    /// * `value` - Raw field bytes, 1 to `N` long.
    pub fn new(what: &str, value: &[u8]) -> Result<Self> {
        if value.is_empty() {
            return Err(MiniCertError::InvalidInput(format!("{what} is missing")));
        }
        if value.len() > N {
            return Err(MiniCertError::InvalidInput(format!(
                "{what} can't be more than {N} bytes, got {}",
                value.len()
            )));
        }
        let mut field = [0u8; N];
        field[..value.len()].copy_from_slice(value);
        Ok(Self(field))
    }

    /// The padded field, exactly `N` bytes.
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// The original value, with the zero padding stripped.
    pub fn value(&self) -> &[u8] {
        let end = self.0.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        &self.0[..end]
    }
}

impl<const N: usize> std::fmt::Debug for PaddedField<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaddedField<{N}>({:?})", String::from_utf8_lossy(self.value()))
    }
}

/// Encodes the display name and user id into their fixed-width fields.
pub fn encode(display_name: &[u8], user_id: &[u8]) -> Result<(DisplayName, UserId)> {
    let display_name = DisplayName::new("display name", display_name)?;
    let user_id = UserId::new("user id", user_id)?;
    Ok((display_name, user_id))
}
