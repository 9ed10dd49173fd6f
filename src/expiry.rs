//! Expiry date resolution.
//!
//! A MiniCert carries its expiry as twelve ASCII digits in the order
//! `HHMMSSMMDDYY`, local time, with the year stored as an offset from 2000.
//! The date is either given explicitly in that form or computed as a number of
//! days from now.

use std::num::IntErrorKind;
use std::ops::RangeInclusive;

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::error::{MiniCertError, Result};

/// Width of the encoded expiry field.
pub const EXPIRY_FIELD_LEN: usize = 12;

/// Largest accepted day offset. Always lands past 2038 while keeping the
/// timestamp arithmetic far away from any rollover.
pub const MAX_EXPIRY_DAYS: i64 = 12_000;

/// Midnight, Jan 1, 2038.
pub const DEFAULT_EXPIRY: &str = "000000010138";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const BASE_YEAR: i32 = 2000;

/// Source of the current time and the local UTC offset.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> OffsetDateTime;

    /// The local UTC offset in effect at `instant`, daylight saving included.
    fn local_offset_at(&self, instant: OffsetDateTime) -> UtcOffset;
}

/// The operating system clock and time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn local_offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        UtcOffset::local_offset_at(instant).unwrap_or_else(|err| {
            tracing::warn!(%err, "local UTC offset unavailable, using UTC");
            UtcOffset::UTC
        })
    }
}

/// A clock frozen at one instant in a fixed time zone.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub now: OffsetDateTime,
    pub offset: UtcOffset,
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.now
    }

    fn local_offset_at(&self, _instant: OffsetDateTime) -> UtcOffset {
        self.offset
    }
}

/// How the caller asked for the expiry to be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpirySpec {
    /// An explicit `HHMMSSMMDDYY` date.
    Date(String),
    /// A number of days from now, optionally truncated to midnight.
    DaysFromNow { days: i64, midnight: bool },
}

impl ExpirySpec {
    /// Builds the spec from the raw option values.
    ///
    /// Exactly one of `date` and `days` must be given. `midnight` only
    /// applies to the day offset.
    pub fn from_parts(date: Option<&str>, days: Option<&str>, midnight: bool) -> Result<Self> {
        match (date, days) {
            (Some(_), Some(_)) => Err(MiniCertError::InvalidInput(
                "more than one expiry option specified".to_string(),
            )),
            (None, None) => Err(MiniCertError::InvalidInput(
                "expiry date is missing".to_string(),
            )),
            (Some(date), None) => Ok(ExpirySpec::Date(date.to_string())),
            (None, Some(days)) => {
                let days = days.trim().parse::<i64>().map_err(|err| match err.kind() {
                    IntErrorKind::PosOverflow => MiniCertError::OutOfRange(format!(
                        "expiry days can't be more than {MAX_EXPIRY_DAYS}"
                    )),
                    _ => MiniCertError::InvalidInput(format!(
                        "expiry days must be a number, got {days:?}"
                    )),
                })?;
                if days < 1 {
                    return Err(MiniCertError::InvalidInput(
                        "expiry days must be at least 1".to_string(),
                    ));
                }
                Ok(ExpirySpec::DaysFromNow { days, midnight })
            }
        }
    }
}

/// The twelve ASCII digits `HHMMSSMMDDYY` written into the info block.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ExpiryField([u8; EXPIRY_FIELD_LEN]);

impl ExpiryField {
    /// Encodes a calendar value. The year is stored as `year - 2000`.
    pub fn from_datetime(datetime: OffsetDateTime) -> Result<Self> {
        let year = datetime.year() - BASE_YEAR;
        if !(0..=99).contains(&year) {
            return Err(MiniCertError::OutOfRange(format!(
                "expiry year {} can't be encoded in two digits",
                datetime.year()
            )));
        }
        let text = format!(
            "{:02}{:02}{:02}{:02}{:02}{:02}",
            datetime.hour(),
            datetime.minute(),
            datetime.second(),
            u8::from(datetime.month()),
            datetime.day(),
            year
        );
        let mut field = [0u8; EXPIRY_FIELD_LEN];
        field.copy_from_slice(text.as_bytes());
        Ok(Self(field))
    }

    pub fn as_bytes(&self) -> &[u8; EXPIRY_FIELD_LEN] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Only ever built from ASCII digits.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl std::fmt::Debug for ExpiryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExpiryField({})", self.as_str())
    }
}

impl std::fmt::Display for ExpiryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved expiry: the instant and its encoded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    /// Expiry instant, carrying the local offset it was resolved in.
    pub at: OffsetDateTime,
    pub field: ExpiryField,
}

/// Resolves `spec` against `clock` and checks that the result lies in the
/// future.
pub fn resolve<C: Clock + ?Sized>(spec: &ExpirySpec, clock: &C) -> Result<Expiry> {
    let now = clock.now();
    let expiry = match spec {
        ExpirySpec::Date(date) => parse_date(date, clock)?,
        ExpirySpec::DaysFromNow { days, midnight } => from_days(now, *days, *midnight, clock)?,
    };

    if expiry.at <= now {
        return Err(MiniCertError::OutOfRange(format!(
            "expiry date {} is in the past",
            expiry.field
        )));
    }

    tracing::debug!(field = %expiry.field, at = %expiry.at, "resolved expiry");
    Ok(expiry)
}

fn parse_date<C: Clock + ?Sized>(date: &str, clock: &C) -> Result<Expiry> {
    let bytes = date.as_bytes();
    if bytes.len() != EXPIRY_FIELD_LEN {
        return Err(MiniCertError::InvalidInput(format!(
            "expiry date must be {EXPIRY_FIELD_LEN} characters, got {}",
            bytes.len()
        )));
    }
    if !bytes.iter().all(u8::is_ascii_digit) {
        return Err(MiniCertError::InvalidInput(
            "expiry date contains non-digits".to_string(),
        ));
    }

    let pair = |i: usize| (bytes[i] - b'0') * 10 + (bytes[i + 1] - b'0');
    let hour = in_range("hour", pair(0), 0..=23)?;
    let minute = in_range("minute", pair(2), 0..=59)?;
    let second = in_range("second", pair(4), 0..=59)?;
    let month = in_range("month", pair(6), 1..=12)?;
    let day = in_range("day", pair(8), 1..=31)?;
    let year = in_range("year", pair(10), 0..=38)?;

    let month = Month::try_from(month).map_err(invalid_date)?;
    let first = Date::from_calendar_date(BASE_YEAR + i32::from(year), month, 1)
        .map_err(invalid_date)?;
    // Days past the end of the month roll over into the next one.
    let date = first
        .checked_add(Duration::days(i64::from(day) - 1))
        .ok_or_else(|| MiniCertError::InvalidInput("expiry date is not a valid date".into()))?;
    let time = Time::from_hms(hour, minute, second).map_err(invalid_date)?;

    let at = local_instant(PrimitiveDateTime::new(date, time), clock);

    let mut field = [0u8; EXPIRY_FIELD_LEN];
    field.copy_from_slice(bytes);
    Ok(Expiry {
        at,
        field: ExpiryField(field),
    })
}

fn from_days<C: Clock + ?Sized>(
    now: OffsetDateTime,
    days: i64,
    midnight: bool,
    clock: &C,
) -> Result<Expiry> {
    if days < 1 {
        return Err(MiniCertError::InvalidInput(
            "expiry days must be at least 1".to_string(),
        ));
    }
    if days > MAX_EXPIRY_DAYS {
        return Err(MiniCertError::OutOfRange(format!(
            "expiry days can't be more than {MAX_EXPIRY_DAYS}, got {days}"
        )));
    }

    let overflow = || MiniCertError::OutOfRange("expiry date overflows the time range".into());
    let timestamp = days
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|seconds| now.unix_timestamp().checked_add(seconds))
        .ok_or_else(overflow)?;
    let instant = OffsetDateTime::from_unix_timestamp(timestamp).map_err(|_| overflow())?;

    let mut local = instant.to_offset(clock.local_offset_at(instant));
    if midnight {
        local = local_instant(PrimitiveDateTime::new(local.date(), Time::MIDNIGHT), clock);
    }

    Ok(Expiry {
        at: local,
        field: ExpiryField::from_datetime(local)?,
    })
}

/// Places a local wall-clock time on the timeline with the offset in effect
/// at the resulting instant, like `mktime`.
fn local_instant<C: Clock + ?Sized>(local: PrimitiveDateTime, clock: &C) -> OffsetDateTime {
    let guess = local.assume_offset(clock.local_offset_at(local.assume_utc()));
    let offset = clock.local_offset_at(guess);
    if offset == guess.offset() {
        guess
    } else {
        local.assume_offset(offset)
    }
}

fn in_range(what: &str, value: u8, range: RangeInclusive<u8>) -> Result<u8> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(MiniCertError::InvalidInput(format!(
            "{what} in expiry date must be in {:02}-{:02} range, got {value:02}",
            range.start(),
            range.end()
        )))
    }
}

fn invalid_date(err: time::error::ComponentRange) -> MiniCertError {
    MiniCertError::InvalidInput(format!("expiry date is not a valid date: {err}"))
}
