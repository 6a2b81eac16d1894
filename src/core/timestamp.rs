//! Purpose: Normalized point in time used by timestamp holders.
//! Exports: `Timestamp`, `TIMESTAMP_GRAMMAR`.
//! Role: RFC 3339 text boundary for calendar values crossing the transport.
//! Invariants: Values are stored in UTC with years 0000..=9999.
//! Invariants: Text form is `YYYY-MM-DDTHH:MM:SS[.fraction]Z` and round-trips to the nanosecond.
use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::error::{Error, ErrorKind};

pub const TIMESTAMP_GRAMMAR: &str =
    "RFC 3339 timestamp such as 2026-02-01T00:00:00Z or 2026-02-01T01:30:00.25+01:00 (years 0000-9999)";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Default for Timestamp {
    fn default() -> Self {
        Self(OffsetDateTime::UNIX_EPOCH)
    }
}

impl Timestamp {
    pub fn from_unix_nanos(nanos: i128) -> Result<Self, Error> {
        let utc = OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|err| {
            Error::new(ErrorKind::InvalidTimestamp)
                .with_message(format!("unix time {nanos}ns is out of range"))
                .with_source(err)
        })?;
        Self::checked(utc)
    }

    pub fn from_unix_seconds(seconds: i64) -> Result<Self, Error> {
        Self::from_unix_nanos(i128::from(seconds) * 1_000_000_000)
    }

    /// Normalizes any offset to UTC.
    pub fn from_datetime(value: OffsetDateTime) -> Result<Self, Error> {
        Self::from_unix_nanos(value.unix_timestamp_nanos())
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        let parsed = OffsetDateTime::parse(text, &Rfc3339).map_err(|err| {
            Error::literal(ErrorKind::InvalidTimestamp, text, TIMESTAMP_GRAMMAR).with_source(err)
        })?;
        Self::from_datetime(parsed).map_err(|_| {
            Error::literal(ErrorKind::InvalidTimestamp, text, TIMESTAMP_GRAMMAR)
        })
    }

    fn checked(utc: OffsetDateTime) -> Result<Self, Error> {
        if !(0..=9999).contains(&utc.year()) {
            return Err(Error::new(ErrorKind::InvalidTimestamp)
                .with_message(format!("year {} is outside 0000-9999", utc.year())));
        }
        Ok(Self(utc))
    }

    pub fn as_datetime(&self) -> OffsetDateTime {
        self.0
    }

    pub fn unix_nanos(&self) -> i128 {
        self.0.unix_timestamp_nanos()
    }

    pub fn to_text(&self) -> String {
        // Year range is checked at construction, so RFC 3339 formatting cannot fail.
        self.0.format(&Rfc3339).unwrap_or_default()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
