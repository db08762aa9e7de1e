//! Resolves canonical timezone names into UTC offsets.

use std::fmt;

use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, Tz};

/// The local time that calendar days and months are counted in.
///
/// A named timezone resolves its offset separately for every instant, so
/// instants on either side of a daylight saving change each land on their own
/// local calendar day.
#[derive(Clone, Copy)]
pub enum LocalTime {
    /// The same offset for every instant.
    Fixed(UtcOffset),
    /// A timezone from the IANA database, e.g. "Pacific/Auckland".
    Zone(&'static Tz),
}

impl LocalTime {
    /// Coordinated Universal Time.
    pub const UTC: Self = Self::Fixed(UtcOffset::UTC);

    /// Look up `canonical_timezone` (e.g. "Asia/Kolkata").
    ///
    /// Returns `None` if `canonical_timezone` is not a known timezone name.
    pub fn from_timezone_name(canonical_timezone: &str) -> Option<Self> {
        time_tz::timezones::get_by_name(canonical_timezone).map(Self::Zone)
    }

    /// The UTC offset in effect at the instant `at`.
    pub fn offset_at(self, at: OffsetDateTime) -> UtcOffset {
        match self {
            Self::Fixed(offset) => offset,
            Self::Zone(tz) => tz.get_offset_utc(&at).to_utc(),
        }
    }

    /// The local calendar date of `at`, or `None` if it falls outside the
    /// supported date range.
    pub fn date_of(self, at: OffsetDateTime) -> Option<Date> {
        at.checked_to_offset(self.offset_at(at)).map(|local| local.date())
    }

    /// The instant of the wall-clock time `local` in this local time.
    ///
    /// The offset is taken at `local` read as UTC, which is exact except within
    /// a few hours of a daylight saving change.
    pub fn assume_local(self, local: PrimitiveDateTime) -> OffsetDateTime {
        local.assume_offset(self.offset_at(local.assume_utc()))
    }
}

impl fmt::Debug for LocalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(offset) => f.debug_tuple("Fixed").field(offset).finish(),
            Self::Zone(tz) => f.debug_tuple("Zone").field(&tz.name()).finish(),
        }
    }
}
