use std::fmt;

use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

use crate::filesystem::Timestamp;

/// A [`Timestamp`] broken down into UTC calendar fields.
///
/// Displays as `YYYY-MM-DD HH:MM:SS.nnnnnnnnn`, every field zero padded.
/// Years past 9999 simply take more digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CivilTime {
    pub year: u64,
    pub month: u64,
    pub day: u64,
    pub hour: u64,
    pub minute: u64,
    pub second: u64,
    pub nanos: u64,
}

impl CivilTime {
    /// `None` before year 0, since the text form has no sign, and past the
    /// last year `time` can represent.
    pub fn from_timestamp(stamp: Timestamp) -> Option<Self> {
        let utc = OffsetDateTime::from_unix_timestamp(stamp.secs()).ok()?;
        let year = u64::try_from(utc.year()).ok()?;
        Some(Self {
            year,
            month: u64::from(u8::from(utc.month())),
            day: u64::from(utc.day()),
            hour: u64::from(utc.hour()),
            minute: u64::from(utc.minute()),
            second: u64::from(utc.second()),
            nanos: u64::from(stamp.nanos()),
        })
    }

    /// `None` when any field is out of range for a real UTC instant.
    pub fn to_timestamp(&self) -> Option<Timestamp> {
        let year = i32::try_from(self.year).ok()?;
        let month = Month::try_from(u8::try_from(self.month).ok()?).ok()?;
        let date = Date::from_calendar_date(year, month, u8::try_from(self.day).ok()?).ok()?;
        let time = Time::from_hms(
            u8::try_from(self.hour).ok()?,
            u8::try_from(self.minute).ok()?,
            u8::try_from(self.second).ok()?,
        )
        .ok()?;
        let secs = PrimitiveDateTime::new(date, time).assume_utc().unix_timestamp();
        Timestamp::new(secs, u32::try_from(self.nanos).ok()?)
    }
}

impl fmt::Display for CivilTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:09}",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.nanos
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(0, 0, "1970-01-01 00:00:00.000000000")]
    #[case(1_704_067_200, 5, "2024-01-01 00:00:00.000000005")]
    #[case(951_827_696, 999_999_999, "2000-02-29 12:34:56.999999999")]
    #[case(-1, 0, "1969-12-31 23:59:59.000000000")]
    #[case(253_402_300_799, 0, "9999-12-31 23:59:59.000000000")]
    #[case(253_402_300_800, 1, "10000-01-01 00:00:00.000000001")]
    fn formats_utc_fixed_width(#[case] secs: i64, #[case] nanos: u32, #[case] expected: &str) {
        let stamp = Timestamp::new(secs, nanos).unwrap();
        let civil = CivilTime::from_timestamp(stamp).unwrap();

        assert_eq!(civil.to_string(), expected);
        assert_eq!(civil.to_timestamp(), Some(stamp));
    }

    #[rstest]
    #[case::before_year_zero(-62_198_755_200)]
    #[case::past_the_calendar(i64::MAX)]
    fn unrepresentable_years_cannot_be_rendered(#[case] secs: i64) {
        let stamp = Timestamp::new(secs, 0).unwrap();
        assert_eq!(CivilTime::from_timestamp(stamp), None);
    }

    #[rstest]
    #[case(2023, 2, 29, 0, 0, 0, 0)]
    #[case(2024, 13, 1, 0, 0, 0, 0)]
    #[case(2024, 1, 0, 0, 0, 0, 0)]
    #[case(2024, 1, 1, 24, 0, 0, 0)]
    #[case(2024, 1, 1, 0, 60, 0, 0)]
    #[case(2024, 1, 1, 0, 0, 60, 0)]
    #[case(2024, 1, 1, 0, 0, 0, 1_000_000_000)]
    fn rejects_invalid_calendar_fields(
        #[case] year: u64,
        #[case] month: u64,
        #[case] day: u64,
        #[case] hour: u64,
        #[case] minute: u64,
        #[case] second: u64,
        #[case] nanos: u64,
    ) {
        let civil = CivilTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
            nanos,
        };
        assert_eq!(civil.to_timestamp(), None);
    }
}
