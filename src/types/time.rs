//! Binary time tags (IEC 60870-5-4 CP24Time2a, CP32Time2a, CP56Time2a).
//!
//! ```text
//! byte 0-1 | milliseconds (0-59999), little-endian
//! byte 2   | IV(7)  RES(6)      minutes(5..0)       all widths
//! byte 3   | SU(7)  RES(6..5)   hours(4..0)         CP32, CP56
//! byte 4   | day of week(7..5)  day of month(4..0)  CP56
//! byte 5   | RES(7..4)          month(3..0)         CP56
//! byte 6   | RES(7)             year(6..0)          CP56
//! ```
//!
//! A timestamp decoded at a narrow width leaves the wider fields `None`, so
//! calendar data is never invented on the way through the codec.

use bytes::{BufMut, BytesMut};

use super::primitive::{read_u16, read_u8};
use crate::error::{DecodeError, EncodeError};

/// Wire width of a time tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeWidth {
    /// 3 bytes: milliseconds and minutes
    Cp24,
    /// 4 bytes: adds hours and summer time
    Cp32,
    /// 7 bytes: adds day of month/week, month and year
    Cp56,
}

impl TimeWidth {
    /// Encoded length in bytes.
    #[inline]
    pub const fn len(self) -> usize {
        match self {
            Self::Cp24 => 3,
            Self::Cp32 => 4,
            Self::Cp56 => 7,
        }
    }
}

impl std::fmt::Display for TimeWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cp24 => f.write_str("CP24Time2a"),
            Self::Cp32 => f.write_str("CP32Time2a"),
            Self::Cp56 => f.write_str("CP56Time2a"),
        }
    }
}

/// Time tag with the precision it was built or decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    /// Milliseconds within the minute (0-59999)
    pub milliseconds: u16,
    /// Invalid flag (IV)
    pub invalid: bool,
    /// Minutes (0-59)
    pub minutes: u8,
    /// Summer time flag (SU)
    pub summer_time: Option<bool>,
    /// Hours (0-23)
    pub hours: Option<u8>,
    /// Day of week (1-7, 1=Monday), `None` when not used
    pub day_of_week: Option<u8>,
    /// Day of month (1-31)
    pub day_of_month: Option<u8>,
    /// Month (1-12)
    pub months: Option<u8>,
    /// Year of century (0-99)
    pub years: Option<u8>,
    /// Width this timestamp carries data for
    pub precision: TimeWidth,
}

impl Timestamp {
    /// Create a CP24Time2a time tag.
    pub const fn cp24(milliseconds: u16, minutes: u8) -> Self {
        Self {
            milliseconds,
            invalid: false,
            minutes,
            summer_time: None,
            hours: None,
            day_of_week: None,
            day_of_month: None,
            months: None,
            years: None,
            precision: TimeWidth::Cp24,
        }
    }

    /// Create a CP32Time2a time tag.
    pub const fn cp32(milliseconds: u16, minutes: u8, hours: u8) -> Self {
        Self {
            summer_time: Some(false),
            hours: Some(hours),
            precision: TimeWidth::Cp32,
            ..Self::cp24(milliseconds, minutes)
        }
    }

    /// Create a CP56Time2a time tag. Day of week is left unused.
    pub const fn cp56(
        milliseconds: u16,
        minutes: u8,
        hours: u8,
        day_of_month: u8,
        months: u8,
        years: u8,
    ) -> Self {
        Self {
            day_of_month: Some(day_of_month),
            months: Some(months),
            years: Some(years),
            precision: TimeWidth::Cp56,
            ..Self::cp32(milliseconds, minutes, hours)
        }
    }

    /// Set the invalid flag.
    pub const fn with_invalid(mut self, invalid: bool) -> Self {
        self.invalid = invalid;
        self
    }

    /// Set the summer time flag. No effect on a CP24 timestamp.
    pub const fn with_summer_time(mut self, summer_time: bool) -> Self {
        if !matches!(self.precision, TimeWidth::Cp24) {
            self.summer_time = Some(summer_time);
        }
        self
    }

    /// Set the day of week. Only a CP56 timestamp carries it.
    pub const fn with_day_of_week(mut self, day_of_week: u8) -> Self {
        if matches!(self.precision, TimeWidth::Cp56) {
            self.day_of_week = Some(day_of_week);
        }
        self
    }

    /// Drop the fields `width` cannot carry.
    pub fn truncate(&self, width: TimeWidth) -> Self {
        if width >= self.precision {
            return *self;
        }
        let mut out = *self;
        out.precision = width;
        out.day_of_week = None;
        out.day_of_month = None;
        out.months = None;
        out.years = None;
        if width == TimeWidth::Cp24 {
            out.summer_time = None;
            out.hours = None;
        }
        out
    }

    /// Decode a time tag of `width` bytes.
    pub fn decode(src: &mut &[u8], width: TimeWidth) -> Result<Self, DecodeError> {
        super::primitive::ensure(src, width.len(), "time tag")?;

        let milliseconds = read_u16(src, "time tag")?;
        let minute_byte = read_u8(src, "time tag")?;
        let mut time = Self::cp24(milliseconds, minute_byte & 0x3F).with_invalid(minute_byte & 0x80 != 0);
        if width == TimeWidth::Cp24 {
            return Ok(time);
        }

        let hour_byte = read_u8(src, "time tag")?;
        time.hours = Some(hour_byte & 0x1F);
        time.summer_time = Some(hour_byte & 0x80 != 0);
        time.precision = TimeWidth::Cp32;
        if width == TimeWidth::Cp32 {
            return Ok(time);
        }

        let day_byte = read_u8(src, "time tag")?;
        let day_of_week = day_byte >> 5;
        time.day_of_month = Some(day_byte & 0x1F);
        time.day_of_week = (day_of_week != 0).then_some(day_of_week);
        time.months = Some(read_u8(src, "time tag")? & 0x0F);
        time.years = Some(read_u8(src, "time tag")? & 0x7F);
        time.precision = TimeWidth::Cp56;
        Ok(time)
    }

    /// Encode as a `width` time tag.
    ///
    /// Encoding narrower than the timestamp's precision truncates. Encoding
    /// wider fails with [`EncodeError::TimePrecision`].
    pub fn encode(&self, width: TimeWidth, dst: &mut BytesMut) -> Result<(), EncodeError> {
        check_range("milliseconds", self.milliseconds, 0, 59_999)?;
        check_range("minutes", self.minutes, 0, 59)?;

        let hour_byte = if width >= TimeWidth::Cp32 {
            let (Some(hours), Some(summer_time)) = (self.hours, self.summer_time) else {
                return Err(EncodeError::TimePrecision { width });
            };
            check_range("hours", hours, 0, 23)?;
            Some(hours | if summer_time { 0x80 } else { 0 })
        } else {
            None
        };
        let calendar = if width == TimeWidth::Cp56 {
            Some(self.calendar(width)?)
        } else {
            None
        };

        dst.put_u16_le(self.milliseconds);
        dst.put_u8(self.minutes | if self.invalid { 0x80 } else { 0 });
        if let Some(hour_byte) = hour_byte {
            dst.put_u8(hour_byte);
        }
        if let Some((day_of_month, day_of_week, months, years)) = calendar {
            dst.put_u8(day_of_month | (day_of_week << 5));
            dst.put_u8(months);
            dst.put_u8(years);
        }
        Ok(())
    }

    fn calendar(&self, width: TimeWidth) -> Result<(u8, u8, u8, u8), EncodeError> {
        let (Some(day_of_month), Some(months), Some(years)) =
            (self.day_of_month, self.months, self.years)
        else {
            return Err(EncodeError::TimePrecision { width });
        };
        check_range("day of month", day_of_month, 1, 31)?;
        check_range("month", months, 1, 12)?;
        check_range("year", years, 0, 99)?;
        let day_of_week = match self.day_of_week {
            Some(day) => {
                check_range("day of week", day, 1, 7)?;
                day
            }
            None => 0,
        };
        Ok((day_of_month, day_of_week, months, years))
    }
}

fn check_range<T>(field: &'static str, value: T, min: T, max: T) -> Result<(), EncodeError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(EncodeError::out_of_range(field, value));
    }
    Ok(())
}

#[cfg(feature = "chrono")]
mod calendar {
    use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

    use super::{TimeWidth, Timestamp};

    impl Timestamp {
        /// Build a time tag of `width` from a calendar time.
        pub fn from_datetime(time: &NaiveDateTime, width: TimeWidth) -> Self {
            // Leap seconds report nanoseconds past 1e9; clamp into the minute
            let millis = (time.nanosecond() / 1_000_000).min(999);
            let full = Self::cp56(
                (time.second() * 1000 + millis) as u16,
                time.minute() as u8,
                time.hour() as u8,
                time.day() as u8,
                time.month() as u8,
                time.year().rem_euclid(100) as u8,
            )
            .with_day_of_week(time.weekday().number_from_monday() as u8);
            full.truncate(width)
        }

        /// Convert to a calendar time (years map to 2000-2099).
        ///
        /// Returns `None` unless all CP56 fields are present and valid.
        pub fn to_naive_date_time(&self) -> Option<NaiveDateTime> {
            let date = NaiveDate::from_ymd_opt(
                2000 + i32::from(self.years?),
                u32::from(self.months?),
                u32::from(self.day_of_month?),
            )?;
            date.and_hms_milli_opt(
                u32::from(self.hours?),
                u32::from(self.minutes),
                u32::from(self.milliseconds / 1000),
                u32::from(self.milliseconds % 1000),
            )
        }
    }
}
