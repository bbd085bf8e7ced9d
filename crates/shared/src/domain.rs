use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);
    };
}

id_newtype!(ResourceId);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid military time {0}: hours must be 0-23 and minutes 0-59")]
    InvalidMilitaryTime(u16),
    #[error("month index {0} out of range 0-11")]
    MonthOutOfRange(u8),
}

/// Zero-based calendar month, the cache granularity the widget works in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthIndex(u8);

impl MonthIndex {
    pub fn of(date: NaiveDate) -> Self {
        Self(date.month0() as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for MonthIndex {
    type Error = TimeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 11 {
            return Err(TimeError::MonthOutOfRange(value));
        }
        Ok(Self(value))
    }
}

impl fmt::Display for MonthIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Composite (year, zero-based month) key for the availability cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: MonthIndex,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: MonthIndex::of(date),
        }
    }

    /// Last calendar day of this month, the end of the availability
    /// window requested from the slots endpoint.
    pub fn last_day(self) -> NaiveDate {
        let (next_year, next_month0) = if self.month.index() == 11 {
            (self.year + 1, 0)
        } else {
            (self.year, self.month.index() + 1)
        };
        NaiveDate::from_ymd_opt(next_year, u32::from(next_month0) + 1, 1)
            .and_then(|first_of_next| first_of_next.pred_opt())
            .expect("month arithmetic stays within chrono's supported date range")
    }
}

/// Calendar date key, rendered "YYYY-MM-DD" (UTC) on the wire and in
/// the availability maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(pub NaiveDate);

impl DateKey {
    pub fn of_timestamp(timestamp: &DateTime<Utc>) -> Self {
        Self(timestamp.date_naive())
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // NaiveDate renders ISO "YYYY-MM-DD" already.
        self.0.fmt(f)
    }
}

/// Display time, "h:mm A" (e.g. "7:00 AM").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeLabel(pub String);

impl TimeLabel {
    pub fn of_timestamp(timestamp: &DateTime<Utc>) -> Self {
        Self(timestamp.format("%-I:%M %p").to_string())
    }

    /// Converts a 24-hour numeric encoding (1430 = 2:30 PM) to a
    /// display label. Out-of-range hours or minutes are rejected.
    pub fn from_military(value: u16) -> Result<Self, TimeError> {
        let hour = value / 100;
        let minute = value % 100;
        if hour > 23 || minute > 59 {
            return Err(TimeError::InvalidMilitaryTime(value));
        }
        let (display_hour, meridiem) = match hour {
            0 => (12, "AM"),
            1..=11 => (hour, "AM"),
            12 => (12, "PM"),
            _ => (hour - 12, "PM"),
        };
        Ok(Self(format!("{display_hour}:{minute:02} {meridiem}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn military_conversion_covers_meridiem_boundaries() {
        assert_eq!(TimeLabel::from_military(0).expect("midnight").0, "12:00 AM");
        assert_eq!(TimeLabel::from_military(30).expect("half past").0, "12:30 AM");
        assert_eq!(TimeLabel::from_military(700).expect("morning").0, "7:00 AM");
        assert_eq!(TimeLabel::from_military(1200).expect("noon").0, "12:00 PM");
        assert_eq!(TimeLabel::from_military(1430).expect("afternoon").0, "2:30 PM");
        assert_eq!(
            TimeLabel::from_military(2359).expect("last minute").0,
            "11:59 PM"
        );
    }

    #[test]
    fn military_conversion_rejects_invalid_encodings() {
        assert_eq!(
            TimeLabel::from_military(2400),
            Err(TimeError::InvalidMilitaryTime(2400))
        );
        assert_eq!(
            TimeLabel::from_military(1260),
            Err(TimeError::InvalidMilitaryTime(1260))
        );
    }

    #[test]
    fn timestamp_label_formats_without_zero_padding() {
        let ts: DateTime<Utc> = "2017-03-30T18:30:00Z".parse().expect("timestamp");
        assert_eq!(TimeLabel::of_timestamp(&ts).0, "6:30 PM");
        let morning: DateTime<Utc> = "2017-03-30T07:00:00Z".parse().expect("timestamp");
        assert_eq!(TimeLabel::of_timestamp(&morning).0, "7:00 AM");
    }

    #[test]
    fn month_index_is_bounded() {
        assert_eq!(MonthIndex::try_from(0).expect("january").index(), 0);
        assert_eq!(MonthIndex::try_from(11).expect("december").index(), 11);
        assert_eq!(MonthIndex::try_from(12), Err(TimeError::MonthOutOfRange(12)));
        assert_eq!(MonthIndex::of(date(2017, 3, 30)).index(), 2);
    }

    #[test]
    fn month_key_last_day_handles_length_and_rollover() {
        assert_eq!(MonthKey::of(date(2017, 3, 1)).last_day(), date(2017, 3, 31));
        assert_eq!(MonthKey::of(date(2017, 4, 15)).last_day(), date(2017, 4, 30));
        assert_eq!(MonthKey::of(date(2016, 2, 2)).last_day(), date(2016, 2, 29));
        assert_eq!(MonthKey::of(date(2017, 12, 25)).last_day(), date(2017, 12, 31));
    }

    #[test]
    fn date_key_renders_iso_calendar_form() {
        assert_eq!(DateKey::from(date(2017, 3, 30)).to_string(), "2017-03-30");
        let ts: DateTime<Utc> = "2017-03-30T23:59:00Z".parse().expect("timestamp");
        assert_eq!(DateKey::of_timestamp(&ts), DateKey::from(date(2017, 3, 30)));
    }
}
