#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Police stop log record types.
//!
//! A [`LogRecord`] is one row of the `Police_Post_Logs` table. Records are
//! ingested outside of SecureCheck; everything in this workspace only reads
//! them. Boolean columns are stored as `0`/`1` integers and are normalized
//! to `bool` as soon as they are read (see [`flag`]).

pub mod flag;

use chrono::{NaiveDate, NaiveTime, Timelike as _};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Youngest driver age accepted by the predict form.
pub const MIN_DRIVER_AGE: u8 = 16;

/// Oldest driver age accepted by the predict form.
pub const MAX_DRIVER_AGE: u8 = 100;

/// Age pre-filled in the predict form.
pub const DEFAULT_DRIVER_AGE: u8 = 20;

/// Driver gender as offered by the predict form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Gender {
    /// Stored as `Male`.
    Male,
    /// Stored as `Female`.
    Female,
}

impl Gender {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Male, Self::Female]
    }
}

/// Coarse time-of-day bucket used by the night-arrest analysis.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum TimeOfDay {
    /// Hours 6 through 19.
    Day,
    /// Hours 20 through 23 and 0 through 5.
    Night,
}

impl TimeOfDay {
    /// Buckets an hour of the day (0-23).
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            20..=23 | 0..=5 => Self::Night,
            _ => Self::Day,
        }
    }

    /// Buckets a stop time.
    #[must_use]
    pub fn from_time(time: NaiveTime) -> Self {
        Self::from_hour(time.hour())
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Day, Self::Night]
    }
}

/// One police stop as stored in `Police_Post_Logs`.
///
/// Columns that can be null in the store are optional here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Date of the stop.
    pub stop_date: Option<NaiveDate>,
    /// Time of the stop.
    pub stop_time: Option<NaiveTime>,
    /// Jurisdiction label.
    pub country_name: Option<String>,
    /// Driver gender (`Male`/`Female` in current data).
    pub driver_gender: Option<String>,
    /// Driver age in years.
    pub driver_age: Option<i64>,
    /// Driver race.
    pub driver_race: Option<String>,
    /// Whether the vehicle or driver was searched.
    pub search_conducted: bool,
    /// Kind of search, if any.
    pub search_type: Option<String>,
    /// Whether the stop was drug related.
    pub drugs_related_stop: bool,
    /// Bucketed duration label, e.g. `0-15 Min`.
    pub stop_duration: Option<String>,
    /// Vehicle identifier.
    pub vehicle_number: Option<String>,
    /// Infraction category.
    pub violation: Option<String>,
    /// Disposition of the stop.
    pub stop_outcome: Option<String>,
    /// Whether the driver was arrested.
    pub is_arrested: bool,
}

impl LogRecord {
    /// Returns the day/night bucket of this stop, if the time is known.
    #[must_use]
    pub fn time_of_day(&self) -> Option<TimeOfDay> {
        self.stop_time.map(TimeOfDay::from_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_bucket_boundaries() {
        assert_eq!(TimeOfDay::from_hour(22), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(19), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Night);
    }

    #[test]
    fn time_of_day_from_stop_time() {
        let time = NaiveTime::from_hms_opt(22, 15, 0).unwrap();
        assert_eq!(TimeOfDay::from_time(time), TimeOfDay::Night);
    }

    #[test]
    fn gender_string_forms() {
        for gender in Gender::all() {
            let parsed: Gender = gender.as_ref().parse().unwrap();
            assert_eq!(parsed, *gender);
        }
        assert_eq!(Gender::Female.to_string(), "Female");
        assert!("female".parse::<Gender>().is_err());
    }
}
