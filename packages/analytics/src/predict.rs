//! Historical-frequency prediction for a new stop.
//!
//! The candidate is compared field by field against every stored stop on
//! gender, age, search flag, stop duration and drug flag. The most common
//! violation and outcome among the exact matches become the prediction.

use std::collections::BTreeMap;

use securecheck_analytics_models::{CandidateRecord, Prediction};
use securecheck_log_models::{LogRecord, MAX_DRIVER_AGE, MIN_DRIVER_AGE};

/// Violation predicted when no stored stop matches.
pub const DEFAULT_VIOLATION: &str = "Speeding";

/// Outcome predicted when no stored stop matches.
pub const DEFAULT_OUTCOME: &str = "Warning";

/// Errors from validating a candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictError {
    /// Age outside the range the form accepts.
    #[error("driver age {age} is outside {min}..={max}")]
    AgeOutOfRange {
        /// The rejected age.
        age: u8,
        /// Youngest accepted age.
        min: u8,
        /// Oldest accepted age.
        max: u8,
    },
}

/// Validates the candidate's fields.
///
/// # Errors
///
/// Returns [`PredictError::AgeOutOfRange`] if the age is not in
/// `16..=100`.
pub const fn validate(candidate: &CandidateRecord) -> Result<(), PredictError> {
    let age = candidate.driver_age;
    if age < MIN_DRIVER_AGE || age > MAX_DRIVER_AGE {
        return Err(PredictError::AgeOutOfRange {
            age,
            min: MIN_DRIVER_AGE,
            max: MAX_DRIVER_AGE,
        });
    }
    Ok(())
}

/// Returns `true` if `record` agrees with `candidate` on all five match
/// fields. A missing value in the record never matches.
#[must_use]
pub fn matches(record: &LogRecord, candidate: &CandidateRecord) -> bool {
    record.driver_gender.as_deref() == Some(candidate.driver_gender.as_ref())
        && record.driver_age == Some(i64::from(candidate.driver_age))
        && record.search_conducted == candidate.search_conducted
        && record.stop_duration.as_deref() == Some(candidate.stop_duration.as_str())
        && record.drugs_related_stop == candidate.drugs_related_stop
}

/// Most frequent value; ties go to the lexicographically smallest.
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    // BTreeMap iterates in ascending key order and max_by_key keeps the
    // last maximum, so walk it backwards.
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, n)| *n)
        .map(|(value, _)| value)
}

/// Predicts the violation and outcome for `candidate` from `records`.
///
/// Pure and idempotent: the same inputs always give the same prediction.
///
/// # Errors
///
/// Returns [`PredictError`] if the candidate fails [`validate`].
pub fn predict(
    records: &[LogRecord],
    candidate: &CandidateRecord,
) -> Result<Prediction, PredictError> {
    validate(candidate)?;

    let matched: Vec<&LogRecord> = records.iter().filter(|r| matches(r, candidate)).collect();

    let violation = mode(matched.iter().filter_map(|r| r.violation.as_deref()));
    let outcome = mode(matched.iter().filter_map(|r| r.stop_outcome.as_deref()));
    let used_defaults = violation.is_none() && outcome.is_none();

    let predicted_violation = violation.unwrap_or(DEFAULT_VIOLATION).to_string();
    let predicted_outcome = outcome.unwrap_or(DEFAULT_OUTCOME).to_string();

    log::debug!(
        "Prediction from {} matching stop(s): {predicted_violation} / {predicted_outcome}",
        matched.len()
    );

    let summary = narrative(candidate, &predicted_violation, &predicted_outcome);

    Ok(Prediction {
        predicted_violation,
        predicted_outcome,
        matched_records: matched.len(),
        used_defaults,
        summary,
    })
}

/// Describes the stop and its predicted violation and outcome in one
/// paragraph.
#[must_use]
pub fn narrative(candidate: &CandidateRecord, violation: &str, outcome: &str) -> String {
    let search = if candidate.search_conducted {
        "A search was conducted"
    } else {
        "No search was conducted"
    };
    let drugs = if candidate.drugs_related_stop {
        "was drug related"
    } else {
        "was not drug related"
    };

    format!(
        "Predicted violation: {violation}. Predicted stop outcome: {outcome}. \
         A {age}-year-old {gender} driver in {country} was stopped at {time} on {date}. \
         {search}, and the stop {drugs}. \
         Stop duration: {duration}. Vehicle number: {vehicle}.",
        age = candidate.driver_age,
        gender = candidate.driver_gender,
        country = candidate.country_name,
        time = candidate.stop_time.format("%I:%M %p"),
        date = candidate.stop_date.format("%Y-%m-%d"),
        duration = candidate.stop_duration,
        vehicle = candidate.vehicle_number,
    )
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use securecheck_log_models::Gender;

    use super::*;

    fn candidate() -> CandidateRecord {
        CandidateRecord {
            stop_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            stop_time: NaiveTime::from_hms_opt(22, 15, 0).unwrap(),
            country_name: "India".to_string(),
            driver_gender: Gender::Male,
            driver_age: 30,
            driver_race: "Asian".to_string(),
            search_conducted: false,
            search_type: String::new(),
            drugs_related_stop: false,
            stop_duration: "0-15 Min".to_string(),
            vehicle_number: "TN01AB1234".to_string(),
        }
    }

    fn record(violation: &str, outcome: &str) -> LogRecord {
        LogRecord {
            driver_gender: Some("Male".to_string()),
            driver_age: Some(30),
            stop_duration: Some("0-15 Min".to_string()),
            violation: Some(violation.to_string()),
            stop_outcome: Some(outcome.to_string()),
            ..LogRecord::default()
        }
    }

    #[test]
    fn predicts_most_frequent_violation_and_outcome() {
        let records = vec![
            record("Speeding", "Ticket"),
            record("Speeding", "Ticket"),
            record("Equipment", "Warning"),
        ];

        let prediction = predict(&records, &candidate()).unwrap();
        assert_eq!(prediction.predicted_violation, "Speeding");
        assert_eq!(prediction.predicted_outcome, "Ticket");
        assert_eq!(prediction.matched_records, 3);
        assert!(!prediction.used_defaults);
    }

    #[test]
    fn falls_back_to_defaults_without_matches() {
        let mut other = record("DUI", "Arrest");
        other.driver_age = Some(55);

        let prediction = predict(&[other], &candidate()).unwrap();
        assert_eq!(prediction.predicted_violation, DEFAULT_VIOLATION);
        assert_eq!(prediction.predicted_outcome, DEFAULT_OUTCOME);
        assert_eq!(prediction.matched_records, 0);
        assert!(prediction.used_defaults);

        assert!(predict(&[], &candidate()).unwrap().used_defaults);
    }

    #[test]
    fn matches_with_only_null_values_use_defaults() {
        let mut blank = record("x", "y");
        blank.violation = None;
        blank.stop_outcome = None;

        let prediction = predict(&[blank], &candidate()).unwrap();
        assert_eq!(prediction.matched_records, 1);
        assert_eq!(prediction.predicted_violation, "Speeding");
        assert_eq!(prediction.predicted_outcome, "Warning");
        assert!(prediction.used_defaults);
    }

    #[test]
    fn ties_go_to_the_smallest_value() {
        let records = vec![
            record("Speeding", "Warning"),
            record("Equipment", "Citation"),
            record("Seatbelt", "Arrest"),
        ];
        let prediction = predict(&records, &candidate()).unwrap();
        assert_eq!(prediction.predicted_violation, "Equipment");
        assert_eq!(prediction.predicted_outcome, "Arrest");
    }

    #[test]
    fn prediction_is_idempotent() {
        let records = vec![
            record("Speeding", "Warning"),
            record("Equipment", "Citation"),
            record("Equipment", "Warning"),
        ];
        let first = predict(&records, &candidate()).unwrap();
        let second = predict(&records, &candidate()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn flags_are_compared_as_booleans() {
        let mut searched = record("DUI", "Arrest");
        searched.search_conducted = true;
        let records = vec![searched, record("Speeding", "Warning")];

        let mut c = candidate();
        c.search_conducted = true;
        let prediction = predict(&records, &c).unwrap();
        assert_eq!(prediction.predicted_violation, "DUI");
        assert_eq!(prediction.matched_records, 1);
    }

    #[test]
    fn missing_record_fields_never_match() {
        let mut unknown_gender = record("DUI", "Arrest");
        unknown_gender.driver_gender = None;
        assert!(!matches(&unknown_gender, &candidate()));
    }

    #[test]
    fn rejects_out_of_range_ages() {
        let mut c = candidate();
        c.driver_age = 15;
        assert_eq!(
            predict(&[], &c),
            Err(PredictError::AgeOutOfRange {
                age: 15,
                min: 16,
                max: 100
            })
        );

        c.driver_age = 101;
        assert!(predict(&[], &c).is_err());

        c.driver_age = 100;
        assert!(predict(&[], &c).is_ok());
    }

    #[test]
    fn narrative_uses_twelve_hour_time() {
        let text = narrative(&candidate(), "Speeding", "Warning");
        assert!(text.contains("A 30-year-old Male driver in India was stopped at 10:15 PM on 2024-05-01."));
        assert!(text.contains("No search was conducted, and the stop was not drug related."));
        assert!(text.contains("Stop duration: 0-15 Min. Vehicle number: TN01AB1234."));
        assert!(text.starts_with("Predicted violation: Speeding. Predicted stop outcome: Warning."));
    }

    #[test]
    fn narrative_mentions_search_and_drugs() {
        let mut c = candidate();
        c.search_conducted = true;
        c.drugs_related_stop = true;
        let text = narrative(&c, "DUI", "Arrest");
        assert!(text.contains("A search was conducted, and the stop was drug related."));
    }
}
