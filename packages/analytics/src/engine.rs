//! Runs catalog and summary queries through the data access layer.
//!
//! Nothing here fails because of the store: a failed fetch degrades to an
//! empty value and the failure message is carried in
//! [`Reported::notices`].

use std::collections::BTreeSet;

use securecheck_analytics_models::{
    CandidateRecord, CatalogOutcome, Overview, Prediction, Reported, SummaryCounts,
    TimeOfDayCount,
};
use securecheck_database::{DataAccess, Fetch, records};
use securecheck_database_models::ResultTable;
use securecheck_log_models::{LogRecord, TimeOfDay};

use crate::AnalyticsError;
use crate::catalog::{self, CatalogQuery};
use crate::predict;

/// Every stored stop.
pub const LOGS_SQL: &str = "select * from Police_Post_Logs";

/// Stop counts per violation.
pub const VIOLATION_BREAKDOWN_SQL: &str =
    "select violation,count(violation) as counts from Police_Post_Logs group by violation";

/// Stop counts per driver gender.
pub const GENDER_BREAKDOWN_SQL: &str =
    "select driver_gender, count(*) as count from Police_Post_Logs group by driver_gender";

fn reported(fetch: Fetch) -> Reported<ResultTable> {
    Reported {
        value: fetch.table,
        notices: fetch.error.into_iter().collect(),
    }
}

/// The analytics engine.
#[derive(Debug, Clone)]
pub struct Analytics {
    access: DataAccess,
}

impl Analytics {
    /// Creates an engine reading through `access`.
    #[must_use]
    pub const fn new(access: DataAccess) -> Self {
        Self { access }
    }

    /// The full log table.
    pub async fn logs(&self) -> Reported<ResultTable> {
        reported(self.access.execute(LOGS_SQL).await)
    }

    /// Every stored stop as a [`LogRecord`].
    pub async fn records(&self) -> Reported<Vec<LogRecord>> {
        self.logs().await.map(|table| records::from_table(&table))
    }

    /// Total stops, arrests, warnings and drug related stops.
    ///
    /// Issues a single fetch of the log table and reduces it in memory.
    pub async fn summary_counts(&self) -> Reported<SummaryCounts> {
        self.logs()
            .await
            .map(|table| SummaryCounts::from_table(&table))
    }

    /// Number of stops per violation.
    pub async fn violation_breakdown(&self) -> Reported<ResultTable> {
        reported(self.access.execute(VIOLATION_BREAKDOWN_SQL).await)
    }

    /// Number of stops per driver gender.
    pub async fn gender_breakdown(&self) -> Reported<ResultTable> {
        reported(self.access.execute(GENDER_BREAKDOWN_SQL).await)
    }

    /// Summary counts, both breakdowns and day/night counts.
    ///
    /// The log table is fetched once and reduced in memory for the summary
    /// and the day/night counts. Notices from the three fetches are merged
    /// without repeats.
    pub async fn overview(&self) -> Reported<Overview> {
        let logs = self.logs().await;
        let violations = self.violation_breakdown().await;
        let genders = self.gender_breakdown().await;

        let mut notices = logs.notices;
        for notice in violations.notices.into_iter().chain(genders.notices) {
            if !notices.contains(&notice) {
                notices.push(notice);
            }
        }

        Reported {
            value: Overview {
                summary: SummaryCounts::from_table(&logs.value),
                violations: violations.value,
                genders: genders.value,
                time_of_day: time_of_day_counts(&records::from_table(&logs.value)),
            },
            notices,
        }
    }

    /// Runs one catalog entry.
    ///
    /// An empty result, including one caused by a failed fetch, is
    /// [`CatalogOutcome::NoResults`].
    pub async fn run_catalog_query(&self, query: CatalogQuery) -> Reported<CatalogOutcome> {
        let descriptor = query.descriptor();
        log::debug!("Running catalog query '{}'", descriptor.label);

        reported(self.access.execute(descriptor.statement()).await).map(CatalogOutcome::from_table)
    }

    /// Looks up a catalog entry by label and runs it.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Catalog`] if no entry has this label.
    pub async fn run_catalog_label(
        &self,
        label: &str,
    ) -> Result<Reported<CatalogOutcome>, AnalyticsError> {
        let descriptor = catalog::lookup(label)?;
        Ok(self.run_catalog_query(descriptor.id).await)
    }

    /// Distinct stop duration labels present in the data.
    pub async fn stop_durations(&self) -> Reported<Vec<String>> {
        self.records().await.map(|records| stop_durations(&records))
    }

    /// Predicts violation and outcome for a new stop.
    ///
    /// The candidate is validated before anything is fetched.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Predict`] if the candidate is invalid.
    pub async fn predict(
        &self,
        candidate: &CandidateRecord,
    ) -> Result<Reported<Prediction>, AnalyticsError> {
        predict::validate(candidate)?;

        let Reported { value, notices } = self.records().await;
        let prediction = predict::predict(&value, candidate)?;

        Ok(Reported {
            value: prediction,
            notices,
        })
    }
}

/// Distinct non-null stop durations in first-seen order.
#[must_use]
pub fn stop_durations(records: &[LogRecord]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    records
        .iter()
        .filter_map(|r| r.stop_duration.as_deref())
        .filter(|d| seen.insert(*d))
        .map(ToString::to_string)
        .collect()
}

/// Stop and arrest counts for day and night, in that order.
///
/// Stops without a time are not counted.
#[must_use]
pub fn time_of_day_counts(records: &[LogRecord]) -> Vec<TimeOfDayCount> {
    TimeOfDay::all()
        .iter()
        .map(|&bucket| {
            let stops = records
                .iter()
                .filter(|r| r.time_of_day() == Some(bucket));
            let (total_stops, total_arrests) = stops.fold((0, 0), |(n, a), r| {
                (n + 1, a + u64::from(r.is_arrested))
            });
            TimeOfDayCount {
                time_of_day: bucket,
                total_stops,
                total_arrests,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, NaiveTime};
    use securecheck_database::source::{QuerySource, StaticSource};
    use securecheck_database_models::CellValue;
    use securecheck_log_models::Gender;

    use super::*;

    const LOG_COLUMNS: [&str; 8] = [
        "stop_time",
        "driver_gender",
        "driver_age",
        "search_conducted",
        "drugs_related_stop",
        "stop_duration",
        "violation",
        "stop_outcome",
    ];

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn log_row(time: &str, drugs: i64, duration: &str, violation: &str, outcome: &str) -> Vec<CellValue> {
        vec![
            text(time),
            text("Male"),
            CellValue::Integer(30),
            CellValue::Integer(0),
            CellValue::Integer(drugs),
            text(duration),
            text(violation),
            text(outcome),
        ]
    }

    fn logs_table() -> ResultTable {
        ResultTable::new(LOG_COLUMNS)
            .with_row(log_row("22:10:00", 1, "0-15 Min", "Speeding", "ARRESTED"))
            .with_row(log_row("09:00:00", 0, "16-30 Min", "Speeding", "Warning issued"))
            .with_row(log_row("12:30:00", 0, "0-15 Min", "Equipment", "Citation"))
    }

    fn analytics(source: StaticSource) -> (Analytics, Arc<StaticSource>) {
        let source = Arc::new(source);
        let shared: Arc<dyn QuerySource> = source.clone();
        (Analytics::new(DataAccess::new(shared)), source)
    }

    fn candidate() -> CandidateRecord {
        CandidateRecord {
            stop_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            stop_time: NaiveTime::from_hms_opt(8, 5, 0).unwrap(),
            country_name: "Canada".to_string(),
            driver_gender: Gender::Male,
            driver_age: 30,
            driver_race: String::new(),
            search_conducted: false,
            search_type: String::new(),
            drugs_related_stop: false,
            stop_duration: "0-15 Min".to_string(),
            vehicle_number: "AB123".to_string(),
        }
    }

    #[tokio::test]
    async fn summary_counts_issue_one_fetch() {
        let (analytics, source) = analytics(StaticSource::new().with_table(LOGS_SQL, logs_table()));

        let summary = analytics.summary_counts().await;
        assert!(summary.notices.is_empty());
        assert_eq!(
            summary.value,
            SummaryCounts {
                total_stops: 3,
                arrests: 1,
                warnings: 1,
                drug_related_stops: 1,
            }
        );
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn empty_store_summarizes_to_zeros() {
        let (analytics, _) =
            analytics(StaticSource::new().with_table(LOGS_SQL, ResultTable::empty()));
        let summary = analytics.summary_counts().await;
        assert_eq!(summary.value, SummaryCounts::default());
        assert!(summary.notices.is_empty());
    }

    #[tokio::test]
    async fn unreachable_store_reports_no_results_with_notice() {
        let (analytics, _) = analytics(StaticSource::unreachable("Connection refused"));

        let outcome = analytics
            .run_catalog_query(CatalogQuery::NightArrests)
            .await;
        assert_eq!(outcome.value, CatalogOutcome::NoResults);
        assert_eq!(outcome.notices.len(), 1);
        assert!(outcome.notices[0].contains("Connection refused"));

        let summary = analytics.summary_counts().await;
        assert_eq!(summary.value, SummaryCounts::default());
        assert_eq!(summary.notices.len(), 1);
    }

    #[tokio::test]
    async fn catalog_query_returns_rows() {
        let night = ResultTable::new(["time_of_day", "total_stops", "total_arrests"])
            .with_row(vec![text("Day"), CellValue::Integer(2), CellValue::Integer(0)])
            .with_row(vec![text("Night"), CellValue::Integer(1), CellValue::Integer(1)]);
        let sql = CatalogQuery::NightArrests.descriptor().statement();
        let (analytics, _) = analytics(StaticSource::new().with_table(sql, night.clone()));

        let outcome = analytics
            .run_catalog_label("Stops are during the night more likely to lead to arrests")
            .await
            .unwrap();
        assert_eq!(outcome.value, CatalogOutcome::Rows { table: night });
        assert!(outcome.notices.is_empty());
    }

    #[tokio::test]
    async fn zero_row_catalog_result_is_no_results_without_notice() {
        let (analytics, _) = analytics(StaticSource::new().with_fallback(ResultTable::empty()));
        let outcome = analytics
            .run_catalog_query(CatalogQuery::TopDrugVehicles)
            .await;
        assert_eq!(outcome.value, CatalogOutcome::NoResults);
        assert!(outcome.notices.is_empty());
    }

    #[tokio::test]
    async fn average_stop_duration_runs_the_postgres_statement() {
        let averages = ResultTable::new(["violation", "average_of_stop_duration"])
            .with_row(vec![text("Speeding"), CellValue::Real(7.5)]);
        let descriptor = CatalogQuery::AverageStopDuration.descriptor();
        let (analytics, _) = analytics(
            StaticSource::new()
                .with_table(descriptor.statement(), averages.clone())
                .with_table(descriptor.sql, ResultTable::empty()),
        );

        let outcome = analytics
            .run_catalog_query(CatalogQuery::AverageStopDuration)
            .await;
        assert_eq!(outcome.value, CatalogOutcome::Rows { table: averages });
    }

    #[tokio::test]
    async fn overview_reduces_one_log_fetch() {
        let violations = ResultTable::new(["violation", "counts"])
            .with_row(vec![text("Speeding"), CellValue::Integer(2)]);
        let genders = ResultTable::new(["driver_gender", "count"])
            .with_row(vec![text("Male"), CellValue::Integer(3)]);
        let (analytics, source) = analytics(
            StaticSource::new()
                .with_table(LOGS_SQL, logs_table())
                .with_table(VIOLATION_BREAKDOWN_SQL, violations.clone())
                .with_table(GENDER_BREAKDOWN_SQL, genders.clone()),
        );

        let overview = analytics.overview().await;
        assert!(overview.notices.is_empty());
        assert_eq!(overview.value.summary.total_stops, 3);
        assert_eq!(overview.value.summary.arrests, 1);
        assert_eq!(overview.value.violations, violations);
        assert_eq!(overview.value.genders, genders);
        assert_eq!(overview.value.time_of_day[0].total_stops, 2);
        assert_eq!(overview.value.time_of_day[1].total_stops, 1);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn overview_reports_a_repeated_failure_once() {
        let (analytics, _) = analytics(StaticSource::unreachable("Connection refused"));

        let overview = analytics.overview().await;
        assert_eq!(overview.value.summary, SummaryCounts::default());
        assert!(overview.value.violations.is_empty());
        assert!(overview.value.genders.is_empty());
        assert_eq!(overview.notices.len(), 1);
        assert!(overview.notices[0].contains("Connection refused"));
    }

    #[test]
    fn blank_durations_are_kept_like_any_other_value() {
        let stops = records::from_table(
            &ResultTable::new(["stop_duration"])
                .with_row(vec![text("0-15 Min")])
                .with_row(vec![CellValue::Null])
                .with_row(vec![text(" ")])
                .with_row(vec![text("0-15 Min")]),
        );
        assert_eq!(stop_durations(&stops), vec!["0-15 Min".to_string(), " ".to_string()]);
    }

    #[tokio::test]
    async fn unknown_label_is_rejected() {
        let (analytics, source) = analytics(StaticSource::new());
        let result = analytics.run_catalog_label("Which cars are blue").await;
        assert!(matches!(result, Err(AnalyticsError::Catalog(_))));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn breakdowns_use_their_own_statements() {
        let violations = ResultTable::new(["violation", "counts"])
            .with_row(vec![text("Speeding"), CellValue::Integer(2)]);
        let (analytics, _) = analytics(
            StaticSource::new().with_table(VIOLATION_BREAKDOWN_SQL, violations.clone()),
        );

        assert_eq!(analytics.violation_breakdown().await.value, violations);
        let genders = analytics.gender_breakdown().await;
        assert!(genders.value.is_empty());
        assert_eq!(genders.notices.len(), 1);
    }

    #[tokio::test]
    async fn stop_durations_are_distinct_in_first_seen_order() {
        let (analytics, _) = analytics(StaticSource::new().with_table(LOGS_SQL, logs_table()));
        assert_eq!(
            analytics.stop_durations().await.value,
            vec!["0-15 Min".to_string(), "16-30 Min".to_string()]
        );
    }

    #[tokio::test]
    async fn predict_uses_stored_stops() {
        let (analytics, _) = analytics(StaticSource::new().with_table(LOGS_SQL, logs_table()));
        let prediction = analytics.predict(&candidate()).await.unwrap();

        assert_eq!(prediction.value.predicted_violation, "Equipment");
        assert_eq!(prediction.value.predicted_outcome, "Citation");
        assert_eq!(prediction.value.matched_records, 1);
    }

    #[tokio::test]
    async fn predict_validates_before_fetching() {
        let (analytics, source) = analytics(StaticSource::new().with_table(LOGS_SQL, logs_table()));
        let mut c = candidate();
        c.driver_age = 12;

        assert!(matches!(
            analytics.predict(&c).await,
            Err(AnalyticsError::Predict(_))
        ));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn predict_falls_back_when_store_is_down() {
        let (analytics, _) = analytics(StaticSource::unreachable("timeout"));
        let prediction = analytics.predict(&candidate()).await.unwrap();
        assert!(prediction.value.used_defaults);
        assert_eq!(prediction.notices.len(), 1);
    }

    #[test]
    fn day_and_night_counts() {
        let mut stops = records::from_table(
            &logs_table().with_row(log_row("00:15:00", 0, "0-15 Min", "DUI", "Arrest")),
        );
        stops[0].is_arrested = true;
        stops[3].is_arrested = true;

        let counts = time_of_day_counts(&stops);
        assert_eq!(
            counts,
            vec![
                TimeOfDayCount {
                    time_of_day: TimeOfDay::Day,
                    total_stops: 2,
                    total_arrests: 0,
                },
                TimeOfDayCount {
                    time_of_day: TimeOfDay::Night,
                    total_stops: 2,
                    total_arrests: 2,
                },
            ]
        );
    }
}
