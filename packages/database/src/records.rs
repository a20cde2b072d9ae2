//! Mapping of `SELECT * FROM Police_Post_Logs` tables to [`LogRecord`]s.

use securecheck_database_models::{CellValue, ResultTable, RowRef};
use securecheck_log_models::LogRecord;

/// Converts every row of a log table into a [`LogRecord`].
///
/// Missing columns and `NULL`s become `None`; flag columns that are
/// missing or unreadable count as `false`.
#[must_use]
pub fn from_table(table: &ResultTable) -> Vec<LogRecord> {
    table.rows().map(|row| from_row(&row)).collect()
}

fn from_row(row: &RowRef<'_>) -> LogRecord {
    let flag = |col: &str| row.get(col).and_then(CellValue::as_flag).unwrap_or(false);

    LogRecord {
        stop_date: row.get("stop_date").and_then(CellValue::as_date),
        stop_time: row.get("stop_time").and_then(CellValue::as_time),
        country_name: row.text("country_name"),
        driver_gender: row.text("driver_gender"),
        driver_age: row.get("driver_age").and_then(CellValue::as_i64),
        driver_race: row.text("driver_race"),
        search_conducted: flag("search_conducted"),
        search_type: row.text("search_type"),
        drugs_related_stop: flag("drugs_related_stop"),
        stop_duration: row.text("stop_duration"),
        vehicle_number: row.text("vehicle_number"),
        violation: row.text("violation"),
        stop_outcome: row.text("stop_outcome"),
        is_arrested: flag("is_arrested"),
    }
}
