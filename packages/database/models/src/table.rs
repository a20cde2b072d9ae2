use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A single cell of a [`ResultTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// SQL `NULL`.
    Null,
    /// Boolean column.
    Bool(bool),
    /// Any integer width.
    Integer(i64),
    /// Floating point or rounded numeric.
    Real(f64),
    /// Text column.
    Text(String),
    /// `TIMESTAMP` column.
    Timestamp(NaiveDateTime),
}

impl CellValue {
    /// Returns the text content, if this is a text cell.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the cell rendered as a string, or `None` for `NULL`.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Returns the integer value, converting whole reals and numeric text.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Real(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interprets a `0`/`1` flag column.
    ///
    /// Integers, booleans and `"0"`/`"1"` text are all accepted so the
    /// comparison never depends on how the store typed the column.
    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(s) => securecheck_log_models::flag::parse(s),
            other => other.as_i64().and_then(securecheck_log_models::flag::from_int),
        }
    }

    /// Returns the date, parsing ISO text and truncating timestamps.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Timestamp(ts) => Some(ts.date()),
            Self::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
            _ => None,
        }
    }

    /// Returns the time of day, parsing `HH:MM[:SS]` text.
    #[must_use]
    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Self::Timestamp(ts) => Some(ts.time()),
            Self::Text(s) => {
                let s = s.trim();
                NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
                    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
                    .ok()
            }
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Ordered rows with declared column names.
///
/// Every row has exactly one cell per column. The empty table (zero rows,
/// zero columns) is what the data access layer hands back when the store
/// could not be reached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl ResultTable {
    /// Creates a table with the given columns and no rows.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// The zero-row, zero-column table.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding with `NULL` or truncating so it matches the
    /// column count.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Null);
        self.rows.push(row);
    }

    /// Builder form of [`Self::push_row`].
    #[must_use]
    pub fn with_row(mut self, row: Vec<CellValue>) -> Self {
        self.push_row(row);
        self
    }

    /// Declared column names, in select-list order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column. Exact matches win over case-insensitive ones,
    /// since Postgres folds unquoted aliases to lower case.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name).or_else(|| {
            self.columns
                .iter()
                .position(|c| c.eq_ignore_ascii_case(name))
        })
    }

    /// Iterates rows in order.
    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(|cells| RowRef { table: self, cells })
    }

    /// Iterates the values of one column; yields nothing if the column
    /// does not exist.
    pub fn column_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a CellValue> + 'a {
        let idx = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |row| idx.and_then(|i| row.get(i)))
    }

    /// Raw cells of every row.
    #[must_use]
    pub fn raw_rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }
}

/// Borrowed view of one table row, addressable by column name.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a ResultTable,
    cells: &'a [CellValue],
}

impl<'a> RowRef<'a> {
    /// Cell for `column`, or `None` if the table has no such column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        self.table
            .column_index(column)
            .and_then(|i| self.cells.get(i))
    }

    /// Non-null text rendering of `column`.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).and_then(CellValue::to_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultTable {
        ResultTable::new(["violation", "counts"])
            .with_row(vec![CellValue::Text("Speeding".into()), CellValue::Integer(4)])
            .with_row(vec![CellValue::Text("DUI".into())])
    }

    #[test]
    fn empty_table_has_no_rows_or_columns() {
        let table = ResultTable::empty();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert!(table.columns().is_empty());
        assert_eq!(table.column_values("anything").count(), 0);
    }

    #[test]
    fn short_rows_are_padded_with_null() {
        let table = sample();
        let second = table.rows().nth(1).unwrap();
        assert_eq!(second.get("counts"), Some(&CellValue::Null));
        assert_eq!(second.text("violation").as_deref(), Some("DUI"));
    }

    #[test]
    fn column_lookup_falls_back_to_case_insensitive() {
        let table = ResultTable::new(["average_of_stop_duration"]);
        assert_eq!(table.column_index("Average_of_stop_duration"), Some(0));
        assert_eq!(table.column_index("missing"), None);
    }

    #[test]
    fn flags_accept_ints_bools_and_text() {
        assert_eq!(CellValue::Integer(1).as_flag(), Some(true));
        assert_eq!(CellValue::Bool(false).as_flag(), Some(false));
        assert_eq!(CellValue::Text("0".into()).as_flag(), Some(false));
        assert_eq!(CellValue::Real(1.0).as_flag(), Some(true));
        assert_eq!(CellValue::Integer(7).as_flag(), None);
        assert_eq!(CellValue::Null.as_flag(), None);
    }

    #[test]
    fn dates_and_times_parse_from_text() {
        assert_eq!(
            CellValue::Text("2020-01-15".into()).as_date(),
            NaiveDate::from_ymd_opt(2020, 1, 15)
        );
        assert_eq!(
            CellValue::Text("22:05".into()).as_time(),
            NaiveTime::from_hms_opt(22, 5, 0)
        );
        assert_eq!(
            CellValue::Text("08:30:12".into()).as_time(),
            NaiveTime::from_hms_opt(8, 30, 12)
        );
    }

    #[test]
    fn serializes_cells_untagged() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["columns"][0], "violation");
        assert_eq!(json["rows"][0][1], 4);
        assert!(json["rows"][1][1].is_null());
    }
}
