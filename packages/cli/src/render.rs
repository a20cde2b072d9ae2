//! Plain-text rendering of tables and analytics for the terminal.

use std::fmt::Write as _;

use securecheck_analytics_models::{Overview, Prediction, SummaryCounts, TimeOfDayCount};
use securecheck_database_models::ResultTable;

/// Renders a table with left-aligned, padded columns and a separator
/// under the header.
#[must_use]
pub fn table(table: &ResultTable) -> String {
    let cells: Vec<Vec<String>> = table
        .raw_rows()
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row.get(i).map_or(0, |c| c.chars().count()))
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, table.columns().iter().map(String::as_str), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Renders the four headline metrics.
#[must_use]
pub fn summary(counts: &SummaryCounts) -> String {
    format!(
        "Total police stops:  {}\nTotal arrests:       {}\nTotal warnings:      {}\nDrug related stops:  {}\n",
        counts.total_stops, counts.arrests, counts.warnings, counts.drug_related_stops
    )
}

/// Renders day/night stop and arrest counts.
#[must_use]
pub fn time_of_day(counts: &[TimeOfDayCount]) -> String {
    let mut out = String::new();
    for c in counts {
        let _ = writeln!(
            out,
            "{:<6} {} stop(s), {} arrest(s)",
            c.time_of_day.as_ref(),
            c.total_stops,
            c.total_arrests
        );
    }
    out
}

/// Renders the analytics page: summary, both breakdowns and day/night
/// counts.
#[must_use]
pub fn overview(overview: &Overview) -> String {
    format!(
        "{}\nViolations\n\n{}\nDriver gender\n\n{}\nTime of day\n\n{}",
        summary(&overview.summary),
        table(&overview.violations),
        table(&overview.genders),
        time_of_day(&overview.time_of_day)
    )
}

/// Renders a prediction.
#[must_use]
pub fn prediction(prediction: &Prediction) -> String {
    let basis = if prediction.used_defaults {
        "no matching stops, using defaults".to_string()
    } else {
        format!("{} matching stop(s)", prediction.matched_records)
    };
    format!(
        "Predicted violation: {}\nPredicted outcome:   {}\nBased on:            {basis}\n\n{}\n",
        prediction.predicted_violation, prediction.predicted_outcome, prediction.summary
    )
}
