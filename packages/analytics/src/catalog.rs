//! The fixed catalog of analytical questions.
//!
//! Each entry is a hand-written, parameterless aggregation over
//! `Police_Post_Logs`. Entries are independent of each other: age buckets,
//! tie-break orderings and row limits differ between entries on purpose
//! and must not be unified.

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// Errors from catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// No entry has this label.
    #[error("unknown catalog label: '{0}'")]
    UnknownLabel(String),

    /// No entry has this id.
    #[error("unknown catalog query id: '{0}'")]
    UnknownId(String),
}

/// Identifier of one catalog entry.
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
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CatalogQuery {
    TopDrugVehicles,
    MostSearchedVehicle,
    AgeGroupArrestRate,
    GenderByCountry,
    BusiestHour,
    AverageStopDuration,
    RaceGenderSearchRate,
    NightArrests,
    ViolationsMostArrests,
    YoungDriverViolations,
    ViolationsRarelyArrested,
    DrugStopRateByCountry,
    ArrestRateByCountryViolation,
    MostSearchedCountry,
    YearlyStopsByCountry,
    ViolationTrendsByAgeRace,
    StopsByYearMonthHour,
    ViolationArrestRank,
    DemographicsByCountry,
    TopArrestRateViolations,
}

impl CatalogQuery {
    /// Returns all variants in catalog order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::TopDrugVehicles,
            Self::MostSearchedVehicle,
            Self::AgeGroupArrestRate,
            Self::GenderByCountry,
            Self::BusiestHour,
            Self::AverageStopDuration,
            Self::RaceGenderSearchRate,
            Self::NightArrests,
            Self::ViolationsMostArrests,
            Self::YoungDriverViolations,
            Self::ViolationsRarelyArrested,
            Self::DrugStopRateByCountry,
            Self::ArrestRateByCountryViolation,
            Self::MostSearchedCountry,
            Self::YearlyStopsByCountry,
            Self::ViolationTrendsByAgeRace,
            Self::StopsByYearMonthHour,
            Self::ViolationArrestRank,
            Self::DemographicsByCountry,
            Self::TopArrestRateViolations,
        ]
    }

    /// The descriptor for this entry.
    #[must_use]
    pub fn descriptor(self) -> &'static QueryDescriptor {
        &CATALOG[self as usize]
    }

    /// Parses a kebab-case id such as `night-arrests`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownId`] if no entry has this id.
    pub fn from_id(id: &str) -> Result<Self, CatalogError> {
        id.parse()
            .map_err(|_| CatalogError::UnknownId(id.to_string()))
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryDescriptor {
    /// Stable identifier.
    pub id: CatalogQuery,
    /// The question as shown to the operator.
    pub label: &'static str,
    /// The statement as historically written against MySQL.
    pub sql: &'static str,
    /// Postgres form of `sql`, for statements that rely on MySQL's implicit
    /// text to number coercion.
    pub postgres: Option<&'static str>,
    /// Output columns, as the store names them.
    pub columns: &'static [&'static str],
}

impl QueryDescriptor {
    /// The statement sent to the store.
    #[must_use]
    pub fn statement(&self) -> &'static str {
        self.postgres.unwrap_or(self.sql)
    }
}

/// Looks up an entry by its label.
///
/// Surrounding whitespace in `label` is ignored.
///
/// # Errors
///
/// Returns [`CatalogError::UnknownLabel`] if no entry has this label.
pub fn lookup(label: &str) -> Result<&'static QueryDescriptor, CatalogError> {
    let wanted = label.trim();
    CATALOG
        .iter()
        .find(|d| d.label == wanted)
        .ok_or_else(|| CatalogError::UnknownLabel(label.to_string()))
}

/// All entries in catalog order.
#[must_use]
pub fn descriptors() -> &'static [QueryDescriptor] {
    &CATALOG
}

/// The selectable labels, in catalog order.
pub fn labels() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|d| d.label)
}

static CATALOG: [QueryDescriptor; 20] = [
    QueryDescriptor {
        id: CatalogQuery::TopDrugVehicles,
        label: "Top 10 vehicle_number involved in drug_related stops",
        sql: "select vehicle_number from Police_Post_Logs where drugs_related_stop=1 order by vehicle_number desc limit 10",
        postgres: None,
        columns: &["vehicle_number"],
    },
    QueryDescriptor {
        id: CatalogQuery::MostSearchedVehicle,
        label: "Most frequently searched vehicle",
        sql: "select vehicle_number, count(*) as count from Police_Post_Logs group by vehicle_number order by vehicle_number desc limit 1",
        postgres: None,
        columns: &["vehicle_number", "count"],
    },
    QueryDescriptor {
        id: CatalogQuery::AgeGroupArrestRate,
        label: "Driver age group had the highest arrest rate",
        sql: "select case
                when driver_age between 18 and 25 then '18-25'
                when driver_age between 26 and 35 then '26-35'
                when driver_age between 36 and 45 then '36-45'
                when driver_age between 45 and 60 then '45-60'
                else '60+'
              end as age_group,count(*) as total_driver,
              sum(case when is_arrested=1 then 1 else 0 end) as total_arrests,
              round(sum(case when is_arrested=1 then 1 else 0 end)*100.0/count(*),2) as arrest_rate_percent
              from Police_Post_Logs group by age_group
              order by arrest_rate_percent desc limit 1",
        postgres: None,
        columns: &["age_group", "total_driver", "total_arrests", "arrest_rate_percent"],
    },
    QueryDescriptor {
        id: CatalogQuery::GenderByCountry,
        label: "Gender Distribution of Drivers stopped in each Country",
        sql: "select country_name,driver_gender,count(*) as total_gender,
              ROUND(100.0 * COUNT(*) / SUM(COUNT(*)) OVER (PARTITION BY country_name), 2) AS gender_percent
              from Police_Post_Logs
              group by country_name,driver_gender
              order by country_name, driver_gender",
        postgres: None,
        columns: &["country_name", "driver_gender", "total_gender", "gender_percent"],
    },
    QueryDescriptor {
        id: CatalogQuery::BusiestHour,
        label: "Time of day sees the most traffic stops",
        sql: "select extract(hour from stop_time) as hour_of_day, count(*) as total_stops
              from Police_Post_Logs
              group by extract(hour from stop_time)
              order by total_stops desc
              limit 1",
        postgres: None,
        columns: &["hour_of_day", "total_stops"],
    },
    QueryDescriptor {
        id: CatalogQuery::AverageStopDuration,
        label: "Average stop duration for different violations",
        sql: "select violation, avg(stop_duration) as Average_of_stop_duration
              from Police_Post_Logs
              group by violation
              order by violation
              desc",
        // MySQL averages the numeric prefix of each bucket ("16-30 Min" is
        // 16, a bucket without digits is 0); Postgres rejects avg(text).
        postgres: Some(
            "select violation,
              avg(case when stop_duration is not null
                then coalesce(cast(substring(stop_duration from '^ *[0-9]+') as double precision), 0)
              end) as Average_of_stop_duration
              from Police_Post_Logs
              group by violation
              order by violation
              desc",
        ),
        columns: &["violation", "average_of_stop_duration"],
    },
    QueryDescriptor {
        id: CatalogQuery::RaceGenderSearchRate,
        label: "Highest search rate of race and gender combination",
        sql: "select driver_race,driver_gender, count(*) as total_gender,
              round(100.0* count(*)/ sum(count(*)) over (partition by driver_race),2) as gender_percent
              from Police_Post_Logs
              group by driver_race, driver_gender
              order by driver_race
              desc limit 2",
        postgres: None,
        columns: &["driver_race", "driver_gender", "total_gender", "gender_percent"],
    },
    QueryDescriptor {
        id: CatalogQuery::NightArrests,
        label: "Stops are during the night more likely to lead to arrests",
        sql: "select case
                when extract(hour from stop_time) between 20 and 23 or extract(hour from stop_time) between 0 and 5 then 'Night'
                else 'Day'
              end as time_of_day,
              count(*) as total_stops,
              sum(case when is_arrested=1 then 1 else 0 end) as total_arrests
              from Police_Post_Logs
              group by time_of_day
              order by time_of_day",
        postgres: None,
        columns: &["time_of_day", "total_stops", "total_arrests"],
    },
    QueryDescriptor {
        id: CatalogQuery::ViolationsMostArrests,
        label: "Which violations are most associated with searches or arrests",
        sql: "select violation,count(*) as total_stops,
              sum(case when is_arrested=1 then 1 else 0 end) as total_arrests
              from Police_Post_Logs
              group by violation
              order by total_arrests
              desc limit 1",
        postgres: None,
        columns: &["violation", "total_stops", "total_arrests"],
    },
    QueryDescriptor {
        id: CatalogQuery::YoungDriverViolations,
        label: "Which violations are most common among younger drivers (<25)",
        sql: "select violation,count(*) as total_stops,
              sum(case when driver_age <25 then 1 else 0 end) as number_of_driver_under_25
              from Police_Post_Logs
              group by violation
              order by number_of_driver_under_25
              desc limit 1",
        postgres: None,
        columns: &["violation", "total_stops", "number_of_driver_under_25"],
    },
    QueryDescriptor {
        id: CatalogQuery::ViolationsRarelyArrested,
        label: "Is there a violation that rarely results in search or arrest",
        sql: "select violation,count(*) as total_stops,
              sum(case when is_arrested=1 then 1 else 0 end) as total_arrests
              from Police_Post_Logs
              group by violation
              order by total_arrests
              asc limit 1",
        postgres: None,
        columns: &["violation", "total_stops", "total_arrests"],
    },
    QueryDescriptor {
        id: CatalogQuery::DrugStopRateByCountry,
        label: "Which countries report the highest rate of drug-related stops",
        sql: "select country_name, count(*) as total_stops,
              sum(case when drugs_related_stop=1 then 1 else 0 end) as total_drug_related_stop,
              ROUND(100.0 * sum(case when drugs_related_stop=1 then 1 else 0 end)/ COUNT(*), 2) AS drug_stop_rate_percent
              from Police_Post_Logs
              group by country_name
              order by drug_stop_rate_percent
              desc limit 1",
        postgres: None,
        columns: &[
            "country_name",
            "total_stops",
            "total_drug_related_stop",
            "drug_stop_rate_percent",
        ],
    },
    QueryDescriptor {
        id: CatalogQuery::ArrestRateByCountryViolation,
        label: "What is the arrest rate by country and violation",
        sql: "select country_name,count(*) as total_stops, violation,
              sum(case when is_arrested=1 then 1 else 0 end) as total_arrests,
              round(100.0*sum(case when is_arrested=1 then 1 else 0 end)/count(*),2) as total_arrest_percent
              from Police_Post_Logs
              group by country_name, violation
              order by country_name",
        postgres: None,
        columns: &[
            "country_name",
            "total_stops",
            "violation",
            "total_arrests",
            "total_arrest_percent",
        ],
    },
    QueryDescriptor {
        id: CatalogQuery::MostSearchedCountry,
        label: "Which country has the most stops with search conducted",
        sql: "select country_name, count(*) as total_stops
              from Police_Post_Logs
              group by country_name
              order by total_stops
              desc limit 1",
        postgres: None,
        columns: &["country_name", "total_stops"],
    },
    QueryDescriptor {
        id: CatalogQuery::YearlyStopsByCountry,
        label: "Yearly Breakdown of Stops and Arrests by Country",
        sql: "select year,country_name,total_stops,total_arrests
              from(select year,country_name,total_stops,total_arrests,
              sum(total_stops) over (partition by year) as yearly_total_stops,
              sum(total_arrests) over (partition by year) as yearly_total_arrests
              from
              (select extract(year from stop_date) as year,country_name,count(*) as total_stops,
              sum(case when is_arrested=1 then 1 else 0 end)as total_arrests
              from Police_Post_Logs
              group by extract(year from stop_date), country_name) as agg_data
              ) as base_data
              order by year,country_name",
        postgres: None,
        columns: &["year", "country_name", "total_stops", "total_arrests"],
    },
    QueryDescriptor {
        id: CatalogQuery::ViolationTrendsByAgeRace,
        label: "Driver Violation Trends Based on Age and Race",
        sql: "select driver_age,driver_race,violation,count(*) as total_violation
              from
              (select case
                WHEN driver_age < 20 THEN '<20'
                WHEN driver_age BETWEEN 20 AND 29 THEN '20-29'
                WHEN driver_age BETWEEN 30 AND 39 THEN '30-39'
                WHEN driver_age BETWEEN 40 AND 49 THEN '40-49'
                WHEN driver_age >= 50 THEN '50+'
              END AS driver_age, driver_race,violation
              FROM Police_Post_Logs) AS grouped_data
              GROUP BY driver_age, driver_race, violation
              ORDER BY driver_age,driver_race, violation",
        postgres: None,
        columns: &["driver_age", "driver_race", "violation", "total_violation"],
    },
    QueryDescriptor {
        id: CatalogQuery::StopsByYearMonthHour,
        label: "Number of Stops by Year,Month, Hour of the Day",
        sql: "select extract(year from stop_date) as year,
              extract(month from stop_date) as month,
              extract(hour from stop_time) as hour,
              count(*) as total_stops
              from Police_Post_Logs
              group by
              extract(year from stop_date),
              extract(month from stop_date),
              extract(hour from stop_time)
              order by year,month,hour",
        postgres: None,
        columns: &["year", "month", "hour", "total_stops"],
    },
    QueryDescriptor {
        id: CatalogQuery::ViolationArrestRank,
        label: "Violations with High Search and Arrest Rates",
        sql: "SELECT violation,total_stops,total_arrests,
              ROUND(100.0 * total_arrests / NULLIF(total_stops, 0), 2) AS arrest_rate_percent,
              RANK() OVER (ORDER BY ROUND(100.0 * total_arrests / NULLIF(total_stops, 0), 2) DESC) AS arrest_rate_rank
              from
              (SELECT violation,COUNT(*) AS total_stops,
               COUNT(CASE WHEN is_arrested = 1 THEN 1 END) AS total_arrests
               FROM Police_Post_Logs
               GROUP BY violation
              ) AS agg
              ORDER BY arrest_rate_percent DESC",
        postgres: None,
        columns: &[
            "violation",
            "total_stops",
            "total_arrests",
            "arrest_rate_percent",
            "arrest_rate_rank",
        ],
    },
    QueryDescriptor {
        id: CatalogQuery::DemographicsByCountry,
        label: "Driver Demographics by Country (Age, Gender, and Race)",
        sql: "SELECT country_name,driver_gender,driver_race,
              CASE
                WHEN driver_age < 20 THEN '<20'
                WHEN driver_age BETWEEN 20 AND 29 THEN '20-29'
                WHEN driver_age BETWEEN 30 AND 39 THEN '30-39'
                WHEN driver_age BETWEEN 40 AND 49 THEN '40-49'
                WHEN driver_age BETWEEN 50 AND 59 THEN '50-59'
                ELSE '60+'
              END AS age_group,
              COUNT(*) AS total_drivers
              FROM Police_Post_Logs
              GROUP BY
              country_name,driver_gender,driver_race,
              CASE
                WHEN driver_age < 20 THEN '<20'
                WHEN driver_age BETWEEN 20 AND 29 THEN '20-29'
                WHEN driver_age BETWEEN 30 AND 39 THEN '30-39'
                WHEN driver_age BETWEEN 40 AND 49 THEN '40-49'
                WHEN driver_age BETWEEN 50 AND 59 THEN '50-59'
                ELSE '60+'
              END
              ORDER BY country_name, driver_gender, driver_race, age_group",
        postgres: None,
        columns: &[
            "country_name",
            "driver_gender",
            "driver_race",
            "age_group",
            "total_drivers",
        ],
    },
    QueryDescriptor {
        id: CatalogQuery::TopArrestRateViolations,
        label: "Top 5 Violations with Highest Arrest Rates",
        sql: "select violation, count(*) as total_stops,
              count(case when is_arrested=1 then 1 end) as total_arrests,
              round(100.0*count(case when is_arrested=1 then 1 end)/nullif(count(*),0),2)as arrest_rate_percent
              from Police_Post_Logs
              group by violation
              order by arrest_rate_percent desc
              limit 5",
        postgres: None,
        columns: &["violation", "total_stops", "total_arrests", "arrest_rate_percent"],
    },
];
