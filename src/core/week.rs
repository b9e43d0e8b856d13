//! Week bucket arithmetic.
//!
//! Orders and weekmenus are keyed by an ISO (week, year) pair. This module provides
//! the `WeekKey` value type, resolution of "now" into a key, the SQL condition for
//! "strictly after a key", and calendar quarter bounds for the dashboard.

use crate::errors::{Error, Result};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use sea_orm::{ColumnTrait, Condition};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest accepted year for a week bucket
pub const MIN_YEAR: i32 = 2020;
/// Highest accepted year for a week bucket
pub const MAX_YEAR: i32 = 2100;

/// An ISO (week, year) bucket.
///
/// Field order matters: the derived `Ord` compares year first, then week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekKey {
    /// ISO week-based year
    pub year: i32,
    /// ISO week number (1-53)
    pub week: i32,
}

impl WeekKey {
    /// Creates a key without validating it.
    #[must_use]
    pub const fn new(week: i32, year: i32) -> Self {
        Self { year, week }
    }

    /// Creates a key, rejecting weeks outside 1-53 and years outside 2020-2100.
    pub fn validated(week: i32, year: i32) -> Result<Self> {
        if !(1..=53).contains(&week) {
            return Err(Error::Validation {
                field: "week",
                message: format!("must be between 1 and 53, got {week}"),
            });
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(Error::Validation {
                field: "year",
                message: format!("must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"),
            });
        }
        Ok(Self::new(week, year))
    }

    /// The ISO week containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        // ISO week numbers are 1-53
        #[allow(clippy::cast_possible_wrap)]
        let week = iso.week() as i32;
        Self::new(week, iso.year())
    }

    /// The ISO week containing the instant `now`.
    #[must_use]
    pub fn containing(now: DateTime<Utc>) -> Self {
        Self::from_date(now.date_naive())
    }

    /// The ISO week containing the current instant.
    #[must_use]
    pub fn current() -> Self {
        Self::containing(Utc::now())
    }

    /// Fills in whichever of `week`/`year` is missing from the week containing `now`,
    /// then validates the result.
    pub fn resolve(week: Option<i32>, year: Option<i32>, now: DateTime<Utc>) -> Result<Self> {
        let current = Self::containing(now);
        Self::validated(week.unwrap_or(current.week), year.unwrap_or(current.year))
    }

    /// Whether this bucket lies strictly after `other`.
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self > other
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week {}/{}", self.week, self.year)
    }
}

/// SQL condition matching rows whose (`year_col`, `week_col`) lies strictly after `key`:
/// `year > Y OR (year = Y AND week > W)`.
pub fn after_condition<C>(year_col: C, week_col: C, key: WeekKey) -> Condition
where
    C: ColumnTrait,
{
    Condition::any().add(year_col.gt(key.year)).add(
        Condition::all()
            .add(year_col.eq(key.year))
            .add(week_col.gt(key.week)),
    )
}

/// SQL condition matching rows in exactly the `key` bucket.
pub fn bucket_condition<C>(year_col: C, week_col: C, key: WeekKey) -> Condition
where
    C: ColumnTrait,
{
    Condition::all()
        .add(year_col.eq(key.year))
        .add(week_col.eq(key.week))
}

/// Calendar quarter (1-4) of `date`.
#[must_use]
pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// First instant of the calendar quarter containing `now` and first instant of the next one.
///
/// The range is half-open: `start <= t < end`.
pub fn quarter_bounds(now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let quarter = quarter_of(now.date_naive());
    let start_month = (quarter - 1) * 3 + 1;
    let (end_year, end_month) = if quarter == 4 {
        (now.year() + 1, 1)
    } else {
        (now.year(), start_month + 3)
    };

    let start = Utc
        .with_ymd_and_hms(now.year(), start_month, 1, 0, 0, 0)
        .single();
    let end = Utc.with_ymd_and_hms(end_year, end_month, 1, 0, 0, 0).single();

    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(Error::Config {
            message: format!("Cannot compute quarter bounds for {now}"),
        }),
    }
}
