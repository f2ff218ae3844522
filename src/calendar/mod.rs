//! Bank holiday lookup.
//!
//! [`resolve_bank_holidays`] asks a [`HolidayCalendar`] for every year of a
//! range and reports either the resolved dates or, for countries the
//! calendar cannot answer, a minimal fallback set so that forecast
//! generation can carry on.

mod countries;
mod rules;

pub use countries::{available_countries, has_holiday_rules};
pub use rules::{dates_for_year, easter_sunday, DateRule, HolidayDef, Observance};

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// Source of public holidays.
pub trait HolidayCalendar: Send + Sync {
    /// Public holidays of `country` falling in calendar year `year`.
    ///
    /// An error means the country is unsupported or the lookup failed.
    fn holidays(&self, country: &str, year: i32) -> Result<BTreeSet<NaiveDate>>;
}

/// Built-in calendar driven by per-country [`HolidayDef`] tables.
///
/// Codes are matched case-insensitively.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleCalendar;

impl RuleCalendar {
    pub fn supports(&self, country: &str) -> bool {
        countries::rules_for(&country.to_ascii_uppercase()).is_some()
    }
}

impl HolidayCalendar for RuleCalendar {
    fn holidays(&self, country: &str, year: i32) -> Result<BTreeSet<NaiveDate>> {
        let code = country.to_ascii_uppercase();
        let defs = countries::rules_for(&code).ok_or_else(|| {
            ForecastError::InvalidParameter(format!("no holiday rules for country '{country}'"))
        })?;

        // Observed days of next year's holidays can land on this year's
        // last days, and vice versa.
        Ok((year - 1..=year + 1)
            .flat_map(|y| dates_for_year(defs, y))
            .filter(|d| d.year() == year)
            .collect())
    }
}

/// Outcome of a holiday lookup over a year range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HolidayResolution {
    /// Sorted, deduplicated holiday dates.
    Resolved(Vec<NaiveDate>),
    /// The calendar could not answer for `country`; `fallback` holds
    /// January 1 and December 25 of every year in the range.
    Unsupported {
        country: String,
        fallback: Vec<NaiveDate>,
    },
}

impl HolidayResolution {
    /// Dates to zero out, whichever way they were obtained.
    pub fn dates(&self) -> &[NaiveDate] {
        match self {
            HolidayResolution::Resolved(dates) => dates,
            HolidayResolution::Unsupported { fallback, .. } => fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, HolidayResolution::Unsupported { .. })
    }
}

/// January 1 and December 25 for every year in `start_year..=end_year`.
pub fn fallback_holidays(start_year: i32, end_year: i32) -> Vec<NaiveDate> {
    (start_year..=end_year)
        .flat_map(|y| [NaiveDate::from_ymd_opt(y, 1, 1), NaiveDate::from_ymd_opt(y, 12, 25)])
        .flatten()
        .collect()
}

/// Holidays of `country` for every year in `start_year..=end_year`.
///
/// Any lookup failure switches the whole range to the fallback set.
pub fn resolve_bank_holidays(
    calendar: &dyn HolidayCalendar,
    country: &str,
    start_year: i32,
    end_year: i32,
) -> HolidayResolution {
    let mut dates = BTreeSet::new();
    for year in start_year..=end_year {
        match calendar.holidays(country, year) {
            Ok(found) => dates.extend(found),
            Err(e) => {
                warn!(country, year, error = %e, "holiday lookup failed, using fallback set");
                return HolidayResolution::Unsupported {
                    country: country.to_string(),
                    fallback: fallback_holidays(start_year, end_year),
                };
            }
        }
    }
    HolidayResolution::Resolved(dates.into_iter().collect())
}
