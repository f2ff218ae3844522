//! Date rules for public holidays.
//!
//! Deterministic and pure: every rule maps a year to at most one date.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// How a holiday's date is found within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
    /// Same calendar date every year.
    Fixed { month: u32, day: u32 },
    /// `n`-th given weekday of the month (1-based).
    NthWeekday { month: u32, weekday: Weekday, n: u32 },
    /// Last given weekday of the month.
    LastWeekday { month: u32, weekday: Weekday },
    /// First given weekday on or after a date.
    WeekdayOnOrAfter { month: u32, day: u32, weekday: Weekday },
    /// Last given weekday on or before a date.
    WeekdayOnOrBefore { month: u32, day: u32, weekday: Weekday },
    /// Days relative to Western Easter Sunday.
    EasterOffset(i64),
}

impl DateRule {
    pub fn date_in(&self, year: i32) -> Option<NaiveDate> {
        match *self {
            DateRule::Fixed { month, day } => NaiveDate::from_ymd_opt(year, month, day),
            DateRule::NthWeekday { month, weekday, n } => {
                NaiveDate::from_weekday_of_month_opt(year, month, weekday, n as u8)
            }
            DateRule::LastWeekday { month, weekday } => {
                let last = last_day_of_month(year, month)?;
                let back = (7 + last.weekday().num_days_from_monday()
                    - weekday.num_days_from_monday())
                    % 7;
                Some(last - Duration::days(back as i64))
            }
            DateRule::WeekdayOnOrAfter {
                month,
                day,
                weekday,
            } => {
                let anchor = NaiveDate::from_ymd_opt(year, month, day)?;
                let ahead = (7 + weekday.num_days_from_monday()
                    - anchor.weekday().num_days_from_monday())
                    % 7;
                Some(anchor + Duration::days(ahead as i64))
            }
            DateRule::WeekdayOnOrBefore {
                month,
                day,
                weekday,
            } => {
                let anchor = NaiveDate::from_ymd_opt(year, month, day)?;
                let back = (7 + anchor.weekday().num_days_from_monday()
                    - weekday.num_days_from_monday())
                    % 7;
                Some(anchor - Duration::days(back as i64))
            }
            DateRule::EasterOffset(offset) => Some(easter_sunday(year)? + Duration::days(offset)),
        }
    }
}

/// Extra day off granted when a holiday falls on a weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observance {
    /// No extra day.
    None,
    /// Saturday is observed on Friday, Sunday on Monday.
    NearestWeekday,
    /// Saturday or Sunday moves to the next weekday that is not already a
    /// holiday.
    NextFreeWeekday,
    /// Only Sunday moves, to Monday.
    SundayToMonday,
}

/// One holiday of a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HolidayDef {
    pub name: &'static str,
    pub rule: DateRule,
    pub observance: Observance,
    /// First year the holiday applies.
    pub since: Option<i32>,
}

impl HolidayDef {
    pub const fn new(name: &'static str, rule: DateRule) -> Self {
        Self {
            name,
            rule,
            observance: Observance::None,
            since: None,
        }
    }

    pub const fn observed(mut self, observance: Observance) -> Self {
        self.observance = observance;
        self
    }

    pub const fn since(mut self, year: i32) -> Self {
        self.since = Some(year);
        self
    }

    pub fn applies_in(&self, year: i32) -> bool {
        self.since.map_or(true, |first| year >= first)
    }
}

/// Shorthand for a fixed-date rule.
pub const fn fixed(month: u32, day: u32) -> DateRule {
    DateRule::Fixed { month, day }
}

/// Shorthand for an Easter-relative rule.
pub const fn easter(offset: i64) -> DateRule {
    DateRule::EasterOffset(offset)
}

/// Western (Gregorian) Easter Sunday, anonymous Gregorian algorithm.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (y, m) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Every holiday date produced by `defs` for `year`, observed days included.
///
/// Observed days can spill into the neighbouring year; callers filter.
pub fn dates_for_year(defs: &[HolidayDef], year: i32) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = defs
        .iter()
        .filter(|def| def.applies_in(year))
        .filter_map(|def| def.rule.date_in(year))
        .collect();

    for def in defs.iter().filter(|def| def.applies_in(year)) {
        let Some(actual) = def.rule.date_in(year) else {
            continue;
        };
        let observed = match (def.observance, actual.weekday()) {
            (Observance::NearestWeekday, Weekday::Sat) => actual.pred_opt(),
            (Observance::NearestWeekday, Weekday::Sun) => actual.succ_opt(),
            (Observance::SundayToMonday, Weekday::Sun) => actual.succ_opt(),
            (Observance::NextFreeWeekday, Weekday::Sat | Weekday::Sun) => {
                let mut candidate = actual.succ_opt();
                while let Some(day) = candidate {
                    if !is_weekend(day) && !dates.contains(&day) {
                        break;
                    }
                    candidate = day.succ_opt();
                }
                candidate
            }
            _ => None,
        };
        if let Some(day) = observed {
            dates.push(day);
        }
    }

    dates.sort_unstable();
    dates.dedup();
    dates
}
