//! Range selectors (week / month / quarter / year) and their concrete bounds.
//!
//! Month and quarter ends are always computed as "first of the period plus N
//! months, minus one day", so no invalid day-of-month is ever constructed.
//! Out-of-range months and quarter indexes are clamped, not rejected.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::types::RangeBounds;

/// Years are clamped into this window so month arithmetic cannot overflow.
const MIN_YEAR: i32 = -9999;
const MAX_YEAR: i32 = 9999;

/// Granularity of a range selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeKind {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl RangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

impl std::fmt::Display for RangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            _ => Err(format!("unknown range kind: {s}")),
        }
    }
}

/// A semantic date range as selected in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeSelector {
    Week { start: NaiveDate },
    Month { year: i32, month: u32 },
    /// `index` is 1..=4; other values are clamped.
    Quarter { year: i32, index: u32 },
    Year { year: i32 },
}

impl RangeSelector {
    /// The range of `kind` that contains `date`. Weeks start on Monday.
    pub fn containing(kind: RangeKind, date: NaiveDate) -> Self {
        match kind {
            RangeKind::Week => Self::Week {
                start: monday_on_or_before(date),
            },
            RangeKind::Month => Self::Month {
                year: date.year(),
                month: date.month(),
            },
            RangeKind::Quarter => Self::Quarter {
                year: date.year(),
                index: (date.month() - 1) / 3 + 1,
            },
            RangeKind::Year => Self::Year { year: date.year() },
        }
    }

    pub fn kind(&self) -> RangeKind {
        match self {
            Self::Week { .. } => RangeKind::Week,
            Self::Month { .. } => RangeKind::Month,
            Self::Quarter { .. } => RangeKind::Quarter,
            Self::Year { .. } => RangeKind::Year,
        }
    }

    pub fn previous(&self) -> Self {
        self.shift(-1)
    }

    pub fn next(&self) -> Self {
        self.shift(1)
    }

    fn shift(&self, steps: i32) -> Self {
        match *self {
            Self::Week { start } => {
                let days = Days::new(7);
                let moved = if steps < 0 {
                    start.checked_sub_days(days)
                } else {
                    start.checked_add_days(days)
                };
                Self::Week {
                    start: moved.unwrap_or(start),
                }
            }
            Self::Month { year, month } => {
                let (year, month) = add_months(year, month.clamp(1, 12), steps);
                Self::Month { year, month }
            }
            Self::Quarter { year, index } => {
                let start_month = (index.clamp(1, 4) - 1) * 3 + 1;
                let (year, month) = add_months(year, start_month, steps * 3);
                Self::Quarter {
                    year,
                    index: (month - 1) / 3 + 1,
                }
            }
            Self::Year { year } => Self::Year {
                year: clamp_year(year.saturating_add(steps)),
            },
        }
    }

    /// Short human label, e.g. `2024-Q2`.
    pub fn label(&self) -> String {
        match *self {
            Self::Week { start } => format!("week of {}", start.format("%Y-%m-%d")),
            Self::Month { year, month } => format!("{year:04}-{:02}", month.clamp(1, 12)),
            Self::Quarter { year, index } => format!("{year:04}-Q{}", index.clamp(1, 4)),
            Self::Year { year } => format!("{year:04}"),
        }
    }
}

/// Resolve a selector to inclusive start/end dates.
pub fn range_bounds(selector: RangeSelector) -> RangeBounds {
    match selector {
        RangeSelector::Week { start } => {
            let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
            RangeBounds::new(start, end)
        }
        RangeSelector::Month { year, month } => {
            let first = first_of_month(year, month.clamp(1, 12));
            RangeBounds::new(first, period_end(first, 1))
        }
        RangeSelector::Quarter { year, index } => {
            let start_month = (index.clamp(1, 4) - 1) * 3 + 1;
            let first = first_of_month(year, start_month);
            RangeBounds::new(first, period_end(first, 3))
        }
        RangeSelector::Year { year } => {
            let first = first_of_month(year, 1);
            RangeBounds::new(first, period_end(first, 12))
        }
    }
}

/// The Monday on or before `date`.
pub fn monday_on_or_before(date: NaiveDate) -> NaiveDate {
    let mut current = date;
    while current.weekday() != Weekday::Mon {
        match current.pred_opt() {
            Some(prev) => current = prev,
            None => break,
        }
    }
    current
}

fn clamp_year(year: i32) -> i32 {
    year.clamp(MIN_YEAR, MAX_YEAR)
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(clamp_year(year), month, 1)
        .expect("clamped year and month 1..=12 form a valid date")
}

fn period_end(first: NaiveDate, months: u32) -> NaiveDate {
    first
        .checked_add_months(Months::new(months))
        .and_then(|next| next.pred_opt())
        .expect("month arithmetic stays inside the clamped year window")
}

fn add_months(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let total = clamp_year(year) as i64 * 12 + (month as i64 - 1) + delta as i64;
    let year = clamp_year(total.div_euclid(12) as i32);
    let month = total.rem_euclid(12) as u32 + 1;
    (year, month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn quarter_two_bounds() {
        let bounds = range_bounds(RangeSelector::Quarter { year: 2024, index: 2 });
        assert_eq!(bounds.start, date(2024, 4, 1));
        assert_eq!(bounds.end, date(2024, 6, 30));
    }

    #[test]
    fn quarter_index_is_clamped() {
        let low = range_bounds(RangeSelector::Quarter { year: 2024, index: 0 });
        assert_eq!(low, range_bounds(RangeSelector::Quarter { year: 2024, index: 1 }));
        let high = range_bounds(RangeSelector::Quarter { year: 2024, index: 9 });
        assert_eq!(high.start, date(2024, 10, 1));
        assert_eq!(high.end, date(2024, 12, 31));
    }

    #[test]
    fn month_bounds_handle_leap_february() {
        let leap = range_bounds(RangeSelector::Month { year: 2024, month: 2 });
        assert_eq!(leap.end, date(2024, 2, 29));
        let plain = range_bounds(RangeSelector::Month { year: 2023, month: 2 });
        assert_eq!(plain.end, date(2023, 2, 28));
        let december = range_bounds(RangeSelector::Month { year: 2023, month: 12 });
        assert_eq!(december.end, date(2023, 12, 31));
    }

    #[test]
    fn month_is_clamped() {
        let bounds = range_bounds(RangeSelector::Month { year: 2024, month: 13 });
        assert_eq!(bounds.start, date(2024, 12, 1));
    }

    #[test]
    fn week_and_year_bounds() {
        let week = range_bounds(RangeSelector::Week { start: date(2024, 1, 15) });
        assert_eq!(week.end, date(2024, 1, 21));
        let year = range_bounds(RangeSelector::Year { year: 2024 });
        assert_eq!(year.start, date(2024, 1, 1));
        assert_eq!(year.end, date(2024, 12, 31));
    }

    #[test]
    fn containing_finds_enclosing_ranges() {
        let d = date(2024, 5, 16); // Thursday
        assert_eq!(
            RangeSelector::containing(RangeKind::Week, d),
            RangeSelector::Week { start: date(2024, 5, 13) }
        );
        assert_eq!(
            RangeSelector::containing(RangeKind::Quarter, d),
            RangeSelector::Quarter { year: 2024, index: 2 }
        );
        assert_eq!(
            RangeSelector::containing(RangeKind::Month, d),
            RangeSelector::Month { year: 2024, month: 5 }
        );
    }

    #[test]
    fn navigation_wraps_years() {
        let jan = RangeSelector::Month { year: 2024, month: 1 };
        assert_eq!(jan.previous(), RangeSelector::Month { year: 2023, month: 12 });
        let q4 = RangeSelector::Quarter { year: 2024, index: 4 };
        assert_eq!(q4.next(), RangeSelector::Quarter { year: 2025, index: 1 });
        let week = RangeSelector::Week { start: date(2024, 1, 1) };
        assert_eq!(week.previous(), RangeSelector::Week { start: date(2023, 12, 25) });
        assert_eq!(RangeSelector::Year { year: 2024 }.next(), RangeSelector::Year { year: 2025 });
    }

    #[test]
    fn monday_lookup() {
        assert_eq!(monday_on_or_before(date(2024, 1, 15)), date(2024, 1, 15));
        assert_eq!(monday_on_or_before(date(2024, 1, 21)), date(2024, 1, 15));
        assert_eq!(monday_on_or_before(date(2024, 3, 1)), date(2024, 2, 26));
    }

    #[test]
    fn kind_parses() {
        assert_eq!("quarter".parse::<RangeKind>().unwrap(), RangeKind::Quarter);
        assert!("decade".parse::<RangeKind>().is_err());
    }
}
