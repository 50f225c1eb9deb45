//! Calendar-aware date axis for Plotters.
//!
//! Major key points sit on month boundaries (labelled `YYYY-MM`), minor key
//! points on the Monday of each week. When more months are in range than the
//! label budget allows, major points are thinned evenly so labels never overlap.

use std::ops::Range;

use chrono::{Datelike, Duration, Months, NaiveDate};
use plotters::coord::ranged1d::{KeyPointHint, KeyPointWeight, NoDefaultFormatting, Ranged, ValueFormatter};

pub const MAJOR_LABEL_FORMAT: &str = "%Y-%m";

/// Date range `[start, end)` mapped linearly onto pixels by calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarAxis {
    start: NaiveDate,
    end: NaiveDate,
}

impl CalendarAxis {
    /// Axis covering `first..=last`.
    pub fn new(first: NaiveDate, last: NaiveDate) -> Self {
        let (first, last) = if last < first { (last, first) } else { (first, last) };
        Self {
            start: first,
            end: last.succ_opt().unwrap_or(last),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// First day of every month inside the axis range.
    pub fn month_starts(&self) -> Vec<NaiveDate> {
        let mut out = Vec::new();
        let Some(mut d) = self.start.with_day(1) else {
            return out;
        };
        if d < self.start {
            match d.checked_add_months(Months::new(1)) {
                Some(next) => d = next,
                None => return out,
            }
        }
        while d < self.end {
            out.push(d);
            match d.checked_add_months(Months::new(1)) {
                Some(next) => d = next,
                None => break,
            }
        }
        out
    }

    /// Every Monday inside the axis range.
    pub fn week_starts(&self) -> Vec<NaiveDate> {
        let lead = (7 - self.start.weekday().num_days_from_monday()) % 7;
        let mut d = self.start + Duration::days(i64::from(lead));
        let mut out = Vec::new();
        while d < self.end {
            out.push(d);
            d += Duration::days(7);
        }
        out
    }

    /// Month starts, thinned to at most `max` evenly spaced points.
    pub fn major_ticks(&self, max: usize) -> Vec<NaiveDate> {
        let months = self.month_starts();
        if max == 0 {
            return Vec::new();
        }
        if months.len() <= max {
            return months;
        }
        let step = months.len().div_ceil(max);
        months.into_iter().step_by(step).collect()
    }
}

impl Ranged for CalendarAxis {
    type FormatOption = NoDefaultFormatting;
    type ValueType = NaiveDate;

    fn map(&self, value: &NaiveDate, limit: (i32, i32)) -> i32 {
        let span = (self.end - self.start).num_days().max(1) as f64;
        let offset = (*value - self.start).num_days() as f64;
        limit.0 + ((limit.1 - limit.0) as f64 * offset / span).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<NaiveDate> {
        match hint.weight() {
            KeyPointWeight::Bold => self.major_ticks(hint.max_num_points()),
            KeyPointWeight::Any => self.week_starts(),
        }
    }

    fn range(&self) -> Range<NaiveDate> {
        self.start..self.end
    }
}

impl ValueFormatter<NaiveDate> for CalendarAxis {
    fn format(value: &NaiveDate) -> String {
        value.format(MAJOR_LABEL_FORMAT).to_string()
    }
}
