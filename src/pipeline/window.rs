use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::fmt;

/// The seven days of the calendar week immediately preceding the week that
/// contains the reference date, inclusive on both ends. Never covers the
/// reference date's own, still-incomplete week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportingWindow {
    /// Computes the window for `reference` under the configured first day of
    /// week. Pure function of its arguments.
    pub fn preceding(reference: NaiveDate, week_start: Weekday) -> Self {
        let days_into_week = (reference.weekday().num_days_from_sunday() + 7
            - week_start.num_days_from_sunday())
            % 7;
        let week_begin = reference - Duration::days(i64::from(days_into_week));
        Self {
            start: week_begin - Duration::days(7),
            end: week_begin - Duration::days(1),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive membership test.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for ReportingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%d/%m"),
            self.end.format("%d/%m")
        )
    }
}
