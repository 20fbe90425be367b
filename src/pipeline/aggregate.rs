use crate::pipeline::window::ReportingWindow;
use crate::types::{AggregateStats, NormalizedIncident};
use chrono::{Datelike, NaiveDate};

impl AggregateStats {
    /// Folds normalized incidents into weekly and year-to-date figures.
    ///
    /// Weekly sums cover the reporting window inclusively; year-to-date sums
    /// cover 1 January of the reference date's year through the reference
    /// date itself. An empty record set is a valid all-zero result.
    pub fn collect(
        records: &[NormalizedIncident],
        window: &ReportingWindow,
        reference: NaiveDate,
    ) -> Self {
        let year_begin =
            NaiveDate::from_ymd_opt(reference.year(), 1, 1).expect("1 January always exists");

        let mut stats = Self::default();
        for record in records {
            if record.date >= year_begin && record.date <= reference {
                stats.ytd_crashes += 1;
                stats.ytd_fatalities += record.fatalities;
                stats.ytd_injuries += record.injuries;
            }
            if window.contains(record.date) {
                stats.weekly_crashes += 1;
                stats.weekly_fatalities += record.fatalities;
                stats.weekly_injuries += record.injuries;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use std::collections::BTreeSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn incident(d: NaiveDate, fatalities: u32, injuries: u32) -> NormalizedIncident {
        NormalizedIncident {
            date: d,
            fatalities,
            injuries,
            municipality: "MADISON".to_string(),
            flags: BTreeSet::new(),
        }
    }

    #[test]
    fn sums_a_five_crash_week() {
        let reference = date(2022, 2, 14);
        let window = ReportingWindow::preceding(reference, Weekday::Sun);
        let fatalities = [1, 0, 0, 0, 2];
        let injuries = [0, 1, 1, 0, 0];
        let records: Vec<_> = (0..5)
            .map(|i| {
                incident(
                    date(2022, 2, 6 + i as u32),
                    fatalities[i],
                    injuries[i],
                )
            })
            .collect();

        let stats = AggregateStats::collect(&records, &window, reference);
        assert_eq!(stats.weekly_crashes, 5);
        assert_eq!(stats.weekly_fatalities, 3);
        assert_eq!(stats.weekly_injuries, 2);
        assert_eq!(stats.ytd_crashes, 5);
        assert_eq!(stats.ytd_fatalities, 3);
        assert_eq!(stats.ytd_injuries, 2);
    }

    #[test]
    fn empty_input_yields_zero_stats_not_an_error() {
        let reference = date(2022, 2, 14);
        let window = ReportingWindow::preceding(reference, Weekday::Sun);
        let stats = AggregateStats::collect(&[], &window, reference);
        assert_eq!(stats, AggregateStats::default());
    }

    #[test]
    fn zero_casualty_crashes_still_count_as_crashes() {
        let reference = date(2022, 2, 14);
        let window = ReportingWindow::preceding(reference, Weekday::Sun);
        let records = vec![incident(date(2022, 2, 8), 0, 0)];

        let stats = AggregateStats::collect(&records, &window, reference);
        assert_eq!(stats.weekly_crashes, 1);
        assert_eq!(stats.weekly_fatalities, 0);
        assert_eq!(stats.weekly_injuries, 0);
    }

    #[test]
    fn weekly_figures_never_exceed_year_to_date() {
        let reference = date(2022, 6, 15);
        let window = ReportingWindow::preceding(reference, Weekday::Sun);
        let records = vec![
            incident(date(2022, 1, 3), 1, 2),
            incident(date(2022, 3, 20), 0, 1),
            incident(window.start(), 2, 0),
            incident(window.end(), 0, 3),
        ];

        let stats = AggregateStats::collect(&records, &window, reference);
        assert!(stats.weekly_crashes <= stats.ytd_crashes);
        assert!(stats.weekly_fatalities <= stats.ytd_fatalities);
        assert!(stats.weekly_injuries <= stats.ytd_injuries);
    }

    #[test]
    fn records_after_the_reference_date_are_outside_year_to_date() {
        let reference = date(2022, 2, 14);
        let window = ReportingWindow::preceding(reference, Weekday::Sun);
        let records = vec![
            incident(date(2022, 2, 20), 1, 1),
            incident(date(2021, 12, 31), 1, 1),
        ];

        let stats = AggregateStats::collect(&records, &window, reference);
        assert_eq!(stats.ytd_crashes, 0);
        assert_eq!(stats.weekly_crashes, 0);
    }

    #[test]
    fn reference_date_itself_counts_toward_year_to_date() {
        let reference = date(2022, 2, 14);
        let window = ReportingWindow::preceding(reference, Weekday::Sun);
        let records = vec![incident(reference, 0, 1)];

        let stats = AggregateStats::collect(&records, &window, reference);
        assert_eq!(stats.ytd_crashes, 1);
        assert_eq!(stats.ytd_injuries, 1);
        // In the current, incomplete week: excluded from weekly sums.
        assert_eq!(stats.weekly_crashes, 0);
    }
}
