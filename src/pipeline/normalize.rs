use crate::constants::FEED_DATE_FORMAT;
use crate::error::{ReportError, Result};
use crate::types::{FlatIncidentRecord, GeoIncidentRecord, IncidentFlag, NormalizedIncident};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Merges the feed's two encodings into canonical incident records and
/// filters them to the target municipality.
///
/// The encodings share record order but no join key, so the merge is strictly
/// positional: diverging lengths reject the whole batch, and so does a single
/// unparseable date or count. Records are never silently skipped.
pub fn normalize(
    geo: &[GeoIncidentRecord],
    flat: &[FlatIncidentRecord],
    municipality: &str,
) -> Result<Vec<NormalizedIncident>> {
    if geo.len() != flat.len() {
        return Err(ReportError::SchemaMismatch {
            geo: geo.len(),
            flat: flat.len(),
        });
    }

    let mut incidents = Vec::new();
    for (record, props) in geo.iter().zip(flat) {
        let date = NaiveDate::parse_from_str(record.date.trim(), FEED_DATE_FORMAT).map_err(
            |_| ReportError::Parse {
                field: "date",
                value: record.date.clone(),
            },
        )?;
        let fatalities = parse_count("totalFatalities", &record.total_fatalities)?;
        let injuries = parse_count("totalInjuries", &record.total_injuries)?;
        let flags = decode_flags(&props.flags);

        // Municipality filter runs last: records outside the target are
        // dropped, but only after they proved parseable.
        if record.municipality != municipality {
            continue;
        }

        incidents.push(NormalizedIncident {
            date,
            fatalities,
            injuries,
            municipality: record.municipality.clone(),
            flags,
        });
    }

    debug!(
        total = geo.len(),
        kept = incidents.len(),
        municipality,
        "normalized incident batch"
    );
    Ok(incidents)
}

fn parse_count(field: &'static str, value: &str) -> Result<u32> {
    value.trim().parse::<u32>().map_err(|_| ReportError::Parse {
        field,
        value: value.to_string(),
    })
}

fn decode_flags(codes: &[String]) -> BTreeSet<IncidentFlag> {
    codes
        .iter()
        .filter_map(|code| {
            let flag = IncidentFlag::from_code(code);
            if flag.is_none() {
                warn!(code = %code, "dropping unrecognized incident flag code");
            }
            flag
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo_record(
        date: &str,
        fatalities: &str,
        injuries: &str,
        municipality: &str,
    ) -> GeoIncidentRecord {
        GeoIncidentRecord {
            date: date.to_string(),
            total_fatalities: fatalities.to_string(),
            total_injuries: injuries.to_string(),
            municipality: municipality.to_string(),
        }
    }

    fn flat_record(codes: &[&str]) -> FlatIncidentRecord {
        FlatIncidentRecord {
            flags: codes.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn merges_flags_positionally() {
        let geo = vec![
            geo_record("07/02/2022", "1", "0", "MADISON"),
            geo_record("08/02/2022", "0", "2", "MADISON"),
        ];
        let flat = vec![flat_record(&["SPEED"]), flat_record(&["ALCOHOL", "PED"])];

        let incidents = normalize(&geo, &flat, "MADISON").unwrap();
        assert_eq!(incidents.len(), 2);
        assert!(incidents[0].flags.contains(&IncidentFlag::Speeding));
        assert!(incidents[1].flags.contains(&IncidentFlag::Impairment));
        assert!(incidents[1].flags.contains(&IncidentFlag::Pedestrian));
        assert_eq!(
            incidents[0].date,
            NaiveDate::from_ymd_opt(2022, 2, 7).unwrap()
        );
        assert_eq!(incidents[0].fatalities, 1);
        assert_eq!(incidents[1].injuries, 2);
    }

    #[test]
    fn mismatched_lengths_fail_never_drop() {
        let geo = vec![
            geo_record("07/02/2022", "0", "0", "MADISON"),
            geo_record("08/02/2022", "0", "0", "MADISON"),
        ];
        let flat = vec![flat_record(&[])];

        let err = normalize(&geo, &flat, "MADISON").unwrap_err();
        assert!(matches!(
            err,
            ReportError::SchemaMismatch { geo: 2, flat: 1 }
        ));
    }

    #[test]
    fn one_bad_date_fails_the_whole_batch() {
        let geo = vec![
            geo_record("07/02/2022", "0", "0", "MADISON"),
            geo_record("February 8th", "0", "0", "MADISON"),
        ];
        let flat = vec![flat_record(&[]), flat_record(&[])];

        let err = normalize(&geo, &flat, "MADISON").unwrap_err();
        assert!(matches!(err, ReportError::Parse { field: "date", .. }));
    }

    #[test]
    fn bad_date_fails_even_outside_the_target_municipality() {
        let geo = vec![geo_record("not-a-date", "0", "0", "EDEN")];
        let flat = vec![flat_record(&[])];

        assert!(normalize(&geo, &flat, "MADISON").is_err());
    }

    #[test]
    fn non_numeric_counts_fail() {
        let geo = vec![geo_record("07/02/2022", "one", "0", "MADISON")];
        let flat = vec![flat_record(&[])];

        let err = normalize(&geo, &flat, "MADISON").unwrap_err();
        assert!(matches!(
            err,
            ReportError::Parse {
                field: "totalFatalities",
                ..
            }
        ));
    }

    #[test]
    fn negative_counts_fail() {
        let geo = vec![geo_record("07/02/2022", "0", "-1", "MADISON")];
        let flat = vec![flat_record(&[])];

        assert!(normalize(&geo, &flat, "MADISON").is_err());
    }

    #[test]
    fn municipality_match_is_case_sensitive_and_drops_quietly() {
        let geo = vec![
            geo_record("07/02/2022", "0", "0", "MADISON"),
            geo_record("07/02/2022", "0", "0", "Madison"),
            geo_record("07/02/2022", "0", "0", "EDEN"),
        ];
        let flat = vec![flat_record(&[]), flat_record(&[]), flat_record(&[])];

        let incidents = normalize(&geo, &flat, "MADISON").unwrap();
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].municipality, "MADISON");
    }

    #[test]
    fn unknown_flag_codes_are_dropped_not_erred() {
        let geo = vec![geo_record("07/02/2022", "0", "0", "MADISON")];
        let flat = vec![flat_record(&["SPEED", "UFO"])];

        let incidents = normalize(&geo, &flat, "MADISON").unwrap();
        assert_eq!(incidents[0].flags.len(), 1);
        assert!(incidents[0].flags.contains(&IncidentFlag::Speeding));
    }

    #[test]
    fn missing_flags_yield_an_empty_set() {
        let geo = vec![geo_record("07/02/2022", "0", "0", "MADISON")];
        let flat = vec![FlatIncidentRecord::default()];

        let incidents = normalize(&geo, &flat, "MADISON").unwrap();
        assert!(incidents[0].flags.is_empty());
    }

    #[test]
    fn whitespace_in_counts_and_dates_is_tolerated() {
        let geo = vec![geo_record(" 07/02/2022 ", " 2 ", "0", "MADISON")];
        let flat = vec![flat_record(&[])];

        let incidents = normalize(&geo, &flat, "MADISON").unwrap();
        assert_eq!(incidents[0].fatalities, 2);
    }
}
