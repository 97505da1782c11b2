use tracing::warn;

use super::domain::{DatasetSnapshot, Outcome};
use super::normalizer::normalize_county;

/// Reasons a county lookup ends without a verdict. Folded into `Outcome::error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("County not found")]
    NotFound,
    #[error("Unexpected status")]
    UnexpectedStatus,
}

/// Maps a county name onto the tri-state verdict recorded in a snapshot.
pub struct CountyStatusResolver;

impl CountyStatusResolver {
    /// First matching row wins. "YES" in the source means a ban is in effect.
    pub fn lookup(target_county: &str, snapshot: &DatasetSnapshot) -> Outcome {
        let target = normalize_county(target_county);
        if target.is_empty() {
            return Outcome::unknown(LookupError::NotFound.to_string());
        }

        let mut matches = snapshot
            .records
            .iter()
            .filter(|record| normalize_county(&record.county) == target);

        let Some(record) = matches.next() else {
            return Outcome::unknown(LookupError::NotFound.to_string());
        };

        let duplicates = matches.count();
        if duplicates > 0 {
            warn!(
                county = %target,
                duplicates,
                "dataset lists county more than once; using first row"
            );
        }

        match record.ban_status.trim().to_uppercase().as_str() {
            "YES" => Outcome::banned(record.start_date.clone()),
            "NO" => Outcome::allowed(),
            _ => Outcome::unknown(LookupError::UnexpectedStatus.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::domain::{BurnVerdict, CountyRecord};
    use chrono::Utc;

    fn record(county: &str, status: &str, date: &str) -> CountyRecord {
        CountyRecord {
            county: county.to_string(),
            ban_status: status.to_string(),
            start_date: date.to_string(),
            county_id: "1".to_string(),
        }
    }

    fn snapshot(records: Vec<CountyRecord>) -> DatasetSnapshot {
        DatasetSnapshot::new(records, Utc::now())
    }

    #[test]
    fn lookup_is_case_and_whitespace_insensitive() {
        let data = snapshot(vec![record("Travis", "YES", "03/01/2024")]);
        let lower = CountyStatusResolver::lookup("travis", &data);
        let upper = CountyStatusResolver::lookup("TRAVIS", &data);
        let padded = CountyStatusResolver::lookup(" Travis ", &data);

        assert_eq!(lower, upper);
        assert_eq!(upper, padded);
        assert_eq!(lower, Outcome::banned("03/01/2024"));
    }

    #[test]
    fn yes_means_banned_and_keeps_start_date() {
        let data = snapshot(vec![record("Travis", "yes", "")]);
        let outcome = CountyStatusResolver::lookup("Travis", &data);
        assert_eq!(outcome.verdict, BurnVerdict::Banned);
        assert_eq!(outcome.start_date, "");
        assert!(outcome.error.is_none());
    }

    #[test]
    fn no_means_allowed_and_drops_start_date() {
        let data = snapshot(vec![record("Harris", "NO", "01/15/2024")]);
        assert_eq!(
            CountyStatusResolver::lookup("Harris", &data),
            Outcome::allowed()
        );
    }

    #[test]
    fn other_status_tokens_are_unexpected() {
        let data = snapshot(vec![record("Bexar", "Maybe", ""), record("Llano", "", "")]);
        for county in ["Bexar", "Llano"] {
            let outcome = CountyStatusResolver::lookup(county, &data);
            assert_eq!(outcome.verdict, BurnVerdict::Unknown);
            assert_eq!(outcome.error.as_deref(), Some("Unexpected status"));
        }
    }

    #[test]
    fn missing_county_is_not_found() {
        let data = snapshot(vec![record("Travis", "YES", "")]);
        let outcome = CountyStatusResolver::lookup("Williamson", &data);
        assert_eq!(outcome.verdict, BurnVerdict::Unknown);
        assert_eq!(outcome.error.as_deref(), Some("County not found"));
    }

    #[test]
    fn blank_rows_never_match() {
        let data = snapshot(vec![record("", "YES", ""), record("  ", "NO", "")]);
        let outcome = CountyStatusResolver::lookup(" ", &data);
        assert_eq!(outcome.error.as_deref(), Some("County not found"));
    }

    #[test]
    fn first_duplicate_wins() {
        let data = snapshot(vec![
            record("Travis", "NO", ""),
            record("TRAVIS", "YES", "03/01/2024"),
        ]);
        assert_eq!(
            CountyStatusResolver::lookup("Travis", &data),
            Outcome::allowed()
        );
    }

    #[test]
    fn partial_names_do_not_match() {
        let data = snapshot(vec![record("Fort Bend", "YES", "")]);
        let outcome = CountyStatusResolver::lookup("Bend", &data);
        assert_eq!(outcome.error.as_deref(), Some("County not found"));
    }
}
