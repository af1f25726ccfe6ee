// src/aggregation.rs
use std::collections::HashMap;
use tracing::debug;

use crate::report_data::{CategoryRef, EngineError, InvalidArgument, TimeRecord};

// Aggregation key prefixes, one per category-reference kind.
pub const CANTON_KEY_PREFIX: &str = "cat_";
pub const USER_KEY_PREFIX: &str = "user_cat_";
pub const PROFILE_KEY_PREFIX: &str = "profile_cat_";

pub fn canton_category_key(id: &str) -> String {
    format!("{}{}", CANTON_KEY_PREFIX, id)
}

pub fn user_category_key(id: &str) -> String {
    format!("{}{}", USER_KEY_PREFIX, id)
}

pub fn profile_category_key(id: &str) -> String {
    format!("{}{}", PROFILE_KEY_PREFIX, id)
}

/// Aggregation key for a record's category reference. Uncategorized records
/// have no key; their minutes are summed separately for the "no category"
/// bucket.
pub fn category_key(category_ref: &CategoryRef) -> Option<String> {
    match category_ref {
        CategoryRef::Canton { id } => Some(canton_category_key(id)),
        CategoryRef::UserDefined { id } => Some(user_category_key(id)),
        CategoryRef::Profile { id } => Some(profile_category_key(id)),
        CategoryRef::Uncategorized => None,
    }
}

/// Sums record durations per category key. A negative duration fails the whole
/// computation; totals are otherwise monotonic non-negative.
pub fn aggregate_by_category(
    records: &[TimeRecord],
) -> Result<HashMap<String, i64>, EngineError> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for record in records {
        if record.duration_minutes < 0 {
            return Err(InvalidArgument::NegativeDuration {
                record_id: record.id.clone(),
                duration_minutes: record.duration_minutes,
            }
            .into());
        }
        if let Some(key) = category_key(&record.category_ref) {
            *totals.entry(key).or_insert(0) += record.duration_minutes;
        }
    }
    debug!(
        "Aggregated {} records into {} category buckets",
        records.len(),
        totals.len()
    );
    Ok(totals)
}

/// Total minutes of records carrying no category reference at all.
pub fn uncategorized_minutes(records: &[TimeRecord]) -> i64 {
    records
        .iter()
        .filter(|record| record.category_ref == CategoryRef::Uncategorized)
        .map(|record| record.duration_minutes)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    fn record(id: &str, minutes: i64, category_ref: CategoryRef) -> TimeRecord {
        TimeRecord {
            id: id.to_string(),
            date: d("2025-03-01"),
            duration_minutes: minutes,
            category_ref,
        }
    }

    #[test]
    fn keys_carry_the_reference_kind_prefix() {
        assert_eq!(
            category_key(&CategoryRef::Canton { id: "c1".into() }),
            Some("cat_c1".to_string())
        );
        assert_eq!(
            category_key(&CategoryRef::UserDefined { id: "u1".into() }),
            Some("user_cat_u1".to_string())
        );
        assert_eq!(
            category_key(&CategoryRef::Profile { id: "p1".into() }),
            Some("profile_cat_p1".to_string())
        );
        assert_eq!(category_key(&CategoryRef::Uncategorized), None);
    }

    #[test]
    fn durations_sum_per_key() {
        let records = vec![
            record("r1", 60, CategoryRef::Canton { id: "c1".into() }),
            record("r2", 30, CategoryRef::Canton { id: "c1".into() }),
            record("r3", 45, CategoryRef::UserDefined { id: "u1".into() }),
        ];
        let totals = aggregate_by_category(&records).expect("aggregation should succeed");
        assert_eq!(totals.get("cat_c1"), Some(&90));
        assert_eq!(totals.get("user_cat_u1"), Some(&45));
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn uncategorized_records_are_excluded_from_the_map() {
        let records = vec![
            record("r1", 60, CategoryRef::Canton { id: "c1".into() }),
            record("r2", 15, CategoryRef::Uncategorized),
        ];
        let totals = aggregate_by_category(&records).expect("aggregation should succeed");
        assert_eq!(totals.len(), 1, "only the categorized record should be keyed");
        assert_eq!(uncategorized_minutes(&records), 15);
    }

    #[test]
    fn negative_duration_is_an_invalid_argument() {
        let records = vec![record("r1", -5, CategoryRef::Canton { id: "c1".into() })];
        let err = aggregate_by_category(&records).expect_err("negative duration must fail");
        match err {
            EngineError::InvalidArgument(InvalidArgument::NegativeDuration {
                record_id,
                duration_minutes,
            }) => {
                assert_eq!(record_id, "r1");
                assert_eq!(duration_minutes, -5);
            }
            other => panic!("Wrong error type returned: {:?}", other),
        }
    }

    #[test]
    fn zero_duration_records_are_counted_but_harmless() {
        let records = vec![record("r1", 0, CategoryRef::Canton { id: "c1".into() })];
        let totals = aggregate_by_category(&records).expect("aggregation should succeed");
        assert_eq!(totals.get("cat_c1"), Some(&0));
    }
}
