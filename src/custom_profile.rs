// src/custom_profile.rs
//
// Parallel statistics path for the self-defined configuration mode. Targets
// come from profile category weights against the profile's own annual work
// hours; the canton's custom-work-hours override does not apply here.
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::info;

use crate::aggregation::{aggregate_by_category, profile_category_key, uncategorized_minutes};
use crate::report_data::{ConfigProfile, EngineError, InvalidArgument, TimeRecord, UserData};
use crate::statistics::{
    format_share, PrimaryStatistics, RemainingRow, RemainingStatistics, StatisticsRow,
    LABEL_NO_CATEGORY, LABEL_UNMATCHED_PROFILE,
};
use crate::targets::compute_target_minutes;

/// One row per profile category, ordered by the category's own order field.
pub fn build_profile_primary_statistics<F>(
    records: &[TimeRecord],
    profile: &ConfigProfile,
    user: &UserData,
    start: NaiveDate,
    end: NaiveDate,
    label_lookup: &F,
) -> Result<PrimaryStatistics, EngineError>
where
    F: Fn(&str) -> String,
{
    if end < start {
        return Err(InvalidArgument::DateRangeReversed { start, end }.into());
    }
    if profile.categories.is_empty() {
        return Err(EngineError::DataUnavailable {
            what: "profile categories".to_string(),
        });
    }

    let totals = aggregate_by_category(records)?;
    let mut ordered_categories: Vec<_> = profile.categories.iter().collect();
    ordered_categories.sort_by_key(|category| category.order);

    let mut rows: Vec<StatisticsRow> = Vec::with_capacity(ordered_categories.len());
    for category in ordered_categories {
        let effective_duration = totals
            .get(&profile_category_key(&category.id))
            .copied()
            .unwrap_or(0);
        let target_duration = compute_target_minutes(
            profile.annual_work_hours,
            category.weight,
            start,
            end,
            user.workload_percent,
            false,
            None,
        )?;
        rows.push(StatisticsRow {
            title: label_lookup(&category.title),
            effective_duration,
            target_duration,
            effective_workload_percent: String::new(),
            target_workload_percent: String::new(),
            color: category.color.clone(),
            subcategories: None,
        });
    }

    let total_effective_duration: i64 = rows.iter().map(|row| row.effective_duration).sum();
    let total_target_duration: i64 = rows.iter().map(|row| row.target_duration).sum();
    for row in &mut rows {
        row.effective_workload_percent = format_share(row.effective_duration, total_effective_duration);
        row.target_workload_percent = format_share(row.target_duration, total_target_duration);
    }

    info!(
        "Profile statistics assembled: {} rows, {} min effective, {} min target",
        rows.len(),
        total_effective_duration,
        total_target_duration
    );
    Ok(PrimaryStatistics {
        rows,
        total_effective_duration,
        total_target_duration,
    })
}

/// Remaining buckets in custom mode: "no category" and "unmatched profile
/// category" only. There is no canton-level "other canton" concept here.
pub fn build_profile_remaining_statistics<F>(
    records: &[TimeRecord],
    profile: &ConfigProfile,
    label_lookup: &F,
) -> Result<RemainingStatistics, EngineError>
where
    F: Fn(&str) -> String,
{
    let totals = aggregate_by_category(records)?;

    let known_keys: HashSet<String> = profile
        .categories
        .iter()
        .map(|category| profile_category_key(&category.id))
        .collect();
    let unmatched_duration: i64 = totals
        .iter()
        .filter(|(key, _)| !known_keys.contains(*key))
        .map(|(_, duration)| duration)
        .sum();
    let no_category_duration = uncategorized_minutes(records);

    let mut rows: Vec<RemainingRow> = Vec::new();
    if no_category_duration > 0 {
        rows.push(RemainingRow {
            title: label_lookup(LABEL_NO_CATEGORY),
            effective_duration: no_category_duration,
            target_duration: 0,
            color: None,
        });
    }
    if unmatched_duration > 0 {
        rows.push(RemainingRow {
            title: label_lookup(LABEL_UNMATCHED_PROFILE),
            effective_duration: unmatched_duration,
            target_duration: 0,
            color: None,
        });
    }

    info!("Profile remaining statistics assembled: {} rows", rows.len());
    Ok(RemainingStatistics { rows })
}
