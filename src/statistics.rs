// src/statistics.rs
use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::aggregation::{
    aggregate_by_category, canton_category_key, uncategorized_minutes, user_category_key,
};
use crate::category_tree::{build_category_groups, CategoryGroup};
use crate::custom_profile;
use crate::report_data::{
    CantonRules, Category, ConfigProfile, EngineError, InvalidArgument, ReportSnapshot,
    TimeRecord, UserData,
};
use crate::targets::{compute_target_minutes, resolve_set_percentage};

// Label keys for the synthetic remaining-statistics rows. Passed through the
// injected label lookup; never used for grouping decisions.
pub const LABEL_NO_CATEGORY: &str = "noCategory";
pub const LABEL_OTHER_CANTON: &str = "otherCanton";
pub const LABEL_UNMATCHED_PROFILE: &str = "unmatchedProfileCategory";
pub const LABEL_TOTAL: &str = "total";

// --- Report Structures ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryRow {
    pub title: String,
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsRow {
    pub title: String,
    pub effective_duration: i64,
    pub target_duration: i64,
    /// Share of the report's total effective duration, formatted to two
    /// decimals ("0.00" when the total is zero).
    pub effective_workload_percent: String,
    /// Share of the report's total target duration, same formatting.
    pub target_workload_percent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Per-category breakdown, present only when the canton defines
    /// subcategories. Subcategories carry no independent target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategories: Option<Vec<SubcategoryRow>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingRow {
    pub title: String,
    pub effective_duration: i64,
    pub target_duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryStatistics {
    pub rows: Vec<StatisticsRow>,
    pub total_effective_duration: i64,
    pub total_target_duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingStatistics {
    pub rows: Vec<RemainingRow>,
}

/// Discriminated report wrapper. Consumers match on the `kind` tag instead of
/// probing for field presence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StatisticsReport {
    Primary(PrimaryStatistics),
    Remaining(RemainingStatistics),
}

// --- Mode Selection ---

/// Which rule set governs target computation. Re-evaluated from current input
/// on every report computation; nothing is retained between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Canton,
    CustomProfile,
}

pub fn resolve_report_mode(user: &UserData, profile: Option<&ConfigProfile>) -> ReportMode {
    match (&user.active_profile_id, profile) {
        (Some(active_id), Some(profile)) if *active_id == profile.id => ReportMode::CustomProfile,
        _ => ReportMode::Canton,
    }
}

// --- Assembly ---

/// Share of `part` in `total` as a percentage string with two decimals. A zero
/// total yields "0.00"; the division is never attempted.
pub(crate) fn format_share(part: i64, total: i64) -> String {
    if total == 0 {
        return "0.00".to_string();
    }
    let share = Decimal::from(part) * dec!(100) / Decimal::from(total);
    format!(
        "{:.2}",
        share.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn ensure_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), EngineError> {
    if end < start {
        return Err(InvalidArgument::DateRangeReversed { start, end }.into());
    }
    Ok(())
}

/// Primary employment statistics: one row per canton category set, in set
/// order, plus totals across all rows.
pub fn build_primary_statistics<F>(
    records: &[TimeRecord],
    categories: &[Category],
    canton_rules: &CantonRules,
    user: &UserData,
    start: NaiveDate,
    end: NaiveDate,
    label_lookup: &F,
) -> Result<PrimaryStatistics, EngineError>
where
    F: Fn(&str) -> String,
{
    ensure_date_range(start, end)?;
    if canton_rules.category_sets.is_empty() {
        return Err(EngineError::DataUnavailable {
            what: "canton category sets".to_string(),
        });
    }
    let has_canton_categories = categories.iter().any(|c| !c.is_further_employment());
    if !has_canton_categories {
        return Err(EngineError::DataUnavailable {
            what: "canton categories".to_string(),
        });
    }

    let totals = aggregate_by_category(records)?;
    let groups = build_category_groups(categories, &canton_rules.category_sets);
    let group_by_title: HashMap<&str, &CategoryGroup> = groups
        .iter()
        .map(|group| (group.set_title.as_str(), group))
        .collect();

    let mut ordered_sets: Vec<_> = canton_rules.category_sets.iter().collect();
    ordered_sets.sort_by_key(|set| set.order);

    let mut rows: Vec<StatisticsRow> = Vec::with_capacity(ordered_sets.len());
    for set in ordered_sets {
        let group = group_by_title.get(set.title.as_str()).copied();
        let member_durations: Vec<(String, i64)> = group
            .map(|group| {
                group
                    .categories
                    .iter()
                    .map(|category| {
                        let duration = totals
                            .get(&canton_category_key(&category.id))
                            .copied()
                            .unwrap_or(0);
                        (label_lookup(&category.title), duration)
                    })
                    .collect()
            })
            .unwrap_or_default();
        let effective_duration: i64 = member_durations.iter().map(|(_, d)| d).sum();

        // A canton without defined working hours has no targets to compute.
        let target_duration = if canton_rules.is_working_hours_disabled {
            0
        } else {
            let percentage = resolve_set_percentage(set, canton_rules.is_configurable);
            compute_target_minutes(
                canton_rules.annual_work_hours,
                percentage,
                start,
                end,
                user.workload_percent,
                canton_rules.use_custom_work_hours,
                user.custom_work_hours,
            )?
        };

        let subcategories = if canton_rules.has_subcategories {
            Some(
                member_durations
                    .into_iter()
                    .map(|(title, duration)| SubcategoryRow { title, duration })
                    .collect(),
            )
        } else {
            None
        };

        rows.push(StatisticsRow {
            title: label_lookup(&set.title),
            effective_duration,
            target_duration,
            effective_workload_percent: String::new(),
            target_workload_percent: String::new(),
            color: group.and_then(|g| g.color.clone()),
            subcategories,
        });
    }

    let total_effective_duration: i64 = rows.iter().map(|row| row.effective_duration).sum();
    let total_target_duration: i64 = rows.iter().map(|row| row.target_duration).sum();
    for row in &mut rows {
        row.effective_workload_percent = format_share(row.effective_duration, total_effective_duration);
        row.target_workload_percent = format_share(row.target_duration, total_target_duration);
    }

    info!(
        "Primary statistics assembled: {} rows, {} min effective, {} min target",
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

/// Remaining employment statistics: one row per further-employment category,
/// plus the "no category" and "other canton" buckets (each omitted when zero).
pub fn build_remaining_statistics<F>(
    records: &[TimeRecord],
    categories: &[Category],
    canton_rules: &CantonRules,
    user: &UserData,
    start: NaiveDate,
    end: NaiveDate,
    label_lookup: &F,
) -> Result<RemainingStatistics, EngineError>
where
    F: Fn(&str) -> String,
{
    ensure_date_range(start, end)?;
    let totals = aggregate_by_category(records)?;

    let mut rows: Vec<RemainingRow> = Vec::new();
    for category in categories.iter().filter(|c| c.is_further_employment()) {
        let effective_duration = totals
            .get(&user_category_key(&category.id))
            .copied()
            .unwrap_or(0);
        // A further-employment target is self-contained: full percentage of the
        // category's own workload fraction, not a share of the canton target.
        let target_duration = if canton_rules.is_working_hours_disabled {
            0
        } else {
            compute_target_minutes(
                canton_rules.annual_work_hours,
                dec!(100),
                start,
                end,
                category.workload_percent.unwrap_or(Decimal::ZERO),
                canton_rules.use_custom_work_hours,
                user.custom_work_hours,
            )?
        };
        rows.push(RemainingRow {
            title: label_lookup(&category.title),
            effective_duration,
            target_duration,
            color: category.color.clone(),
        });
    }

    let known_keys: HashSet<String> = categories
        .iter()
        .map(|category| {
            if category.is_further_employment() {
                user_category_key(&category.id)
            } else {
                canton_category_key(&category.id)
            }
        })
        .collect();
    let unmatched_duration: i64 = totals
        .iter()
        .filter(|(key, _)| !known_keys.contains(*key))
        .map(|(_, duration)| duration)
        .sum();
    let no_category_duration = uncategorized_minutes(records);

    if no_category_duration > 0 {
        rows.push(RemainingRow {
            title: label_lookup(LABEL_NO_CATEGORY),
            effective_duration: no_category_duration,
            target_duration: 0,
            color: None,
        });
    }
    if unmatched_duration > 0 {
        warn!(
            "{} logged minutes reference categories missing from canton {}",
            unmatched_duration, canton_rules.canton_code
        );
        rows.push(RemainingRow {
            title: label_lookup(LABEL_OTHER_CANTON),
            effective_duration: unmatched_duration,
            target_duration: 0,
            color: None,
        });
    }

    info!("Remaining statistics assembled: {} rows", rows.len());
    Ok(RemainingStatistics { rows })
}

/// Computes both reports for one period. The mode selector is evaluated once
/// per call from the snapshot's user data; either report fails as a whole or
/// not at all.
pub fn build_report<F>(
    snapshot: &ReportSnapshot,
    start: NaiveDate,
    end: NaiveDate,
    label_lookup: &F,
) -> Result<(PrimaryStatistics, RemainingStatistics), EngineError>
where
    F: Fn(&str) -> String,
{
    match resolve_report_mode(&snapshot.user, snapshot.config_profile.as_ref()) {
        ReportMode::Canton => {
            let canton_rules =
                snapshot
                    .canton_rules
                    .as_ref()
                    .ok_or_else(|| EngineError::DataUnavailable {
                        what: "canton rules".to_string(),
                    })?;
            let primary = build_primary_statistics(
                &snapshot.records,
                &snapshot.categories,
                canton_rules,
                &snapshot.user,
                start,
                end,
                label_lookup,
            )?;
            let remaining = build_remaining_statistics(
                &snapshot.records,
                &snapshot.categories,
                canton_rules,
                &snapshot.user,
                start,
                end,
                label_lookup,
            )?;
            Ok((primary, remaining))
        }
        ReportMode::CustomProfile => {
            let profile =
                snapshot
                    .config_profile
                    .as_ref()
                    .ok_or_else(|| EngineError::DataUnavailable {
                        what: "config profile".to_string(),
                    })?;
            let primary = custom_profile::build_profile_primary_statistics(
                &snapshot.records,
                profile,
                &snapshot.user,
                start,
                end,
                label_lookup,
            )?;
            let remaining = custom_profile::build_profile_remaining_statistics(
                &snapshot.records,
                profile,
                label_lookup,
            )?;
            Ok((primary, remaining))
        }
    }
}
