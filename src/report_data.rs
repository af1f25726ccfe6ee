// src/report_data.rs
use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

// Reserved category-set title under which user-defined ("further employment")
// categories are grouped. These categories never belong to a canton set.
pub const FURTHER_EMPLOYMENT_SET_TITLE: &str = "furtherEmployment";

pub type CategoryId = String;
pub type CategorySetId = String;
pub type ProfileId = String;
pub type UserId = String;

// --- Error Types ---

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    #[error("date range end {end} is before start {start}")]
    DateRangeReversed { start: NaiveDate, end: NaiveDate },
    #[error("record {record_id} carries a negative duration ({duration_minutes} min)")]
    NegativeDuration {
        record_id: String,
        duration_minutes: i64,
    },
    #[error("{name} {value} is outside the allowed range 0-100")]
    PercentageOutOfRange { name: String, value: Decimal },
    #[error("annual work hours {value} cannot be applied to a target computation")]
    WorkHoursOutOfRange { value: Decimal },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // Caller contract violations. Never clamped or repaired here; validation of
    // user-facing inputs belongs to the caller before invocation.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
    // Required inputs are missing or empty. Recoverable by re-fetching upstream;
    // the engine itself performs no retries.
    #[error("required data not available: {what}")]
    DataUnavailable { what: String },
}

// --- Core Data Structures ---

/// Reference from a time record to the category it was logged under. Exactly
/// one of the three id kinds, or no reference at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryRef {
    Canton { id: CategoryId },
    UserDefined { id: CategoryId },
    Profile { id: CategoryId },
    Uncategorized,
}

impl Default for CategoryRef {
    fn default() -> Self {
        CategoryRef::Uncategorized
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRecord {
    pub id: String,
    pub date: NaiveDate,
    pub duration_minutes: i64,
    #[serde(default)]
    pub category_ref: CategoryRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub category_set_title: String,
    #[serde(default)]
    pub category_set_order: Option<i64>,
    /// Employment fraction of a further-employment category (0-100). Canton
    /// categories never carry one; their workload comes from the user.
    #[serde(default)]
    pub workload_percent: Option<Decimal>,
}

impl Category {
    pub fn is_further_employment(&self) -> bool {
        self.category_set_title == FURTHER_EMPLOYMENT_SET_TITLE
    }
}

/// A legally defined work-time bucket (e.g. "Teaching") with the percentage of
/// total annual work time it should occupy. `user_percentage` is the per-user
/// override, pre-merged by the data-access layer and applicable only when the
/// canton is configurable. `min_percentage`/`max_percentage` bound what the
/// configuration surface may accept; the engine never consults them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySet {
    pub id: CategorySetId,
    pub title: String,
    pub order: i64,
    #[serde(default)]
    pub percentage: Option<Decimal>,
    #[serde(default)]
    pub user_percentage: Option<Decimal>,
    #[serde(default)]
    pub min_percentage: Option<Decimal>,
    #[serde(default)]
    pub max_percentage: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CantonRules {
    pub canton_code: String,
    pub annual_work_hours: Decimal,
    #[serde(default)]
    pub is_configurable: bool,
    #[serde(default)]
    pub use_custom_work_hours: bool,
    #[serde(default)]
    pub is_working_hours_disabled: bool,
    #[serde(default)]
    pub has_subcategories: bool,
    pub category_sets: Vec<CategorySet>,
}

/// User-authored alternative to canton rules: manually weighted categories
/// against the profile's own annual work hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigProfile {
    pub id: ProfileId,
    pub annual_work_hours: Decimal,
    pub categories: Vec<ProfileCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCategory {
    pub id: CategoryId,
    pub title: String,
    /// Share of the profile's annual work time, 0-100.
    pub weight: Decimal,
    #[serde(default)]
    pub color: Option<String>,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_id: UserId,
    /// Employment fraction (0-100) scaling every annual target.
    pub workload_percent: Decimal,
    #[serde(default)]
    pub custom_work_hours: Option<Decimal>,
    pub canton_code: String,
    #[serde(default)]
    pub active_profile_id: Option<ProfileId>,
}

/// The full engine input bundle for one report computation, as handed over by
/// the external data-access collaborators (or loaded from a snapshot file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    #[serde(default)]
    pub records: Vec<TimeRecord>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub canton_rules: Option<CantonRules>,
    #[serde(default)]
    pub config_profile: Option<ConfigProfile>,
    pub user: UserData,
}

impl ReportSnapshot {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file {}", path.display()))?;
        let snapshot: ReportSnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse snapshot file {}", path.display()))?;
        info!(
            "Loaded snapshot for user {}: {} records, {} categories",
            snapshot.user.user_id,
            snapshot.records.len(),
            snapshot.categories.len()
        );
        Ok(snapshot)
    }
}
