// src/targets.rs
use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::report_data::{CategorySet, EngineError, InvalidArgument};

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

pub fn days_in_year(year: i32) -> i64 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

fn ensure_percentage(name: &str, value: Decimal) -> Result<(), EngineError> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(InvalidArgument::PercentageOutOfRange {
            name: name.to_string(),
            value,
        }
        .into());
    }
    Ok(())
}

/// Percentage governing a category set. Resolution order is fixed: the user's
/// override (only when the canton is configurable), then the set's base
/// percentage, then zero.
pub fn resolve_set_percentage(set: &CategorySet, is_configurable: bool) -> Decimal {
    if is_configurable {
        if let Some(user_percentage) = set.user_percentage {
            return user_percentage;
        }
    }
    set.percentage.unwrap_or(Decimal::ZERO)
}

/// Required minutes for one category over `[start, end]` (both endpoints
/// inclusive), prorated from the annual work-hour budget.
///
/// The annual budget is spread over the day count of the END date's year; a
/// range crossing a year boundary is not split per-year. Rounding of the final
/// value is half away from zero. A percentage or workload of zero yields
/// exactly zero. Out-of-range inputs fail as `InvalidArgument` and are never
/// clamped.
pub fn compute_target_minutes(
    annual_work_hours: Decimal,
    percentage: Decimal,
    start: NaiveDate,
    end: NaiveDate,
    workload_percent: Decimal,
    use_custom_work_hours: bool,
    custom_work_hours: Option<Decimal>,
) -> Result<i64, EngineError> {
    if end < start {
        return Err(InvalidArgument::DateRangeReversed { start, end }.into());
    }
    ensure_percentage("percentage", percentage)?;
    ensure_percentage("workloadPercent", workload_percent)?;

    let effective_annual_hours = match custom_work_hours {
        Some(hours) if use_custom_work_hours => hours,
        _ => annual_work_hours,
    };
    if effective_annual_hours < Decimal::ZERO {
        return Err(InvalidArgument::WorkHoursOutOfRange {
            value: effective_annual_hours,
        }
        .into());
    }

    let days_in_year = Decimal::from(days_in_year(end.year()));
    let days_in_range = Decimal::from((end - start).num_days() + 1);
    let adjusted_annual_minutes =
        effective_annual_hours * dec!(60) / days_in_year * days_in_range;

    let target = adjusted_annual_minutes * percentage / dec!(100) * workload_percent / dec!(100);
    let rounded = target.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    debug!(
        "Target over {}..{}: {} annual hours at {}% x {}% workload -> {} min",
        start, end, effective_annual_hours, percentage, workload_percent, rounded
    );
    rounded.to_i64().ok_or_else(|| {
        InvalidArgument::WorkHoursOutOfRange {
            value: effective_annual_hours,
        }
        .into()
    })
}
