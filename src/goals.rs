use crate::calendar::YearMonth;
use crate::models::{ActivityRecord, CategoryGoal};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub category: String,
    pub daily_target_minutes: u32,
    pub performed_minutes: u64,
    pub month_target_minutes: u64,
    /// Unclamped; above 1.0 means the month target is already exceeded.
    pub progress_ratio: f64,
    pub display_ratio: f64,
    pub percent_complete: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaceStatus {
    Ahead,
    Behind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pacing {
    pub days_elapsed: u32,
    pub expected_minutes: u64,
    pub actual_minutes: u64,
    pub delta_minutes: i64,
    pub status: PaceStatus,
}

pub fn month_progress(
    records: &[ActivityRecord],
    goal: &CategoryGoal,
    month: YearMonth,
) -> GoalProgress {
    let performed_minutes: u64 = records
        .iter()
        .filter(|record| record.category == goal.category && month.contains(record.date))
        .map(|record| u64::from(record.duration_minutes))
        .sum();
    let month_target_minutes = u64::from(goal.daily_target_minutes) * u64::from(month.days());

    let progress_ratio = if month_target_minutes == 0 {
        0.0
    } else {
        performed_minutes as f64 / month_target_minutes as f64
    };

    GoalProgress {
        category: goal.category.clone(),
        daily_target_minutes: goal.daily_target_minutes,
        performed_minutes,
        month_target_minutes,
        progress_ratio,
        display_ratio: progress_ratio.clamp(0.0, 1.0),
        percent_complete: (progress_ratio * 100.0).floor() as u32,
    }
}

/// Days of `month` that count towards the expected total as of `today`.
pub fn days_elapsed(month: YearMonth, today: NaiveDate) -> u32 {
    let current = YearMonth::of(today);
    if month == current {
        today.day()
    } else if month < current {
        month.days()
    } else {
        0
    }
}

/// Minutes logged on tracked categories minus what the goals expect so far.
pub fn pacing(
    records: &[ActivityRecord],
    goals: &[CategoryGoal],
    month: YearMonth,
    today: NaiveDate,
) -> Pacing {
    let days_elapsed = days_elapsed(month, today);
    let daily_total: u64 = goals.iter().map(|goal| u64::from(goal.daily_target_minutes)).sum();
    let expected_minutes = daily_total * u64::from(days_elapsed);

    let actual_minutes: u64 = records
        .iter()
        .filter(|record| month.contains(record.date) && record.date <= today)
        .filter(|record| goals.iter().any(|goal| goal.category == record.category))
        .map(|record| u64::from(record.duration_minutes))
        .sum();

    let delta_minutes = actual_minutes as i64 - expected_minutes as i64;
    Pacing {
        days_elapsed,
        expected_minutes,
        actual_minutes,
        delta_minutes,
        status: if delta_minutes >= 0 {
            PaceStatus::Ahead
        } else {
            PaceStatus::Behind
        },
    }
}
