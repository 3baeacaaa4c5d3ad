use crate::models::{ActivityRecord, StreakEntry};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Length of the run of consecutive logged days for `category` ending at `anchor`.
///
/// When nothing is logged on `anchor` itself the run is measured from the day
/// before, so an unlogged "today" does not reset the streak until a second day
/// is missed.
pub fn current_streak(records: &[ActivityRecord], category: &str, anchor: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = records
        .iter()
        .filter(|record| record.category == category)
        .map(|record| record.date)
        .collect();

    let start = if days.contains(&anchor) {
        anchor
    } else {
        match anchor.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0;
    let mut current = start;
    while days.contains(&current) {
        streak += 1;
        match current.pred_opt() {
            Some(prev) => current = prev,
            None => break,
        }
    }
    streak
}

pub fn streaks(
    records: &[ActivityRecord],
    categories: &[String],
    anchor: NaiveDate,
) -> Vec<StreakEntry> {
    categories
        .iter()
        .map(|category| StreakEntry {
            category: category.clone(),
            days: current_streak(records, category, anchor),
        })
        .collect()
}
