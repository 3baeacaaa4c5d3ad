use crate::calendar::YearMonth;
use crate::config::Settings;
use crate::goals::{GoalProgress, Pacing, month_progress, pacing};
use crate::models::{ActivityRecord, CategoryMinutes, StreakEntry, TodayResponse};
use crate::rollup::{
    BookProgress, CategoryTotal, DailyMatrix, Summary, WeekdayRow, category_distribution,
    daily_matrix, reading_log, summary, weekday_matrix,
};
use crate::snapshot::Snapshot;
use crate::streak::streaks;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Category filter value meaning "every category".
pub const ALL_CATEGORIES: &str = "General";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub month: YearMonth,
    pub days_in_month: u32,
    pub category: Option<String>,
    pub categories: Vec<String>,
    pub summary: Summary,
    pub goals: Vec<GoalProgress>,
    pub pacing: Pacing,
    pub streaks: Vec<StreakEntry>,
    pub daily: DailyMatrix,
    pub weekdays: Vec<WeekdayRow>,
    pub distribution: Vec<CategoryTotal>,
    pub reading: Vec<BookProgress>,
    pub dropped_rows: usize,
}

/// Goals, pacing and streaks always look at every category; the charts and
/// totals honour `category`.
pub fn build_dashboard(
    today: NaiveDate,
    snapshot: &Snapshot,
    settings: &Settings,
    month: YearMonth,
    category: Option<&str>,
) -> Dashboard {
    let category = category
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != ALL_CATEGORIES)
        .map(str::to_string);

    let monthly: Vec<ActivityRecord> = snapshot
        .records
        .iter()
        .filter(|record| month.contains(record.date))
        .filter(|record| category.as_ref().is_none_or(|name| &record.category == name))
        .cloned()
        .collect();

    let goals = settings
        .goals
        .iter()
        .map(|goal| month_progress(&snapshot.records, goal, month))
        .collect();
    let categories = known_categories(snapshot, settings);

    Dashboard {
        today,
        month,
        days_in_month: month.days(),
        streaks: streaks(&snapshot.records, &categories, today),
        categories,
        summary: summary(&monthly),
        goals,
        pacing: pacing(&snapshot.records, &settings.goals, month, today),
        daily: daily_matrix(&monthly, month),
        weekdays: weekday_matrix(&monthly, month),
        distribution: category_distribution(&monthly),
        reading: reading_log(&monthly),
        dropped_rows: snapshot.dropped,
        category,
    }
}

/// Goal categories in configured order, then any other logged category.
pub fn known_categories(snapshot: &Snapshot, settings: &Settings) -> Vec<String> {
    let mut categories: Vec<String> = settings
        .goals
        .iter()
        .map(|goal| goal.category.clone())
        .collect();
    for category in snapshot.categories() {
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    categories
}

pub fn today_totals(records: &[ActivityRecord], today: NaiveDate) -> TodayResponse {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records.iter().filter(|record| record.date == today) {
        *totals.entry(record.category.as_str()).or_default() += u64::from(record.duration_minutes);
    }
    let total_minutes = totals.values().sum();
    TodayResponse {
        date: today,
        categories: totals
            .into_iter()
            .map(|(category, minutes)| CategoryMinutes {
                category: category.to_string(),
                minutes,
            })
            .collect(),
        total_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryGoal, DurationCell, RowId, StoredRecord, StoredRow};

    fn row(id: u64, date: &str, category: &str, minutes: i64) -> StoredRow {
        StoredRow::Record(StoredRecord {
            row_id: RowId(id),
            date: date.into(),
            time: None,
            category: category.into(),
            duration: DurationCell::Minutes(minutes),
            notes: String::new(),
            pages: None,
        })
    }

    fn settings() -> Settings {
        Settings {
            goals: vec![
                CategoryGoal {
                    category: "Studies".into(),
                    daily_target_minutes: 60,
                },
                CategoryGoal {
                    category: "Read".into(),
                    daily_target_minutes: 30,
                },
            ],
            timezone: chrono_tz::America::Sao_Paulo,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn february_reading_scenario() {
        let snapshot = Snapshot::from_rows(&[
            row(1, "2024-02-01", "Read", 30),
            row(2, "2024-02-02", "Read", 45),
        ]);
        let month = YearMonth::new(2024, 2).unwrap();
        let dashboard = build_dashboard(day(2024, 2, 2), &snapshot, &settings(), month, None);

        assert_eq!(dashboard.days_in_month, 29);
        assert_eq!(dashboard.daily.rows.len(), 29);
        assert_eq!(dashboard.weekdays.len(), 7);
        let read = dashboard.streaks.iter().find(|entry| entry.category == "Read").unwrap();
        assert_eq!(read.days, 2);
        let read_goal = dashboard.goals.iter().find(|goal| goal.category == "Read").unwrap();
        assert_eq!(read_goal.performed_minutes, 75);
        assert_eq!(read_goal.month_target_minutes, 30 * 29);
    }

    #[test]
    fn empty_log_is_all_zero() {
        let snapshot = Snapshot::default();
        let month = YearMonth::new(2024, 4).unwrap();
        let dashboard = build_dashboard(day(2024, 4, 10), &snapshot, &settings(), month, None);

        assert_eq!(dashboard.summary.total_registers, 0);
        assert!(dashboard.goals.iter().all(|goal| goal.progress_ratio == 0.0));
        assert!(dashboard.streaks.iter().all(|entry| entry.days == 0));
        assert_eq!(dashboard.daily.rows.len(), 30);
        assert!(dashboard.weekdays.iter().all(|row| row.minutes == 0));
        assert!(dashboard.distribution.is_empty());
        assert_eq!(dashboard.pacing.expected_minutes, 90 * 10);
        assert_eq!(dashboard.dropped_rows, 0);
    }

    #[test]
    fn category_filter_narrows_charts_only() {
        let snapshot = Snapshot::from_rows(&[
            row(1, "2024-02-01", "Read", 30),
            row(2, "2024-02-01", "Studies", 60),
            row(3, "bad date", "Studies", 60),
        ]);
        let month = YearMonth::new(2024, 2).unwrap();
        let dashboard =
            build_dashboard(day(2024, 2, 1), &snapshot, &settings(), month, Some("Studies"));

        assert_eq!(dashboard.category.as_deref(), Some("Studies"));
        assert_eq!(dashboard.daily.categories, vec!["Studies".to_string()]);
        assert_eq!(dashboard.summary.total_minutes, 60);
        assert_eq!(dashboard.goals.len(), 2);
        assert_eq!(dashboard.pacing.actual_minutes, 90);
        assert_eq!(dashboard.dropped_rows, 1);

        let general =
            build_dashboard(day(2024, 2, 1), &snapshot, &settings(), month, Some("General"));
        assert_eq!(general.category, None);
        assert_eq!(general.summary.total_minutes, 90);
    }

    #[test]
    fn dashboard_is_idempotent() {
        let snapshot = Snapshot::from_rows(&[
            row(1, "2024-02-01", "Read", 30),
            row(2, "2024-02-03", "Studies", 50),
            row(3, "2024-02-03", "Workout", 20),
        ]);
        let month = YearMonth::new(2024, 2).unwrap();
        let first = build_dashboard(day(2024, 2, 3), &snapshot, &settings(), month, None);
        let second = build_dashboard(day(2024, 2, 3), &snapshot, &settings(), month, None);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn known_categories_put_goals_first() {
        let snapshot = Snapshot::from_rows(&[
            row(1, "2024-02-01", "Workout", 30),
            row(2, "2024-02-01", "Read", 30),
        ]);
        assert_eq!(
            known_categories(&snapshot, &settings()),
            vec!["Studies", "Read", "Workout"]
        );
    }

    #[test]
    fn today_totals_only_count_today() {
        let snapshot = Snapshot::from_rows(&[
            row(1, "2024-02-01", "Read", 30),
            row(2, "2024-02-02", "Read", 20),
            row(3, "2024-02-02", "Studies", 40),
            row(4, "2024-02-02", "Read", 5),
        ]);
        let today = today_totals(&snapshot.records, day(2024, 2, 2));
        assert_eq!(today.total_minutes, 65);
        assert_eq!(today.categories.len(), 2);
        assert_eq!(today.categories[0].category, "Read");
        assert_eq!(today.categories[0].minutes, 25);
    }
}
