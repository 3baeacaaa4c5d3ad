use crate::calendar::{WEEKDAYS, YearMonth, weekday_name};
use crate::models::ActivityRecord;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const READING_CATEGORY: &str = "Read";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub day: String,
    /// Minutes per category, aligned with `DailyMatrix::categories`.
    pub minutes: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMatrix {
    pub categories: Vec<String>,
    pub rows: Vec<DailyRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayRow {
    pub weekday: &'static str,
    pub minutes: u64,
    pub hours: f64,
    pub mean_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub minutes: u64,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_registers: usize,
    pub total_minutes: u64,
    pub total_hours: f64,
    pub mean_hours_per_register: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookProgress {
    pub title: String,
    pub minutes: u64,
    pub pages: u64,
    pub sessions: usize,
}

pub fn hours(minutes: u64) -> f64 {
    round_hours(minutes as f64 / 60.0)
}

fn round_hours(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One row per day of `month`, one column per category found in the month.
/// Days and categories without records hold 0.
pub fn daily_matrix(records: &[ActivityRecord], month: YearMonth) -> DailyMatrix {
    let in_month: Vec<&ActivityRecord> = records
        .iter()
        .filter(|record| month.contains(record.date))
        .collect();
    let categories: Vec<String> = in_month
        .iter()
        .map(|record| record.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut totals: BTreeMap<(NaiveDate, &str), u64> = BTreeMap::new();
    for record in &in_month {
        *totals
            .entry((record.date, record.category.as_str()))
            .or_default() += u64::from(record.duration_minutes);
    }

    let rows = month
        .dates()
        .map(|date| DailyRow {
            date,
            day: date.format("%d").to_string(),
            minutes: categories
                .iter()
                .map(|category| totals.get(&(date, category.as_str())).copied().unwrap_or(0))
                .collect(),
        })
        .collect();

    DailyMatrix { categories, rows }
}

/// Monday-first totals for `month`; `mean_hours` divides by how many times the
/// weekday occurs in the month.
pub fn weekday_matrix(records: &[ActivityRecord], month: YearMonth) -> Vec<WeekdayRow> {
    let mut minutes = [0u64; 7];
    for record in records.iter().filter(|record| month.contains(record.date)) {
        let index = record.date.weekday().num_days_from_monday() as usize;
        minutes[index] += u64::from(record.duration_minutes);
    }

    let mut occurrences = [0u32; 7];
    for date in month.dates() {
        occurrences[date.weekday().num_days_from_monday() as usize] += 1;
    }

    WEEKDAYS
        .iter()
        .enumerate()
        .map(|(index, day)| {
            let total_hours = hours(minutes[index]);
            let mean_hours = if occurrences[index] == 0 {
                0.0
            } else {
                round_hours(minutes[index] as f64 / 60.0 / f64::from(occurrences[index]))
            };
            WeekdayRow {
                weekday: weekday_name(*day),
                minutes: minutes[index],
                hours: total_hours,
                mean_hours,
            }
        })
        .collect()
}

/// Time per category, largest first.
pub fn category_distribution(records: &[ActivityRecord]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.category.as_str()).or_default() += u64::from(record.duration_minutes);
    }
    let mut distribution: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, minutes)| CategoryTotal {
            category: category.to_string(),
            minutes,
            hours: hours(minutes),
        })
        .collect();
    distribution.sort_by(|a, b| {
        b.minutes
            .cmp(&a.minutes)
            .then_with(|| a.category.cmp(&b.category))
    });
    distribution
}

pub fn summary(records: &[ActivityRecord]) -> Summary {
    let total_minutes: u64 = records.iter().map(|record| u64::from(record.duration_minutes)).sum();
    let total_registers = records.len();
    let mean_hours_per_register = if total_registers == 0 {
        0.0
    } else {
        round_hours(total_minutes as f64 / 60.0 / total_registers as f64)
    };
    Summary {
        total_registers,
        total_minutes,
        total_hours: hours(total_minutes),
        mean_hours_per_register,
    }
}

/// Reading sessions grouped by book title, most read first.
pub fn reading_log(records: &[ActivityRecord]) -> Vec<BookProgress> {
    let mut books: BTreeMap<String, BookProgress> = BTreeMap::new();
    for record in records.iter().filter(|record| record.category == READING_CATEGORY) {
        let title = record.notes.trim().to_string();
        let entry = books.entry(title.clone()).or_insert_with(|| BookProgress {
            title,
            minutes: 0,
            pages: 0,
            sessions: 0,
        });
        entry.minutes += u64::from(record.duration_minutes);
        entry.pages += u64::from(record.pages.unwrap_or(0));
        entry.sessions += 1;
    }
    let mut log: Vec<BookProgress> = books.into_values().collect();
    log.sort_by(|a, b| b.minutes.cmp(&a.minutes).then_with(|| a.title.cmp(&b.title)));
    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowId;

    fn record(date: NaiveDate, category: &str, minutes: u32) -> ActivityRecord {
        ActivityRecord {
            row_id: RowId(0),
            date,
            time_of_day: None,
            category: category.into(),
            duration_minutes: minutes,
            notes: String::new(),
            pages: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn column(matrix: &DailyMatrix, category: &str) -> Option<Vec<u64>> {
        let index = matrix.categories.iter().position(|name| name == category)?;
        Some(matrix.rows.iter().map(|row| row.minutes[index]).collect())
    }

    #[test]
    fn daily_matrix_is_dense_for_leap_february() {
        let month = YearMonth::new(2024, 2).unwrap();
        let records = vec![
            record(day(2024, 2, 1), "Read", 30),
            record(day(2024, 2, 2), "Read", 45),
        ];
        let matrix = daily_matrix(&records, month);
        assert_eq!(matrix.rows.len(), 29);
        assert_eq!(matrix.categories, vec!["Read".to_string()]);
        assert_eq!(matrix.rows[0].day, "01");
        assert_eq!(matrix.rows[1].minutes, vec![45]);
        assert_eq!(matrix.rows[2].minutes, vec![0]);
        assert_eq!(matrix.rows[28].date, day(2024, 2, 29));
    }

    #[test]
    fn daily_matrix_conserves_minutes_per_category() {
        let month = YearMonth::new(2024, 3).unwrap();
        let records = vec![
            record(day(2024, 3, 1), "Studies", 60),
            record(day(2024, 3, 1), "Studies", 25),
            record(day(2024, 3, 9), "English", 30),
            record(day(2024, 3, 31), "Studies", 15),
            record(day(2024, 4, 1), "Studies", 999),
        ];
        let matrix = daily_matrix(&records, month);
        assert_eq!(matrix.categories, vec!["English".to_string(), "Studies".to_string()]);
        assert_eq!(column(&matrix, "Studies").unwrap().iter().sum::<u64>(), 100);
        assert_eq!(column(&matrix, "English").unwrap().iter().sum::<u64>(), 30);
        assert!(column(&matrix, "Workout").is_none());
        assert!(matrix.rows.windows(2).all(|pair| pair[0].date < pair[1].date));
    }

    #[test]
    fn empty_month_still_has_every_day() {
        let matrix = daily_matrix(&[], YearMonth::new(2023, 2).unwrap());
        assert_eq!(matrix.rows.len(), 28);
        assert!(matrix.categories.is_empty());
        assert!(matrix.rows.iter().all(|row| row.minutes.is_empty()));
    }

    #[test]
    fn weekday_matrix_always_has_seven_monday_first_rows() {
        // 2024-02-05 is a Monday.
        let month = YearMonth::new(2024, 2).unwrap();
        let records = vec![
            record(day(2024, 2, 5), "Read", 60),
            record(day(2024, 2, 12), "Studies", 120),
        ];
        let rows = weekday_matrix(&records, month);
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].weekday, "Monday");
        assert_eq!(rows[6].weekday, "Sunday");
        assert_eq!(rows[0].minutes, 180);
        assert_eq!(rows[0].hours, 3.0);
        // Four Mondays in February 2024.
        assert_eq!(rows[0].mean_hours, 0.75);
        assert!(rows[1..].iter().all(|row| row.minutes == 0 && row.mean_hours == 0.0));
    }

    #[test]
    fn distribution_sorts_largest_first() {
        let records = vec![
            record(day(2024, 2, 1), "Read", 30),
            record(day(2024, 2, 1), "Studies", 90),
            record(day(2024, 2, 2), "English", 30),
        ];
        let distribution = category_distribution(&records);
        let order: Vec<_> = distribution.iter().map(|total| total.category.as_str()).collect();
        assert_eq!(order, vec!["Studies", "English", "Read"]);
        assert_eq!(distribution[0].hours, 1.5);
    }

    #[test]
    fn summary_of_empty_log_is_zero() {
        let summary = summary(&[]);
        assert_eq!(summary.total_registers, 0);
        assert_eq!(summary.mean_hours_per_register, 0.0);
    }

    #[test]
    fn summary_mean_per_register() {
        let records = vec![
            record(day(2024, 2, 1), "Read", 30),
            record(day(2024, 2, 2), "Read", 90),
        ];
        let summary = summary(&records);
        assert_eq!(summary.total_registers, 2);
        assert_eq!(summary.total_minutes, 120);
        assert_eq!(summary.total_hours, 2.0);
        assert_eq!(summary.mean_hours_per_register, 1.0);
    }

    #[test]
    fn reading_log_groups_by_title() {
        let mut first = record(day(2024, 2, 1), "Read", 30);
        first.notes = "Dune".into();
        first.pages = Some(20);
        let mut second = record(day(2024, 2, 2), "Read", 45);
        second.notes = " Dune ".into();
        second.pages = Some(35);
        let mut other = record(day(2024, 2, 2), "Read", 10);
        other.notes = "Emma".into();
        let studies = record(day(2024, 2, 2), "Studies", 60);

        let log = reading_log(&[first, second, other, studies]);
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].title, "Dune");
        assert_eq!(log[0].minutes, 75);
        assert_eq!(log[0].pages, 55);
        assert_eq!(log[0].sessions, 2);
        assert_eq!(log[1].pages, 0);
    }
}
