use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier handed out by a record store when a row is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One logged unit of time, as the analytics functions see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRecord {
    pub row_id: RowId,
    pub date: NaiveDate,
    pub time_of_day: Option<String>,
    pub category: String,
    pub duration_minutes: u32,
    pub notes: String,
    pub pages: Option<u32>,
}

/// Duration cell of a stored row. Rows written by hand may hold text here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationCell {
    Minutes(i64),
    Text(String),
    Other(serde_json::Value),
}

impl DurationCell {
    pub fn minutes(&self) -> Option<u32> {
        match self {
            DurationCell::Minutes(value) => u32::try_from(*value).ok(),
            DurationCell::Text(text) => text.trim().parse::<u32>().ok(),
            DurationCell::Other(_) => None,
        }
    }
}

impl Default for DurationCell {
    fn default() -> Self {
        DurationCell::Minutes(0)
    }
}

/// A row exactly as the store keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub row_id: RowId,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    pub category: String,
    #[serde(default)]
    pub duration: DurationCell,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub pages: Option<u32>,
}

/// A stored row. Rows that no longer have the record shape are kept verbatim
/// so a rewrite of the log never loses them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredRow {
    Record(StoredRecord),
    Unreadable(serde_json::Value),
}

impl StoredRow {
    pub fn row_id(&self) -> Option<RowId> {
        match self {
            StoredRow::Record(record) => Some(record.row_id),
            StoredRow::Unreadable(value) => value
                .get("row_id")
                .and_then(serde_json::Value::as_u64)
                .map(RowId),
        }
    }

    pub fn as_record(&self) -> Option<&StoredRecord> {
        match self {
            StoredRow::Record(record) => Some(record),
            StoredRow::Unreadable(_) => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut StoredRecord> {
        match self {
            StoredRow::Record(record) => Some(record),
            StoredRow::Unreadable(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<String>,
    pub category: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub pages: Option<u32>,
}

impl NewRecord {
    pub fn into_stored(self, row_id: RowId) -> StoredRecord {
        StoredRecord {
            row_id,
            date: self.date.to_string(),
            time: self.time,
            category: self.category,
            duration: DurationCell::Minutes(i64::from(self.duration_minutes)),
            notes: self.notes,
            pages: self.pages,
        }
    }
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordUpdate {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub pages: Option<u32>,
}

impl RecordUpdate {
    pub fn apply(self, row: &mut StoredRecord) {
        if let Some(date) = self.date {
            row.date = date.to_string();
        }
        if let Some(time) = self.time {
            row.time = Some(time);
        }
        if let Some(category) = self.category {
            row.category = category;
        }
        if let Some(minutes) = self.duration_minutes {
            row.duration = DurationCell::Minutes(i64::from(minutes));
        }
        if let Some(notes) = self.notes {
            row.notes = notes;
        }
        if let Some(pages) = self.pages {
            row.pages = Some(pages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.time.is_none()
            && self.category.is_none()
            && self.duration_minutes.is_none()
            && self.notes.is_none()
            && self.pages.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGoal {
    pub category: String,
    pub daily_target_minutes: u32,
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub row_id: RowId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakEntry {
    pub category: String,
    pub days: u32,
}

#[derive(Debug, Serialize)]
pub struct StreaksResponse {
    pub today: NaiveDate,
    pub streaks: Vec<StreakEntry>,
    pub dropped_rows: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoryMinutes {
    pub category: String,
    pub minutes: u64,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub categories: Vec<CategoryMinutes>,
    pub total_minutes: u64,
}
