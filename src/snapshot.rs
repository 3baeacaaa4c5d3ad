use crate::calendar::parse_record_date;
use crate::models::{ActivityRecord, StoredRecord, StoredRow};
use tracing::debug;

/// Records that survived normalization, plus how many rows were discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub records: Vec<ActivityRecord>,
    pub dropped: usize,
}

impl Snapshot {
    /// Unreadable rows, and rows with an unparseable date or a
    /// non-numeric/negative duration, are dropped.
    pub fn from_rows(rows: &[StoredRow]) -> Self {
        let mut snapshot = Snapshot::default();
        for row in rows {
            match row.as_record().and_then(normalize) {
                Some(record) => snapshot.records.push(record),
                None => {
                    debug!(row_id = ?row.row_id(), "dropping malformed row");
                    snapshot.dropped += 1;
                }
            }
        }
        snapshot
    }

    /// Distinct categories in the order they first appear.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.category) {
                seen.push(record.category.clone());
            }
        }
        seen
    }
}

fn normalize(row: &StoredRecord) -> Option<ActivityRecord> {
    let date = parse_record_date(&row.date)?;
    let duration_minutes = row.duration.minutes()?;
    Some(ActivityRecord {
        row_id: row.row_id,
        date,
        time_of_day: row.time.clone().filter(|time| !time.trim().is_empty()),
        category: row.category.trim().to_string(),
        duration_minutes,
        notes: row.notes.clone(),
        pages: row.pages,
    })
}
