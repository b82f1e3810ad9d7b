use tabled::{settings::Style, Table, Tabled};

use crate::history::HistoryRecord;

#[derive(Tabled)]
pub struct HistoryRow {
    #[tabled(rename = "#")]
    pub id: i64,
    #[tabled(rename = "Remaining")]
    pub remaining: String,
    #[tabled(rename = "Change")]
    pub change: String,
    #[tabled(rename = "Time")]
    pub time: String,
}

impl From<&HistoryRecord> for HistoryRow {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            id: record.id,
            remaining: record.remaining_label(),
            change: record.change_label(),
            time: record.formatted_time(),
        }
    }
}

/// Render records as a rounded table; empty input renders as an empty string
pub fn history_table(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let rows: Vec<HistoryRow> = records.iter().map(HistoryRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
