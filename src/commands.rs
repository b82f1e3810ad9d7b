use std::path::Path;

use owo_colors::OwoColorize;
use rusqlite::types::Value;
use winnie::config::{self, WinnieConfig};
use winnie::contract::{self, COLUMN_ID};
use winnie::ui::{self, Icons};
use winnie::{Counter, Database, HistoryLoader, HistoryProvider, Preferences};

#[derive(Debug, Clone, Copy)]
pub enum Direction {
    Up,
    Down,
}

fn open_provider(cfg: &WinnieConfig) -> anyhow::Result<HistoryProvider> {
    let db_path = cfg.database_path();
    config::ensure_db_dir(&db_path)?;
    Ok(HistoryProvider::new(Database::open(&db_path)).with_update_policy(cfg.update_policy()))
}

pub fn run_adjust(cfg: &WinnieConfig, direction: Direction) -> anyhow::Result<()> {
    let provider = open_provider(cfg)?;
    let adjustment = {
        let mut counter = Counter::load(&provider, Preferences::new(cfg.preferences_path()))?;
        match direction {
            Direction::Up => counter.plus()?,
            Direction::Down => counter.minus()?,
        }
    };
    provider.close()?;

    ui::cue(adjustment.cue);
    let change = format!("{:+}", adjustment.change);
    println!(
        "{} {}",
        adjustment.count.to_string().bold(),
        change.style(ui::theme().for_change(adjustment.change))
    );
    tracing::debug!("Recorded {}", adjustment.record_uri);
    Ok(())
}

pub fn run_count(cfg: &WinnieConfig) -> anyhow::Result<()> {
    let count = Preferences::new(cfg.preferences_path()).saved_count()?;
    println!("{}", count);
    Ok(())
}

pub fn run_history(cfg: &WinnieConfig, limit: Option<usize>, json: bool) -> anyhow::Result<()> {
    let provider = open_provider(cfg)?;
    let records = HistoryLoader::with_limit(&provider, limit)?.records().to_vec();
    provider.close()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{} No history yet.", Icons::CLOCK);
        return Ok(());
    }

    ui::header(&format!("History ({} record(s))", records.len()));
    println!("{}", ui::history_table(&records));
    Ok(())
}

/// Delete one record by id, or every record when `id` is `None`
pub fn run_delete(cfg: &WinnieConfig, id: Option<i64>) -> anyhow::Result<()> {
    let provider = open_provider(cfg)?;
    let uri = contract::history_uri();
    let rows = match id {
        Some(id) => {
            let filter = format!("{} = ?", COLUMN_ID);
            provider.delete(&uri, Some(filter.as_str()), &[Value::Integer(id)])?
        }
        None => provider.delete(&uri, None, &[])?,
    };
    provider.close()?;

    match (id, rows) {
        (Some(id), 0) => ui::warn(&format!("No record with id {}", id)),
        _ => ui::success(&format!("Deleted {} record(s)", rows)),
    }
    Ok(())
}

pub fn run_stats(cfg: &WinnieConfig) -> anyhow::Result<()> {
    let provider = open_provider(cfg)?;
    let uri = contract::history_uri();
    let rows = provider.count()?;
    let version = provider.database().schema_version()?;
    provider.close()?;

    ui::section("Winnie");
    ui::info("Database", &cfg.database_path().display().to_string());
    ui::info("Schema version", &version.to_string());
    ui::info("Table URI", &uri.to_uri_string());
    ui::info("MIME type", provider.mime_type(&uri).unwrap_or("-"));
    ui::info("Records", &rows.to_string());
    ui::info("Preferences", &cfg.preferences_path().display().to_string());
    Ok(())
}

pub fn run_init(path: &Path, cfg: &WinnieConfig, force: bool) -> anyhow::Result<()> {
    config::write_config(path, cfg, force)?;
    ui::success(&format!("Wrote {}", path.display()));
    Ok(())
}
