//! One-shot commands.
//!
//! Each write awaits its ticket so the process does not exit before the
//! write commits.

use crate::render::{format_detail, format_list};
use anyhow::{anyhow, Context};
use datarecord_core::{validate_record_text, Record, RecordCoordinator, RecordId, RecordStore};

pub fn list<S: RecordStore + 'static>(
    coordinator: &RecordCoordinator<S>,
    json: bool,
) -> anyhow::Result<()> {
    let records = coordinator.all_items().current();
    if json {
        let body = serde_json::to_string_pretty(&records).context("serialize records")?;
        println!("{body}");
    } else {
        println!("{}", format_list(&records));
    }
    Ok(())
}

pub fn show<S: RecordStore + 'static>(
    coordinator: &RecordCoordinator<S>,
    id: RecordId,
) -> anyhow::Result<()> {
    match coordinator.get(id)?.current() {
        Some(record) => {
            println!("{}", format_detail(&record));
            Ok(())
        }
        None => Err(anyhow!("record {id} not found")),
    }
}

pub async fn add<S: RecordStore + 'static>(
    coordinator: &RecordCoordinator<S>,
    text: String,
) -> anyhow::Result<()> {
    validate_record_text(&text)?;
    let id = coordinator.insert(Record::unsaved(text)).wait().await?;
    println!("created record {id}");
    Ok(())
}

pub async fn edit<S: RecordStore + 'static>(
    coordinator: &RecordCoordinator<S>,
    id: RecordId,
    text: String,
) -> anyhow::Result<()> {
    validate_record_text(&text)?;
    let changed = coordinator.update(Record::new(id, text)).wait().await?;
    report_change("updated", id, changed);
    Ok(())
}

pub async fn delete<S: RecordStore + 'static>(
    coordinator: &RecordCoordinator<S>,
    id: RecordId,
) -> anyhow::Result<()> {
    let removed = coordinator.delete(Record::new(id, "")).wait().await?;
    report_change("deleted", id, removed);
    Ok(())
}

fn report_change(verb: &str, id: RecordId, rows: usize) {
    if rows == 0 {
        eprintln!("no record {id}; nothing {verb}");
    } else {
        println!("{verb} record {id}");
    }
}
