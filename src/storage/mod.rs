use crate::models::{ListingReference, PropertyRecord};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// The historical dataset is written with a BOM so spreadsheet tools pick
/// up the accented column names; the intermediate dataset is plain UTF-8.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

pub fn save_listing_refs(path: &Path, references: &[ListingReference]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for reference in references {
        writer.serialize(reference)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_listing_refs(path: &Path) -> Result<Vec<ListingReference>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    reader
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load the persisted historical dataset, or `None` on the first run.
pub fn load_history(path: &Path) -> Result<Option<Vec<PropertyRecord>>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(&raw);
    let mut reader = csv::Reader::from_reader(raw);
    let records = reader
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(records))
}

pub fn save_history(path: &Path, records: &[PropertyRecord]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reconcile a freshly crawled batch with the existing history: one record
/// per URL, a batch record always superseding an older one with the same
/// URL (whole-record replacement, no field merge). Surviving keys keep
/// their first-insertion order.
pub fn merge_history(
    history: Vec<PropertyRecord>,
    batch: Vec<PropertyRecord>,
) -> Vec<PropertyRecord> {
    let mut merged: Vec<PropertyRecord> = Vec::with_capacity(history.len() + batch.len());
    let mut slot_by_url: HashMap<String, usize> = HashMap::new();

    for record in history.into_iter().chain(batch) {
        match slot_by_url.get(&record.url) {
            Some(&slot) => merged[slot] = record,
            None => {
                slot_by_url.insert(record.url.clone(), merged.len());
                merged.push(record);
            }
        }
    }
    merged
}
