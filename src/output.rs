use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::record::ToolRecord;

/// Stable sort by (category, name).
pub fn sort_records(records: &mut [ToolRecord]) {
    records.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
}

/// Sort and write all records as indented JSON.
pub fn write_records(path: &Path, records: &mut [ToolRecord]) -> Result<()> {
    sort_records(records);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(&*records)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
