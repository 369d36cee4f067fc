use std::fs;
use std::path::Path;

use crate::io::board_io::{BoardError, CONFIG_FILE};
use crate::model::config::BoardConfig;
use crate::model::{Column, ColumnId};

/// Read board.toml, returning both the parsed config and the raw toml_edit
/// document for formatting-preserving edits.
pub fn read_config(
    board_dir: &Path,
) -> Result<(BoardConfig, toml_edit::DocumentMut), BoardError> {
    let config_path = board_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| BoardError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: BoardConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(board_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), BoardError> {
    let config_path = board_dir.join(CONFIG_FILE);
    fs::write(&config_path, doc.to_string()).map_err(|e| BoardError::WriteError {
        path: config_path,
        source: e,
    })?;
    Ok(())
}

/// Set `[feed] page_size`
pub fn set_page_size(doc: &mut toml_edit::DocumentMut, page_size: usize) {
    if !doc.contains_key("feed") {
        doc["feed"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["feed"]["page_size"] = toml_edit::value(page_size as i64);
}

/// Append a `[[columns]]` entry, picking the next free id. Returns the new id.
pub fn add_column(doc: &mut toml_edit::DocumentMut, existing: &[Column], title: &str) -> ColumnId {
    let id = ColumnId(existing.iter().map(|c| c.id.0).max().unwrap_or(0) + 1);
    if !doc.contains_key("columns") {
        doc["columns"] = toml_edit::Item::ArrayOfTables(toml_edit::ArrayOfTables::new());
    }
    if let Some(columns) = doc["columns"].as_array_of_tables_mut() {
        let mut table = toml_edit::Table::new();
        table["id"] = toml_edit::value(id.0 as i64);
        table["title"] = toml_edit::value(title);
        columns.push(table);
    }
    id
}
