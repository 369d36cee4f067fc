use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::card::Column;

/// Configuration from board.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub board: BoardInfo,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl BoardConfig {
    /// Title of a column, falling back to its numeric id
    pub fn column_title(&self, id: super::card::ColumnId) -> String {
        self.columns
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.title.clone())
            .unwrap_or_else(|| format!("column {}", id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInfo {
    pub name: String,
    #[serde(default = "default_dashboard_id")]
    pub dashboard_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Comments per page served by the local backend
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Number of placeholder rows drawn while a page is loading
    #[serde(default = "default_skeleton_rows")]
    pub skeleton_rows: usize,
    /// Theme overrides, `name = "#RRGGBB"`
    #[serde(default)]
    pub colors: HashMap<String, String>,
    #[serde(default)]
    pub tag_colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_key_hints: true,
            skeleton_rows: default_skeleton_rows(),
            colors: HashMap::new(),
            tag_colors: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file name, relative to the board directory
    #[serde(default = "default_log_file")]
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_dashboard_id() -> u64 {
    1
}

fn default_page_size() -> usize {
    10
}

fn default_skeleton_rows() -> usize {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "cardfeed.log".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let config: BoardConfig = toml::from_str("[board]\nname = \"b\"\n").unwrap();
        assert_eq!(config.board.name, "b");
        assert_eq!(config.board.dashboard_id, 1);
        assert!(config.columns.is_empty());
        assert_eq!(config.feed.page_size, 10);
        assert!(config.ui.show_key_hints);
        assert_eq!(config.ui.skeleton_rows, 3);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.file, "cardfeed.log");
    }

    #[test]
    fn column_title_falls_back_to_id() {
        let config: BoardConfig = toml::from_str(
            "[board]\nname = \"b\"\n\n[[columns]]\nid = 1\ntitle = \"To do\"\n",
        )
        .unwrap();
        assert_eq!(config.column_title(super::super::card::ColumnId(1)), "To do");
        assert_eq!(config.column_title(super::super::card::ColumnId(9)), "column 9");
    }
}
