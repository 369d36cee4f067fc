use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::io::lock::LockError;
use crate::model::{Board, BoardConfig, Card, Comment};

pub const BOARD_DIR: &str = "board";
pub const CONFIG_FILE: &str = "board.toml";
pub const CARDS_FILE: &str = "cards.json";
pub const COMMENTS_FILE: &str = "comments.json";

/// Error type for board I/O operations
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("not a cardfeed board: no board/ directory found")]
    NotABoard,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse board.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit board.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("could not parse {path}: {source}")]
    DataParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0}")]
    Lock(#[from] LockError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BoardError {
    /// Whether the data on disk is unusable, as opposed to temporarily
    /// unreachable (missing file handle, lock held by another process)
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            BoardError::ConfigParseError(_)
                | BoardError::ConfigEditError(_)
                | BoardError::DataParseError { .. }
        )
    }
}

/// On-disk shape of cards.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFile {
    #[serde(default = "first_id")]
    pub next_id: u64,
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// On-disk shape of comments.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentFile {
    #[serde(default = "first_id")]
    pub next_id: u64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

fn first_id() -> u64 {
    1
}

impl Default for CardFile {
    fn default() -> Self {
        CardFile {
            next_id: first_id(),
            cards: Vec::new(),
        }
    }
}

impl Default for CommentFile {
    fn default() -> Self {
        CommentFile {
            next_id: first_id(),
            comments: Vec::new(),
        }
    }
}

/// Discover the board by walking up from the given directory, looking for a
/// `board/` subdirectory holding a board.toml.
pub fn discover_board(start: &Path) -> Result<PathBuf, BoardError> {
    let mut current = start.to_path_buf();
    loop {
        let board_dir = current.join(BOARD_DIR);
        if board_dir.is_dir() && board_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(BoardError::NotABoard);
        }
    }
}

/// Load the board config and its cards (comments are paged in separately)
pub fn load_board(root: &Path) -> Result<Board, BoardError> {
    let board_dir = root.join(BOARD_DIR);
    if !board_dir.is_dir() {
        return Err(BoardError::NotABoard);
    }
    let config = read_board_config(&board_dir)?;
    let cards = read_cards(&board_dir)?.cards;
    Ok(Board {
        root: root.to_path_buf(),
        board_dir,
        config,
        cards,
    })
}

pub fn read_board_config(board_dir: &Path) -> Result<BoardConfig, BoardError> {
    let config_path = board_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&config_path).map_err(|e| BoardError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

pub fn read_cards(board_dir: &Path) -> Result<CardFile, BoardError> {
    read_json_or_default(&board_dir.join(CARDS_FILE))
}

pub fn write_cards(board_dir: &Path, file: &CardFile) -> Result<(), BoardError> {
    write_json(&board_dir.join(CARDS_FILE), file)
}

pub fn read_comments(board_dir: &Path) -> Result<CommentFile, BoardError> {
    read_json_or_default(&board_dir.join(COMMENTS_FILE))
}

pub fn write_comments(board_dir: &Path, file: &CommentFile) -> Result<(), BoardError> {
    write_json(&board_dir.join(COMMENTS_FILE), file)
}

/// A missing data file reads as empty
fn read_json_or_default<T>(path: &Path) -> Result<T, BoardError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let text = fs::read_to_string(path).map_err(|e| BoardError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| BoardError::DataParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), BoardError> {
    let mut content = serde_json::to_string_pretty(value).map_err(|e| {
        BoardError::DataParseError {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    content.push('\n');
    atomic_write(path, content.as_bytes()).map_err(|e| BoardError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
