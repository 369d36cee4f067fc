use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::board_io::{self, BOARD_DIR, CONFIG_FILE, CardFile, CommentFile};
use crate::io::config_io;
use crate::model::Column;

const BOARD_TOML_TEMPLATE: &str = r##"[board]
name = "{name}"
dashboard_id = 1

# --- Columns ---
# Cards live in columns, shown left to right in this order.
# Add more with: cf column add "title"
#
# [[columns]]
# id = 1
# title = "To do"

[feed]
# comments per page in the card detail view
page_size = 10

[ui]
# show_key_hints = false
# skeleton_rows = 3

[log]
# tracing filter directive; RUST_LOG overrides it
level = "info"
file = "cardfeed.log"
"##;

/// Board name from a directory name, `sprint-board` → `Sprint Board`
fn infer_name(dir_name: &str) -> String {
    let mut name = String::with_capacity(dir_name.len());
    let mut word_start = true;
    for c in dir_name.chars() {
        if c == '-' || c == '_' {
            name.push(' ');
            word_start = true;
        } else if word_start {
            name.extend(c.to_uppercase());
            word_start = false;
        } else {
            name.push(c);
        }
    }
    name
}

/// Escape a value for use inside a basic TOML string
fn toml_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render board.toml: the commented template, then page size and columns
/// applied through toml_edit so the comments survive.
fn render_board_toml(
    name: &str,
    page_size: Option<u64>,
    columns: &[String],
) -> Result<String, Box<dyn std::error::Error>> {
    let base = BOARD_TOML_TEMPLATE.replace("{name}", &toml_escape(name));
    if page_size.is_none() && columns.is_empty() {
        return Ok(base);
    }

    let mut doc: toml_edit::DocumentMut = base.parse()?;
    if let Some(size) = page_size {
        config_io::set_page_size(&mut doc, size as usize);
    }
    let mut existing: Vec<Column> = Vec::new();
    for title in columns {
        let id = config_io::add_column(&mut doc, &existing, title);
        existing.push(Column {
            id,
            title: title.clone(),
        });
    }
    Ok(doc.to_string())
}

pub fn cmd_init(args: InitArgs, target: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match target {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let board_dir = root.join(BOARD_DIR);

    // Check if already initialized
    if board_dir.join(CONFIG_FILE).exists() {
        return Err(format!("board already exists in {}", board_dir.display()).into());
    }

    let columns: Vec<String> = args
        .column
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    if columns.iter().any(|c| c.is_empty()) {
        return Err("column title cannot be empty".into());
    }

    // Infer board name
    let name = args.name.unwrap_or_else(|| {
        root.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Untitled".to_string())
    });

    fs::create_dir_all(&board_dir)?;
    let toml_content = render_board_toml(&name, args.page_size, &columns)?;
    fs::write(board_dir.join(CONFIG_FILE), toml_content)?;
    board_io::write_cards(&board_dir, &CardFile::default())?;
    board_io::write_comments(&board_dir, &CommentFile::default())?;

    println!("Initialized board: {}", name);
    for (i, title) in columns.iter().enumerate() {
        println!("  column {}: {}", i + 1, title);
    }

    Ok(())
}
