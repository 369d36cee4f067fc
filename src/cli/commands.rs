use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cf", about = concat!("cardfeed v", env!("CARGO_PKG_VERSION"), " - kanban cards and their comments"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different board directory
    #[arg(short = 'C', long = "board-dir", global = true)]
    pub board_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new board in the current directory
    Init(InitArgs),
    /// List cards grouped by column
    Cards,
    /// Show card details
    Show(ShowArgs),
    /// List a card's comments, newest first, one page at a time
    Comments(CommentsArgs),
    /// Add, edit or remove a comment
    Comment(CommentCmd),
    /// Add, edit or remove a card
    Card(CardCmd),
    /// Column management
    Column(ColumnCmd),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Board name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Comments per page
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub page_size: Option<u64>,
    /// Create an initial column (repeatable, in order)
    #[arg(long)]
    pub column: Vec<String>,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ShowArgs {
    /// Card ID
    pub id: u64,
}

#[derive(Args)]
pub struct CommentsArgs {
    /// Card ID
    pub card: u64,
    /// Continue after this cursor (from a previous page)
    #[arg(long, conflicts_with = "all")]
    pub cursor: Option<u64>,
    /// Follow cursors until the feed is exhausted
    #[arg(long)]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// Comment commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CommentCmd {
    #[command(subcommand)]
    pub action: CommentAction,
}

#[derive(Subcommand)]
pub enum CommentAction {
    /// Add a comment to a card
    Add {
        /// Card ID
        card: u64,
        /// Comment text
        text: String,
    },
    /// Replace a comment's text
    Edit {
        /// Card ID
        card: u64,
        /// Comment ID
        id: u64,
        /// New text
        text: String,
    },
    /// Delete a comment
    Rm {
        /// Card ID
        card: u64,
        /// Comment ID
        id: u64,
    },
}

// ---------------------------------------------------------------------------
// Card commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CardCmd {
    #[command(subcommand)]
    pub action: CardActionCmd,
}

#[derive(Subcommand)]
pub enum CardActionCmd {
    /// Add a card to a column
    Add {
        /// Column ID
        column: u64,
        /// Card title
        title: String,
        /// Card description
        #[arg(long)]
        description: Option<String>,
        /// Tag (repeatable)
        #[arg(long)]
        tag: Vec<String>,
    },
    /// Change a card's title or description
    Edit {
        /// Card ID
        id: u64,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a card and its comments
    Rm {
        /// Card ID
        id: u64,
    },
}

// ---------------------------------------------------------------------------
// Column commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ColumnCmd {
    #[command(subcommand)]
    pub action: ColumnAction,
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// Append a column to the board
    Add {
        /// Column title
        title: String,
    },
    /// List columns
    List,
}
