use clap::Parser;
use cardfeed::cli::commands::Cli;
use cardfeed::cli::handlers;

fn main() {
    let cli = Cli::parse();

    if cli.command.is_none() {
        // No subcommand → launch TUI
        let board_dir = match handlers::resolve_board_dir(cli.board_dir.as_deref()) {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = cardfeed::tui::run(board_dir.as_deref()) {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    cardfeed::logging::init_cli_logging();
    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
