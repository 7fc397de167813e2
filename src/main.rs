use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use sprig::commands;
use sprig::logging;

#[derive(Parser)]
#[command(
    name = "sprig",
    version,
    about = "A keyboard-driven outline editor for the terminal"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create .sprig/ with an empty outline in the current directory
    Init {
        /// Replace an existing outline with an empty one
        #[arg(long)]
        force: bool,
    },
    /// Open the interactive outline editor
    View {
        /// Snapshot file to open (defaults to the workspace outline)
        file: Option<PathBuf>,
        /// Launch with a built-in sample outline (no workspace required)
        #[arg(long, conflicts_with = "file")]
        demo: bool,
    },
    /// Print the outline as an indented tree
    List {
        file: Option<PathBuf>,
    },
    /// Validate a snapshot and summarize it
    Check {
        file: Option<PathBuf>,
    },
    /// Rewrite a snapshot in canonical form
    Fmt {
        file: Option<PathBuf>,
        /// Write a plain array instead of {"data": [...]}
        #[arg(long)]
        bare: bool,
        /// Fail instead of writing when the file would change
        #[arg(long)]
        check: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The viewer sets up its own file logging once it knows the workspace.
    match &cli.command {
        Command::View { .. } => {}
        Command::Init { .. } => {
            logging::init_stderr(commands::configured_log_level(None).as_deref());
        }
        Command::List { file } | Command::Check { file } | Command::Fmt { file, .. } => {
            let level = commands::configured_log_level(file.as_deref());
            logging::init_stderr(level.as_deref());
        }
    }

    match cli.command {
        Command::Init { force } => commands::init::run(force),
        Command::View { file, demo } => commands::view::run(file.as_deref(), demo),
        Command::List { file } => commands::list::run(file.as_deref()),
        Command::Check { file } => commands::check::run(file.as_deref()),
        Command::Fmt { file, bare, check } => commands::fmt::run(file.as_deref(), bare, check),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn demo_conflicts_with_explicit_file() {
        let parsed = Cli::try_parse_from(["sprig", "view", "notes.json", "--demo"]);
        let err = parsed.err().expect("expected clap parse error");
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn fmt_accepts_flags_and_optional_file() {
        let cli = Cli::try_parse_from(["sprig", "fmt", "--bare", "--check"])
            .expect("fmt flags should parse");
        match cli.command {
            Command::Fmt { file, bare, check } => {
                assert!(file.is_none());
                assert!(bare && check);
            }
            _ => panic!("expected fmt command"),
        }
    }

    #[test]
    fn init_force_flag() {
        let cli = Cli::try_parse_from(["sprig", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Command::Init { force: true }));
    }
}
