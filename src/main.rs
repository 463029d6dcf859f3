//! IssueFeed - a command-line client for hosted issue trackers.
//!
//! With no arguments, lists every issue of the configured project. Issue ids
//! show those issues, `-c` adds their comments, `-s WORD` searches and `-C`
//! files a new issue from a draft edited in `$EDITOR`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use issuefeed::commands::{self, Command};
use issuefeed::config::{self, Settings};
use issuefeed::draft::ExternalEditor;
use issuefeed::logging;

#[derive(Debug, Parser)]
#[command(name = "issuefeed", version, about = "Browse and file issues on a hosted issue tracker")]
struct Cli {
    /// Search issues for WORD
    #[arg(short = 's', value_name = "WORD")]
    search: Option<String>,

    /// Create a new issue in $EDITOR
    #[arg(short = 'C')]
    create: bool,

    /// Show comments along with each issue
    #[arg(short = 'c')]
    comments: bool,

    /// Read settings from PATH instead of the per-user settings.json
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Issue ids to show
    #[arg(value_name = "ID")]
    ids: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("issuefeed: logging disabled: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            eprintln!("issuefeed: {}", e.user_message());
            if let Some(action) = e.suggested_action() {
                eprintln!("{}", action);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> issuefeed::Result<()> {
    let path = match cli.config {
        Some(path) => path,
        None => config::settings_path()?,
    };
    let settings = Settings::load(&path)?;

    let command = Command::select(cli.create, cli.search, cli.comments, cli.ids);
    let mut out = std::io::stdout();
    commands::execute(&command, &settings, &ExternalEditor::new(), &mut out).await
}
