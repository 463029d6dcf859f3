//! Command selection and execution.
//!
//! Every command logs in once, then issues its requests one after another.
//! Output goes to the writer passed in; whatever was written before a
//! failure stays written.

use std::io::Write;

use tracing::info;

use crate::api::{login, Entry, Feed, FeedClient};
use crate::config::Settings;
use crate::content::render_html;
use crate::draft::{self, ExternalEditor};
use crate::error::Result;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Draft a new issue in the editor and submit it.
    Create,
    /// Search issues and list the matches.
    Search(String),
    /// List all issues.
    List,
    /// Show issues by id, optionally followed by their comments.
    Show { ids: Vec<String>, comments: bool },
}

impl Command {
    /// Pick the command from parsed flags.
    ///
    /// Creation wins over search, search over listing; ids are only
    /// consulted when neither flag is given.
    pub fn select(create: bool, search: Option<String>, comments: bool, ids: Vec<String>) -> Self {
        if create {
            Command::Create
        } else if let Some(query) = search.filter(|q| !q.is_empty()) {
            Command::Search(query)
        } else if ids.is_empty() {
            Command::List
        } else {
            Command::Show { ids, comments }
        }
    }
}

/// Log in and run `command`, writing results to `out`.
pub async fn execute<W: Write>(
    command: &Command,
    settings: &Settings,
    editor: &ExternalEditor,
    out: &mut W,
) -> Result<()> {
    info!(?command, project = %settings.project, "Running command");

    let http = FeedClient::build_http_client()?;
    let auth = login(&http, &settings.login_url, &settings.email, &settings.password).await?;
    let client = FeedClient::new(http, &settings.feeds_url, &settings.project, auth);

    match command {
        Command::Create => {
            let status = draft::submit(&client, &settings.dir, editor).await?;
            writeln!(out, "{}", status)?;
        }
        Command::Search(query) => print_feed(out, &client.search_issues(query).await?)?,
        Command::List => print_feed(out, &client.list_issues().await?)?,
        Command::Show { ids, comments } => {
            for id in ids {
                print_entry(out, &client.show_issue(id).await?)?;
                if *comments {
                    for comment in &client.list_comments(id).await?.entries {
                        print_entry(out, comment)?;
                    }
                }
            }
        }
    }

    Ok(())
}

/// One `<id>: <title>` line per entry, in feed order.
fn print_feed<W: Write>(out: &mut W, feed: &Feed) -> Result<()> {
    for entry in &feed.entries {
        writeln!(out, "{}: {}", entry.id, entry.title)?;
    }
    Ok(())
}

/// The title, then the flattened content.
fn print_entry<W: Write>(out: &mut W, entry: &Entry) -> Result<()> {
    let text = render_html(&entry.content)?;
    writeln!(out, "{}", entry.title)?;
    writeln!(out, "{}", text)?;
    Ok(())
}
