//! New-issue drafts edited in an external program.
//!
//! A draft goes through these steps:
//! 1. A template is written to a randomly named file in the settings directory
//! 2. The user's editor runs on it in the foreground
//! 3. The edited text is parsed into author, title and body
//! 4. The fields are escaped into a fixed Atom entry and posted
//!
//! The draft file is removed when the workflow ends, whether it succeeded
//! or not. Any failure ends the workflow.

mod editor;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::types::{ATOM_NAMESPACE, ISSUES_NAMESPACE};
use crate::api::FeedClient;

pub use editor::{get_editor, EditorError, ExternalEditor};

const FROM_PREFIX: &str = "from: ";
const TITLE_PREFIX: &str = "title: ";

/// Status given to every new issue.
pub const INITIAL_STATUS: &str = "Started";

/// Labels given to every new issue.
pub const INITIAL_LABELS: [&str; 2] = ["-Type-Defect", "-Priority-Medium"];

/// The text a new draft starts from.
pub const TEMPLATE: &str = concat!(
    "from: \n",
    "title: \n",
    "--------------\n",
    "Before filing a bug, please check whether it has been fixed since\n",
    "the latest release and retry what you did to reproduce the problem.\n",
    "Thanks.\n",
    "\n",
    "What steps will reproduce the problem?\n",
    "1.\n",
    "2.\n",
    "3.\n",
    "\n",
    "What is the expected output?\n",
    "\n",
    "\n",
    "What do you see instead?\n",
    "\n",
    "\n",
    "Which version are you using?\n",
    "\n",
    "\n",
    "Which operating system are you using?\n",
    "\n",
    "\n",
    "Please provide any additional information below.\n",
);

/// Errors that end a draft workflow.
#[derive(Debug, Error)]
pub enum DraftError {
    /// The edited draft does not have the expected header lines.
    #[error("failed to create issue")]
    Validation,

    /// The editor could not be run or failed.
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// The draft file could not be written or read back.
    #[error("Draft file error: {0}")]
    Io(#[from] io::Error),
}

/// A parsed draft, ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// Author name from the `from:` line.
    pub from: String,
    /// Issue title from the `title:` line.
    pub title: String,
    /// Everything below the separator line.
    pub body: String,
}

impl Draft {
    /// Parse edited draft text.
    ///
    /// Line 0 must be `from: <name>` and line 1 `title: <title>`, both with
    /// a non-empty value; line 2 is the separator and is dropped; the rest,
    /// joined with newlines, is the body. CRLF line endings are accepted.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::Validation` when there are fewer than four lines
    /// or a header line is wrong. The error does not say which check failed.
    pub fn parse(text: &str) -> Result<Self, DraftError> {
        let text = text.replace("\r\n", "\n");
        let lines: Vec<&str> = text.split('\n').collect();

        if lines.len() < 4 {
            debug!("Draft has {} lines, need at least 4", lines.len());
            return Err(DraftError::Validation);
        }

        let from = header_value(lines[0], FROM_PREFIX)?;
        let title = header_value(lines[1], TITLE_PREFIX)?;
        let body = lines[3..].join("\n");

        Ok(Self {
            from: from.to_string(),
            title: title.to_string(),
            body,
        })
    }

    /// Assemble the Atom entry posted to create the issue.
    ///
    /// Only the title, content, author name and the summary, status and
    /// label extensions are sent; everything else is assigned by the server.
    /// The summary repeats the title.
    pub fn to_atom_entry(&self) -> String {
        let title = xml_escape(&self.title);
        format!(
            "<?xml version='1.0' encoding='UTF-8'?>\n\
             <entry xmlns='{atom}' xmlns:issues='{issues}'>\n\
             <title>{title}</title>\n\
             <content type='html'>{body}</content>\n\
             <author><name>{from}</name></author>\n\
             <issues:updates>\n\
             <issues:summary>{title}</issues:summary>\n\
             <issues:status>{status}</issues:status>\n\
             <issues:label>{label0}</issues:label>\n\
             <issues:label>{label1}</issues:label>\n\
             </issues:updates>\n\
             </entry>",
            atom = ATOM_NAMESPACE,
            issues = ISSUES_NAMESPACE,
            title = title,
            body = xml_escape(&self.body),
            from = xml_escape(&self.from),
            status = INITIAL_STATUS,
            label0 = INITIAL_LABELS[0],
            label1 = INITIAL_LABELS[1],
        )
    }
}

fn header_value<'a>(line: &'a str, prefix: &str) -> Result<&'a str, DraftError> {
    match line.strip_prefix(prefix) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => {
            debug!("Draft header {:?} missing or empty", prefix.trim_end());
            Err(DraftError::Validation)
        }
    }
}

/// Escape text for XML element content.
///
/// Replaces `<`, `>`, `"`, `'` and `&` with their named entities and leaves
/// every other character alone. Escaping already-escaped text encodes the
/// ampersands again.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

/// A draft file on disk, removed when dropped.
struct DraftFile {
    path: PathBuf,
}

impl DraftFile {
    /// Write the template to `<dir>/<random>.txt`.
    fn create(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let file = Self {
            path: dir.join(format!("{}.txt", rand::random::<u32>())),
        };

        let contents = if cfg!(windows) {
            TEMPLATE.replace('\n', "\r\n")
        } else {
            TEMPLATE.to_string()
        };
        fs::write(&file.path, contents)?;

        debug!(path = %file.path.display(), "Draft template written");
        Ok(file)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DraftFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to clean up draft file {:?}: {}", self.path, e);
            }
        }
    }
}

/// Write a draft into `dir`, let the user edit it, and parse the result.
///
/// # Errors
///
/// Fails if the draft file cannot be written or read, the editor fails, or
/// the edited text does not parse.
pub fn compose(dir: &Path, editor: &ExternalEditor) -> Result<Draft, DraftError> {
    let file = DraftFile::create(dir)?;
    debug!(editor = editor.editor(), path = %file.path().display(), "Composing draft");
    editor.edit(file.path())?;
    let text = fs::read_to_string(file.path())?;
    Draft::parse(&text)
}

/// Run the whole workflow and post the new issue.
///
/// Returns the HTTP status line of the submission.
///
/// The editor runs in the foreground and blocks the calling thread until it
/// exits. That holds the whole current-thread runtime, which has nothing
/// else to schedule until the draft is back. `block_in_place` is not usable
/// here since it panics outside the multi-threaded runtime.
pub async fn submit(
    client: &FeedClient,
    dir: &Path,
    editor: &ExternalEditor,
) -> crate::error::Result<String> {
    let draft = compose(dir, editor)?;
    info!(title = %draft.title, "Submitting new issue");
    Ok(client.create_issue(&draft.to_atom_entry()).await?)
}
