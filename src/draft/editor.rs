//! External editor launch for issue drafts.
//!
//! This module provides functionality to:
//! - Detect the user's preferred editor from the environment
//! - Run it in the foreground on a draft file and wait for it to exit

use std::env;
use std::io;
use std::path::Path;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Errors that can occur while running the external editor.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Failed to spawn the editor process.
    #[error("Failed to launch editor '{editor}': {source}")]
    Spawn {
        editor: String,
        #[source]
        source: io::Error,
    },

    /// Editor exited with a non-zero status code.
    #[error("Editor exited with status code {0}")]
    Exit(i32),

    /// Editor was terminated by a signal.
    #[error("Editor was terminated by a signal")]
    Terminated,
}

/// The text editor used to fill in drafts.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    /// The editor command to use.
    editor: String,
}

impl ExternalEditor {
    /// Create an editor from `$EDITOR`, falling back to the platform default.
    pub fn new() -> Self {
        Self {
            editor: get_editor(),
        }
    }

    /// Create an editor with a specific command.
    pub fn with_editor(editor: impl Into<String>) -> Self {
        Self {
            editor: editor.into(),
        }
    }

    /// Get the editor command that will be used.
    pub fn editor(&self) -> &str {
        &self.editor
    }

    /// Run the editor on `path` and wait for it to exit.
    ///
    /// The child inherits stdin, stdout and stderr. There is no retry and
    /// no fallback editor.
    pub fn edit(&self, path: &Path) -> Result<(), EditorError> {
        debug!(editor = %self.editor, path = %path.display(), "Launching editor");

        let status = Command::new(&self.editor)
            .arg(path)
            .status()
            .map_err(|e| EditorError::Spawn {
                editor: self.editor.clone(),
                source: e,
            })?;

        if status.success() {
            Ok(())
        } else {
            match status.code() {
                Some(code) => Err(EditorError::Exit(code)),
                None => Err(EditorError::Terminated),
            }
        }
    }
}

impl Default for ExternalEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the user's preferred editor.
///
/// Uses `$EDITOR` when it is set and non-empty, otherwise `notepad` on
/// Windows and `vim` elsewhere.
pub fn get_editor() -> String {
    env::var("EDITOR")
        .ok()
        .filter(|editor| !editor.is_empty())
        .unwrap_or_else(|| default_editor().to_string())
}

fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vim"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn with_editor_env<F: FnOnce()>(value: Option<&str>, f: F) {
        let original = env::var("EDITOR").ok();
        match value {
            Some(val) => env::set_var("EDITOR", val),
            None => env::remove_var("EDITOR"),
        }

        f();

        match original {
            Some(val) => env::set_var("EDITOR", val),
            None => env::remove_var("EDITOR"),
        }
    }

    #[test]
    #[serial]
    fn test_get_editor_with_editor_env() {
        with_editor_env(Some("nvim"), || assert_eq!(get_editor(), "nvim"));
    }

    #[test]
    #[serial]
    fn test_get_editor_fallback() {
        with_editor_env(None, || assert_eq!(get_editor(), default_editor()));
    }

    #[test]
    #[serial]
    fn test_get_editor_empty_counts_as_unset() {
        with_editor_env(Some(""), || assert_eq!(get_editor(), default_editor()));
    }

    #[test]
    fn test_default_editor_per_platform() {
        if cfg!(windows) {
            assert_eq!(default_editor(), "notepad");
        } else {
            assert_eq!(default_editor(), "vim");
        }
    }

    #[test]
    fn test_with_editor() {
        let editor = ExternalEditor::with_editor("nano");
        assert_eq!(editor.editor(), "nano");
    }

    #[test]
    fn test_edit_with_nonexistent_editor() {
        let editor = ExternalEditor::with_editor("nonexistent-editor-that-does-not-exist-12345");
        let result = editor.edit(Path::new("draft.txt"));

        match result {
            Err(EditorError::Spawn { editor: name, .. }) => {
                assert_eq!(name, "nonexistent-editor-that-does-not-exist-12345");
            }
            other => panic!("Expected Spawn error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_edit_success() {
        let editor = ExternalEditor::with_editor("true");
        assert!(editor.edit(Path::new("draft.txt")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_edit_non_zero_exit() {
        let editor = ExternalEditor::with_editor("false");
        assert!(matches!(
            editor.edit(Path::new("draft.txt")),
            Err(EditorError::Exit(1))
        ));
    }

    #[test]
    fn test_editor_spawn_error_display() {
        let error = EditorError::Spawn {
            editor: "nonexistent-editor".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "command not found"),
        };
        let msg = format!("{}", error);
        assert!(msg.contains("nonexistent-editor"));
        assert!(msg.contains("Failed to launch editor"));
    }

    #[test]
    fn test_editor_exit_error_display() {
        assert!(EditorError::Exit(2).to_string().contains("status code 2"));
        assert!(EditorError::Terminated
            .to_string()
            .contains("terminated by a signal"));
    }
}
