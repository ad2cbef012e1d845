//! Interactive delete confirmation.

use simple_notes_core::{ConfirmDelete, Note};
use std::io::{BufRead, Write};

/// Asks a yes/no question on `output` and reads the answer from `input`.
///
/// Anything other than `y`/`yes` (including read errors) declines.
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ConfirmDelete for PromptConfirm<R, W> {
    fn confirm_delete(&mut self, note: &Note) -> bool {
        let prompt = format!(
            "Delete \"{}\"? This cannot be undone. [y/N] ",
            note.title
        );
        if self.output.write_all(prompt.as_bytes()).is_err() || self.output.flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if self.input.read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
