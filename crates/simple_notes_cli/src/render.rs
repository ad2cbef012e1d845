//! Plain-text rendering of the derived note view.

use chrono::{DateTime, Local, TimeZone, Utc};
use simple_notes_core::{Note, NoteId};
use std::fmt::{Display, Write};

const DATE_FORMAT: &str = "%b %d, %Y, %H:%M";

/// Formats a timestamp in the user's local time zone.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    format_timestamp_in(value, &Local)
}

pub fn format_timestamp_in<Tz>(value: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    value.with_timezone(tz).format(DATE_FORMAT).to_string()
}

/// Renders one note card. `active` marks the note loaded into the form.
pub fn render_note<F>(note: &Note, active: bool, format_date: F) -> String
where
    F: Fn(DateTime<Utc>) -> String,
{
    let mut out = String::new();
    let marker = if active { "*" } else { " " };
    let _ = writeln!(out, "{marker} {}  [{}]", note.title, note.id);
    if note.body.is_empty() {
        let _ = writeln!(out, "    No body.");
    } else {
        for line in note.body.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    let same = if note.was_edited() { "" } else { " (same)" };
    let _ = writeln!(
        out,
        "    Created: {} | Updated: {}{same}",
        format_date(note.created_at),
        format_date(note.updated_at)
    );
    out
}

/// Renders the list header and every note, or the empty state.
pub fn render_list<F>(notes: &[Note], active: Option<&NoteId>, format_date: F) -> String
where
    F: Fn(DateTime<Utc>) -> String,
{
    let mut out = format!("Your notes ({})\n", notes.len());
    if notes.is_empty() {
        out.push_str("No notes yet.\nAdd your first note with `simple-notes add --title <TITLE>`.\n");
        return out;
    }
    for note in notes {
        out.push('\n');
        out.push_str(&render_note(note, active == Some(&note.id), &format_date));
    }
    out
}
