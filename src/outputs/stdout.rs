//! Plain-text report written while the answers arrive.

use std::io::{self, Write};

/// Write the `=== Query N: title ===` line that opens a section.
pub fn write_section_header<W: Write>(out: &mut W, number: usize, title: &str) -> io::Result<()> {
    writeln!(out, "\n=== Query {number}: {title} ===")?;
    out.flush()
}

/// Write one answer, preceded by `[label]` when it belongs to a single source.
pub fn write_answer<W: Write>(out: &mut W, label: Option<&str>, text: &str) -> io::Result<()> {
    match label {
        Some(label) => writeln!(out, "\n[{label}]\n{text}")?,
        None => writeln!(out, "{text}")?,
    }
    out.flush()
}
