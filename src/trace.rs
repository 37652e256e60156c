//! Diagnostic sink for the traversal.

use std::io::Write;

use http::HeaderMap;

use crate::extract::PartFailure;

/// Receives human-readable traversal events.
///
/// Every method has an empty default, so sinks only implement what they show.
pub trait Diagnostics: Send {
    /// A multipart level with `boundary` starts at `depth`.
    fn enter_level(&mut self, _depth: usize, _boundary: &str) {}

    /// A part was read at `depth`; its headers are about to be classified.
    fn part_headers(&mut self, _depth: usize, _headers: &HeaderMap) {}

    /// A part (or a whole nested level) failed and was skipped.
    fn part_failed(&mut self, _failure: &PartFailure) {}

    /// The multipart level with `boundary` at `depth` is done.
    fn leave_level(&mut self, _depth: usize, _boundary: &str) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {}

/// Writes an indented trace: four spaces per nesting level, boundary markers
/// around each level and one line per header key.
#[derive(Debug)]
pub struct IndentedTrace<W> {
    out: W,
}

impl<W: Write + Send> IndentedTrace<W> {
    /// Creates a trace writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    // Trace output is best effort and never interrupts the traversal.
    fn line(&mut self, depth: usize, text: std::fmt::Arguments<'_>) {
        let _ = writeln!(self.out, "{}{}", indent(depth), text);
    }
}

impl<W: Write + Send> Diagnostics for IndentedTrace<W> {
    fn enter_level(&mut self, depth: usize, boundary: &str) {
        self.line(depth, format_args!(">>>>>>>>>>>>> {boundary}"));
    }

    fn part_headers(&mut self, depth: usize, headers: &HeaderMap) {
        for key in headers.keys() {
            let values: Vec<_> = headers
                .get_all(key)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()))
                .collect();
            self.line(
                depth,
                format_args!("Key: ({key}) - {} Value: ({values:?})", values.len()),
            );
        }
        self.line(depth, format_args!("------------"));
    }

    fn part_failed(&mut self, failure: &PartFailure) {
        let name = failure.file_name.as_deref().unwrap_or("-");
        self.line(
            failure.depth,
            format_args!("!! skipped {name} under {}: {}", failure.boundary, failure.error),
        );
    }

    fn leave_level(&mut self, depth: usize, boundary: &str) {
        self.line(depth, format_args!("<<<<<<<<<<<<< {boundary}"));
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(2 * depth.saturating_sub(1))
}
