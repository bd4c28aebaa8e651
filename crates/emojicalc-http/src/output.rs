//! Incidental handler output.
//!
//! Handlers may write free-form text to an [`Output`] sink alongside their
//! explicit response body. The router owns the sink through an
//! [`OutputCapture`] guard: on success the captured text is appended after
//! the body, and on any failure the guard is dropped and the text discarded.

use std::fmt;

/// A text sink for output that is not part of the explicit response body.
///
/// # Example
///
/// ```
/// use std::fmt::Write;
/// use emojicalc_http::Output;
///
/// let mut out = Output::default();
/// out.print("extra");
/// write!(out, " {}", 42).unwrap();
/// assert_eq!(out.as_str(), "extra 42");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Output {
    buffer: String,
}

impl Output {
    /// Appends text.
    pub fn print(&mut self, text: impl AsRef<str>) {
        self.buffer.push_str(text.as_ref());
    }

    /// Returns everything written so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl fmt::Write for Output {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buffer.push_str(s);
        Ok(())
    }
}

/// Scoped owner of an [`Output`] sink.
///
/// The capture is finalised exactly once: either explicitly through
/// [`finish`](Self::finish), which hands back the captured text, or by being
/// dropped, which discards it.
#[derive(Debug, Default)]
pub struct OutputCapture {
    output: Output,
}

impl OutputCapture {
    /// Starts a new, empty capture.
    #[must_use]
    pub fn begin() -> Self {
        Self::default()
    }

    /// Returns the sink to hand to a handler.
    pub fn output(&mut self) -> &mut Output {
        &mut self.output
    }

    /// Ends the capture and returns the captured text.
    #[must_use]
    pub fn finish(mut self) -> String {
        std::mem::take(&mut self.output.buffer)
    }
}

impl Drop for OutputCapture {
    fn drop(&mut self) {
        if !self.output.is_empty() {
            tracing::debug!(
                bytes = self.output.buffer.len(),
                "Discarding captured output"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_output_collects_text() {
        let mut out = Output::default();
        assert!(out.is_empty());
        out.print("a");
        out.write_str("b").unwrap();
        write!(out, "{}", 1).unwrap();
        assert_eq!(out.as_str(), "ab1");
    }

    #[test]
    fn test_capture_finish_returns_text() {
        let mut capture = OutputCapture::begin();
        capture.output().print("extra Output");
        assert_eq!(capture.finish(), "extra Output");
    }

    #[test]
    fn test_capture_finish_empty() {
        let capture = OutputCapture::begin();
        assert_eq!(capture.finish(), "");
    }

    #[test]
    fn test_capture_dropped_on_unwind() {
        let result = std::panic::catch_unwind(|| {
            let mut capture = OutputCapture::begin();
            capture.output().print("lost");
            panic!("handler failed");
        });
        assert!(result.is_err());
    }
}
