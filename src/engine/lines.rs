//! Incremental line splitting for transcoder diagnostics

/// Splits a byte stream into lines on both `\r` and `\n`.
///
/// The transcoder rewrites its stats line in place with carriage returns,
/// so a `\n`-only reader would see a single huge line at exit.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns every line completed by it. Empty lines are dropped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\r' || byte == b'\n' {
                self.take_line(&mut lines);
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    /// Flush the trailing partial line at end of stream
    pub fn finish(&mut self) -> Option<String> {
        let mut lines = Vec::new();
        self.take_line(&mut lines);
        lines.pop()
    }

    fn take_line(&mut self, lines: &mut Vec<String>) {
        if self.pending.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.pending).trim_end().to_string();
        self.pending.clear();
        if !line.is_empty() {
            lines.push(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_carriage_return_and_newline() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push(b"Input #0\nframe=1 time=00:00:01.00\rframe=2 time=00:00:02.00\r\n");
        assert_eq!(
            lines,
            vec!["Input #0", "frame=1 time=00:00:01.00", "frame=2 time=00:00:02.00"]
        );
    }

    #[test]
    fn test_lines_span_chunks() {
        let mut splitter = LineSplitter::new();
        assert!(splitter.push(b"frame=1 ti").is_empty());
        assert_eq!(splitter.push(b"me=00:00:01.00\rfr"), vec!["frame=1 time=00:00:01.00"]);
        assert_eq!(splitter.finish(), Some("fr".to_string()));
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push(b"bad \xff byte\n");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("bad "));
    }
}
