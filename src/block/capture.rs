// src/block/capture.rs

//! Bounded, single-line capture buffer.

/// Default capture capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 50;

/// Output captured from one run of a block command.
///
/// The backing buffer is allocated once at `capacity` and reused for every
/// capture; it never grows past `capacity` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    bytes: Vec<u8>,
    capacity: usize,
}

impl Capture {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Overwrite the buffer with at most `capacity` bytes of `data`.
    ///
    /// Anything past the capacity is dropped without notice.
    pub fn replace(&mut self, data: &[u8]) {
        let n = data.len().min(self.capacity);
        self.bytes.clear();
        self.bytes.extend_from_slice(&data[..n]);
    }

    /// The displayable part: everything before the first newline or NUL.
    pub fn content(&self) -> &[u8] {
        let end = self
            .bytes
            .iter()
            .position(|&b| b == b'\n' || b == b'\0')
            .unwrap_or(self.bytes.len());
        &self.bytes[..end]
    }

    pub fn is_empty(&self) -> bool {
        self.content().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_truncates_to_capacity() {
        let mut cap = Capture::with_capacity(4);
        cap.replace(b"abcdefgh");
        assert_eq!(cap.content(), b"abcd");
    }

    #[test]
    fn content_stops_at_newline_or_nul() {
        let mut cap = Capture::with_capacity(16);
        cap.replace(b"cpu 10%\nsecond line");
        assert_eq!(cap.content(), b"cpu 10%");

        cap.replace(b"vol\0garbage");
        assert_eq!(cap.content(), b"vol");
    }

    #[test]
    fn replace_does_not_keep_stale_tail() {
        let mut cap = Capture::with_capacity(16);
        cap.replace(b"long output");
        cap.replace(b"ok");
        assert_eq!(cap.content(), b"ok");
    }

    #[test]
    fn empty_when_first_byte_is_a_terminator() {
        let mut cap = Capture::with_capacity(8);
        assert!(cap.is_empty());
        cap.replace(b"\nlater");
        assert!(cap.is_empty());
    }
}
