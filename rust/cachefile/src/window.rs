//! Offset bookkeeping for the single cache buffer.

/// A fixed-capacity byte buffer that represents the file range `[start, end)`,
/// with `cursor` marking the next byte to consume (read side) or produce
/// (write side).
///
/// The byte at file offset `o` in `[start, end)` lives at local index `o - start`.
/// Every mutation keeps `start <= cursor <= end` and `end - start <= capacity`.
pub(crate) struct CacheWindow {
    buf: Box<[u8]>,
    start: u64,
    end: u64,
    cursor: u64,
}

impl CacheWindow {
    pub fn new(capacity: usize) -> CacheWindow {
        assert!(capacity > 0, "cache window capacity must be positive");
        CacheWindow {
            buf: vec![0u8; capacity].into_boxed_slice(),
            start: 0,
            end: 0,
            cursor: 0,
        }
    }

    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[inline]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of file bytes represented by the window.
    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Returns `true` if `pos` falls within `[start, end)`.
    #[inline]
    pub fn contains(&self, pos: u64) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Empties the window and anchors it at file offset `pos`.
    pub fn collapse_at(&mut self, pos: u64) {
        self.start = pos;
        self.end = pos;
        self.cursor = pos;
    }

    /// Moves the cursor within `[start, end]`.
    pub fn set_cursor(&mut self, pos: u64) {
        assert!(
            self.start <= pos && pos <= self.end,
            "cursor {pos} outside window {}..{}",
            self.start,
            self.end
        );
        self.cursor = pos;
    }

    /// The unused tail of the buffer, into which a refill may read.
    pub fn spare(&mut self) -> &mut [u8] {
        let len = self.len();
        &mut self.buf[len..]
    }

    /// Accounts for `n` bytes placed into [`spare`](Self::spare).
    pub fn extend(&mut self, n: usize) {
        assert!(n <= self.capacity() - self.len());
        self.end += n as u64;
        self.check();
    }

    /// Bytes between the cursor and the end of the window.
    pub fn unread(&self) -> &[u8] {
        let from = self.local(self.cursor);
        let to = self.local(self.end);
        &self.buf[from..to]
    }

    /// Advances the cursor past `n` bytes returned by [`unread`](Self::unread).
    pub fn consume(&mut self, n: usize) {
        assert!(n as u64 <= self.end - self.cursor);
        self.cursor += n as u64;
        self.check();
    }

    /// Copies as much of `src` as fits at the cursor, advancing cursor and end
    /// together. Returns the number of bytes accepted.
    pub fn append(&mut self, src: &[u8]) -> usize {
        debug_assert_eq!(self.cursor, self.end);
        let at = self.local(self.cursor);
        let n = src.len().min(self.capacity() - at);
        self.buf[at..at + n].copy_from_slice(&src[..n]);
        self.cursor += n as u64;
        self.end = self.cursor;
        self.check();
        n
    }

    /// Bytes between `start` and the cursor: buffered but not yet committed.
    pub fn pending(&self) -> &[u8] {
        &self.buf[..self.local(self.cursor)]
    }

    /// Drops the first `n` pending bytes, which the descriptor has accepted.
    /// The remainder stays attributed to the window and moves to the front.
    pub fn commit(&mut self, n: usize) {
        let pending = self.local(self.cursor);
        assert!(n <= pending);
        if n < pending {
            self.buf.copy_within(n..pending, 0);
        }
        self.start += n as u64;
        self.check();
    }

    #[inline]
    fn local(&self, pos: u64) -> usize {
        (pos - self.start) as usize
    }

    #[inline]
    fn check(&self) {
        debug_assert!(self.start <= self.cursor && self.cursor <= self.end);
        debug_assert!(self.end - self.start <= self.capacity() as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::CacheWindow;

    #[test]
    fn test_fill_and_consume() {
        let mut window = CacheWindow::new(8);
        window.collapse_at(16);
        window.spare()[..5].copy_from_slice(b"hello");
        window.extend(5);
        assert_eq!((window.start(), window.cursor(), window.end()), (16, 16, 21));
        assert!(window.contains(16));
        assert!(window.contains(20));
        assert!(!window.contains(21));

        assert_eq!(window.unread(), b"hello");
        window.consume(2);
        assert_eq!(window.unread(), b"llo");
        window.set_cursor(20);
        assert_eq!(window.unread(), b"o");
        window.consume(1);
        assert!(window.unread().is_empty());
    }

    #[test]
    fn test_append_stops_at_capacity() {
        let mut window = CacheWindow::new(4);
        assert_eq!(window.append(b"ab"), 2);
        assert_eq!(window.append(b"cdef"), 2);
        assert!(window.is_full());
        assert_eq!(window.append(b"gh"), 0);
        assert_eq!(window.pending(), b"abcd");
        assert_eq!(window.end(), 4);
    }

    #[test]
    fn test_partial_commit_keeps_remainder() {
        let mut window = CacheWindow::new(8);
        window.append(b"abcdef");
        window.commit(4);
        assert_eq!(window.start(), 4);
        assert_eq!(window.pending(), b"ef");
        assert_eq!(window.len(), 2);

        assert_eq!(window.append(b"ghijklmn"), 6);
        assert_eq!(window.pending(), b"efghijkl");
        window.commit(8);
        assert!(window.pending().is_empty());
        assert_eq!(window.start(), 12);
    }

    #[test]
    #[should_panic]
    fn test_cursor_outside_window_panics() {
        let mut window = CacheWindow::new(4);
        window.collapse_at(10);
        window.set_cursor(11);
    }
}
