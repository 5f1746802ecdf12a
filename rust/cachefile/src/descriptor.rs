//! The raw byte source/sink underneath a buffered handle.

/// An exclusively owned, positioned byte stream: an open file, a standard stream,
/// a pipe, or an in-memory stand-in.
///
/// Every method maps to exactly one blocking primitive. Implementations must not
/// retry or loop internally: short counts are reported as-is and the buffered
/// handles above decide what to do with them.
pub trait Descriptor: Send {
    /// Reads up to `buf.len()` bytes at the current descriptor offset.
    ///
    /// Returns the number of bytes read; `0` signals end-of-data.
    fn raw_read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Writes up to `buf.len()` bytes at the current descriptor offset.
    ///
    /// **NOTE**: a successful return may be a short count.
    fn raw_write(&mut self, buf: &[u8]) -> std::io::Result<usize>;

    /// Moves the descriptor offset to the absolute position `pos` and returns the
    /// new offset.
    fn reposition(&mut self, pos: u64) -> std::io::Result<u64>;

    /// Returns the byte length of the object if it is a regular file, `None` for
    /// objects without a well-defined size (pipes, terminals).
    fn size(&self) -> Option<u64>;

    /// Releases the descriptor. Must be called at most once; any later primitive
    /// call fails.
    fn release(&mut self) -> std::io::Result<()>;
}

impl<T> Descriptor for Box<T>
where
    T: Descriptor + ?Sized,
{
    fn raw_read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.as_mut().raw_read(buf)
    }

    fn raw_write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.as_mut().raw_write(buf)
    }

    fn reposition(&mut self, pos: u64) -> std::io::Result<u64> {
        self.as_mut().reposition(pos)
    }

    fn size(&self) -> Option<u64> {
        self.as_ref().size()
    }

    fn release(&mut self) -> std::io::Result<()> {
        self.as_mut().release()
    }
}

/// The error returned by primitives invoked on a released descriptor.
pub(crate) fn released_error() -> std::io::Error {
    std::io::Error::other("descriptor already released")
}
