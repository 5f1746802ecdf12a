//! Write-only buffered handle.

use cachefile_common::{Result, error::Error};

use crate::{
    BufferedStream, CacheOptions, Descriptor, Mode, reader::resolve_seek, window::CacheWindow,
};

/// A write-only handle that accumulates bytes in one block-sized window and
/// commits them to the descriptor when the window fills, on `flush()`, on
/// `seek()` and on `close()`.
///
/// Bytes in `[start, cursor)` are buffered but not yet accepted by the descriptor;
/// `cursor == end` at all times.
pub struct BufferedWriter<D: Descriptor> {
    descriptor: D,
    window: CacheWindow,
    options: CacheOptions,
    closed: bool,
}

impl<D: Descriptor> BufferedWriter<D> {
    /// Wraps an open descriptor positioned at offset 0, with the default block size.
    pub fn new(descriptor: D) -> BufferedWriter<D> {
        Self::with_options(descriptor, CacheOptions::default())
    }

    pub fn with_options(descriptor: D, options: CacheOptions) -> BufferedWriter<D> {
        BufferedWriter {
            descriptor,
            window: CacheWindow::new(options.block_size),
            options,
            closed: false,
        }
    }

    /// Buffers up to `buf.len()` bytes and returns the number accepted.
    ///
    /// A full window is flushed before more bytes are copied. If that flush fails
    /// before any byte of `buf` was accepted, the error is returned; otherwise the
    /// call stops and reports the bytes accepted so far.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let mut pos = 0;
        while pos < buf.len() {
            if self.window.is_full() {
                match self.flush() {
                    Ok(0) if pos == 0 => return Err(write_zero()),
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) if pos == 0 => return Err(e),
                    Err(e) => {
                        log::debug!("short write of {pos} bytes after flush failure: {e}");
                        break;
                    }
                }
            }
            pos += self.window.append(&buf[pos..]);
        }
        Ok(pos)
    }

    /// Buffers a single byte.
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        match self.write(&[byte])? {
            1 => Ok(()),
            _ => Err(write_zero()),
        }
    }

    /// Issues one raw write of the pending bytes and returns the count the
    /// descriptor accepted. Accepted bytes leave the window; on failure nothing
    /// changes and the call may be retried.
    pub fn flush(&mut self) -> Result<usize> {
        let pending = self.window.pending();
        if pending.is_empty() {
            return Ok(0);
        }
        let start = self.window.start();
        let n = self
            .descriptor
            .raw_write(pending)
            .map_err(|e| Error::io(format!("flush at offset {start}"), e))?;
        log::trace!("flush at {start}: {n} of {} bytes", pending.len());
        self.window.commit(n);
        Ok(n)
    }

    /// Flushes any pending bytes, then repositions the descriptor to exactly `pos`
    /// and anchors an empty window there.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        log::debug!("write seek to {pos}");
        self.flush_all()?;
        match self.descriptor.reposition(pos) {
            Ok(actual) if actual == pos => {}
            Ok(actual) => return Err(Error::unexpected_offset(pos, actual)),
            Err(e) => return Err(Error::io(format!("reposition to {pos}"), e)),
        }
        self.window.collapse_at(pos);
        Ok(())
    }

    /// Returns the file offset of the next byte to be written.
    pub fn position(&self) -> u64 {
        self.window.cursor()
    }

    /// Number of buffered bytes not yet accepted by the descriptor.
    pub fn pending_len(&self) -> usize {
        self.window.pending().len()
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Returns the size of the underlying object if it is a regular file.
    /// Pending bytes are not included.
    pub fn size(&self) -> Option<u64> {
        self.descriptor.size()
    }

    pub fn get_ref(&self) -> &D {
        &self.descriptor
    }

    /// Flushes pending bytes and releases the descriptor. Both steps are always
    /// attempted; the first failure is returned.
    pub fn close(mut self) -> Result<()> {
        log::debug!(
            "closing writer at {} with {} pending bytes",
            self.window.cursor(),
            self.pending_len()
        );
        self.closed = true;
        let flushed = self.flush_all();
        let released = self
            .descriptor
            .release()
            .map_err(|e| Error::io("release descriptor", e));
        flushed.and(released)
    }

    /// Flushes until the window is empty.
    fn flush_all(&mut self) -> Result<()> {
        while !self.window.pending().is_empty() {
            if self.flush()? == 0 {
                return Err(write_zero());
            }
        }
        Ok(())
    }
}

impl<D: Descriptor> Drop for BufferedWriter<D> {
    fn drop(&mut self) {
        if self.closed || self.window.pending().is_empty() {
            return;
        }
        if let Err(e) = self.flush_all() {
            log::warn!(
                "dropping writer with {} unflushed bytes: {e}",
                self.pending_len()
            );
        }
    }
}

impl<D: Descriptor> BufferedStream for BufferedWriter<D> {
    fn mode(&self) -> Mode {
        Mode::WriteOnly
    }

    fn position(&self) -> u64 {
        BufferedWriter::position(self)
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        BufferedWriter::seek(self, pos)
    }

    fn flush(&mut self) -> Result<usize> {
        BufferedWriter::flush(self)
    }

    fn size(&self) -> Option<u64> {
        BufferedWriter::size(self)
    }
}

impl<D: Descriptor> std::io::Write for BufferedWriter<D> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(BufferedWriter::write(self, buf)?)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(self.flush_all()?)
    }
}

impl<D: Descriptor> std::io::Seek for BufferedWriter<D> {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        if matches!(pos, std::io::SeekFrom::End(_)) {
            self.flush_all()?;
        }
        let target = resolve_seek(pos, self.position(), || self.size())?;
        BufferedWriter::seek(self, target)?;
        Ok(target)
    }
}

fn write_zero() -> Error {
    Error::io(
        "flush",
        std::io::Error::new(
            std::io::ErrorKind::WriteZero,
            "descriptor accepted no bytes",
        ),
    )
}
