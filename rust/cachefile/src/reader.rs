//! Read-only buffered handle.

use std::ops::Range;

use cachefile_common::{Result, error::Error};

use crate::{BufferedStream, CacheOptions, Descriptor, Mode, window::CacheWindow};

/// A read-only handle that stages data from a descriptor through one
/// block-sized cache window.
///
/// The descriptor offset always equals the window's `end`: refills read from
/// there, and slow-path seeks reposition the descriptor before refilling.
pub struct BufferedReader<D> {
    descriptor: D,
    window: CacheWindow,
    options: CacheOptions,
}

impl<D: Descriptor> BufferedReader<D> {
    /// Wraps an open descriptor positioned at offset 0, with the default block size.
    pub fn new(descriptor: D) -> BufferedReader<D> {
        Self::with_options(descriptor, CacheOptions::default())
    }

    pub fn with_options(descriptor: D, options: CacheOptions) -> BufferedReader<D> {
        BufferedReader {
            descriptor,
            window: CacheWindow::new(options.block_size),
            options,
        }
    }

    /// Refills the cache with up to one block starting at the current window end.
    ///
    /// The window is collapsed first, so on failure it stays empty. Returns the
    /// number of bytes obtained; `0` means end-of-data.
    pub fn fill(&mut self) -> Result<usize> {
        let end = self.window.end();
        self.window.collapse_at(end);
        let n = self
            .descriptor
            .raw_read(self.window.spare())
            .map_err(|e| Error::io(format!("fill at offset {end}"), e))?;
        self.window.extend(n);
        log::trace!("fill at {end}: {n} bytes");
        Ok(n)
    }

    /// Copies up to `buf.len()` bytes into `buf` and returns the count copied.
    ///
    /// A short count (possibly zero) means the source was exhausted. A refill
    /// failure is returned as an error only when no bytes were copied by this call;
    /// otherwise the bytes already copied are reported.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut pos = 0;
        while pos < buf.len() {
            if self.window.unread().is_empty() {
                match self.fill() {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) if pos == 0 => return Err(e),
                    Err(e) => {
                        log::debug!("short read of {pos} bytes after refill failure: {e}");
                        break;
                    }
                }
            }
            let unread = self.window.unread();
            let n = unread.len().min(buf.len() - pos);
            buf[pos..pos + n].copy_from_slice(&unread[..n]);
            self.window.consume(n);
            pos += n;
        }
        Ok(pos)
    }

    /// Reads a single byte. Returns `Ok(None)` at end-of-data.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.read(&mut buf)? {
            1 => Ok(Some(buf[0])),
            _ => Ok(None),
        }
    }

    /// Moves the cursor to `pos`.
    ///
    /// A target inside the cached window is served without I/O. Otherwise the
    /// descriptor is repositioned to the block containing `pos` and the cache is
    /// refilled from there. Seeking past the end of data succeeds; later reads
    /// return zero bytes.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        if self.window.contains(pos) {
            self.window.set_cursor(pos);
            return Ok(());
        }

        let aligned = self.options.align_down(pos);
        log::debug!("read seek to {pos}: refilling from block at {aligned}");
        self.reposition(aligned)?;
        self.window.collapse_at(aligned);
        self.fill()?;

        if pos <= self.window.end() {
            self.window.set_cursor(pos);
        } else {
            // The block ended before `pos`: anchor an empty window there instead.
            self.reposition(pos)?;
            self.window.collapse_at(pos);
        }
        Ok(())
    }

    /// A read cache has nothing to commit.
    pub fn flush(&mut self) -> Result<usize> {
        Ok(0)
    }

    /// Returns the file offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.window.cursor()
    }

    /// The file range currently held in the cache.
    pub fn cached_range(&self) -> Range<u64> {
        self.window.start()..self.window.end()
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Returns the size of the underlying object if it is a regular file.
    pub fn size(&self) -> Option<u64> {
        self.descriptor.size()
    }

    pub fn get_ref(&self) -> &D {
        &self.descriptor
    }

    /// Releases the descriptor and returns its status.
    pub fn close(mut self) -> Result<()> {
        log::debug!("closing reader at {}", self.window.cursor());
        self.descriptor
            .release()
            .map_err(|e| Error::io("release descriptor", e))
    }

    /// Repositions the descriptor. On failure the window collapses at its current
    /// end, which is where the descriptor still points.
    fn reposition(&mut self, pos: u64) -> Result<()> {
        log::trace!("reposition to {pos}");
        let result = match self.descriptor.reposition(pos) {
            Ok(actual) if actual == pos => Ok(()),
            Ok(actual) => Err(Error::unexpected_offset(pos, actual)),
            Err(e) => Err(Error::io(format!("reposition to {pos}"), e)),
        };
        if result.is_err() {
            let end = self.window.end();
            self.window.collapse_at(end);
        }
        result
    }
}

impl<D: Descriptor> BufferedStream for BufferedReader<D> {
    fn mode(&self) -> Mode {
        Mode::ReadOnly
    }

    fn position(&self) -> u64 {
        BufferedReader::position(self)
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        BufferedReader::seek(self, pos)
    }

    fn flush(&mut self) -> Result<usize> {
        BufferedReader::flush(self)
    }

    fn size(&self) -> Option<u64> {
        BufferedReader::size(self)
    }
}

impl<D: Descriptor> std::io::Read for BufferedReader<D> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Ok(BufferedReader::read(self, buf)?)
    }
}

impl<D: Descriptor> std::io::Seek for BufferedReader<D> {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        let target = resolve_seek(pos, self.position(), || self.size())?;
        BufferedReader::seek(self, target)?;
        Ok(target)
    }
}

/// Resolves a `SeekFrom` against the current position and, for `End`, the object size.
pub(crate) fn resolve_seek(
    pos: std::io::SeekFrom,
    current: u64,
    size: impl FnOnce() -> Option<u64>,
) -> std::io::Result<u64> {
    use std::io::SeekFrom;

    let (base, offset) = match pos {
        SeekFrom::Start(offset) => return Ok(offset),
        SeekFrom::Current(offset) => (current, offset),
        SeekFrom::End(offset) => {
            let size = size().ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "seek from end requires a regular file",
                )
            })?;
            (size, offset)
        }
    };
    base.checked_add_signed(offset).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "invalid seek to a negative or overflowing position",
        )
    })
}
