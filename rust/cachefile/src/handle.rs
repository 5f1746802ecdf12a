//! A buffered handle whose read or write behavior is chosen once, by [`Mode`].

use cachefile_common::{Result, error::Error};

use crate::{BufferedReader, BufferedStream, BufferedWriter, CacheOptions, Descriptor, Mode};

/// A buffered handle over a read-only or write-only descriptor.
///
/// Operations that do not match the handle's mode fail with
/// `ErrorKind::InvalidOperation` and perform no I/O.
pub enum BufferedFile<D: Descriptor> {
    Reader(BufferedReader<D>),
    Writer(BufferedWriter<D>),
}

impl<D: Descriptor> BufferedFile<D> {
    /// Creates a handle with an empty cache over `descriptor`, which must be open
    /// for `mode` and positioned at offset 0.
    pub fn new(descriptor: D, mode: Mode) -> BufferedFile<D> {
        Self::with_options(descriptor, mode, CacheOptions::default())
    }

    pub fn with_options(descriptor: D, mode: Mode, options: CacheOptions) -> BufferedFile<D> {
        match mode {
            Mode::ReadOnly => {
                BufferedFile::Reader(BufferedReader::with_options(descriptor, options))
            }
            Mode::WriteOnly => {
                BufferedFile::Writer(BufferedWriter::with_options(descriptor, options))
            }
        }
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.as_reader("read")?.read(buf)
    }

    /// Reads one byte; `Ok(None)` at end-of-data.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        self.as_reader("read_byte")?.read_byte()
    }

    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.as_writer("write")?.write(buf)
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.as_writer("write_byte")?.write_byte(byte)
    }

    /// Flushes pending writes (if any) and releases the descriptor.
    pub fn close(self) -> Result<()> {
        match self {
            BufferedFile::Reader(reader) => reader.close(),
            BufferedFile::Writer(writer) => writer.close(),
        }
    }

    pub fn into_reader(self) -> Option<BufferedReader<D>> {
        match self {
            BufferedFile::Reader(reader) => Some(reader),
            BufferedFile::Writer(_) => None,
        }
    }

    pub fn into_writer(self) -> Option<BufferedWriter<D>> {
        match self {
            BufferedFile::Reader(_) => None,
            BufferedFile::Writer(writer) => Some(writer),
        }
    }

    fn as_reader(&mut self, op: &str) -> Result<&mut BufferedReader<D>> {
        match self {
            BufferedFile::Reader(reader) => Ok(reader),
            BufferedFile::Writer(_) => Err(Error::invalid_operation(format!(
                "{op} on a write-only handle"
            ))),
        }
    }

    fn as_writer(&mut self, op: &str) -> Result<&mut BufferedWriter<D>> {
        match self {
            BufferedFile::Reader(_) => Err(Error::invalid_operation(format!(
                "{op} on a read-only handle"
            ))),
            BufferedFile::Writer(writer) => Ok(writer),
        }
    }

    fn stream(&self) -> &dyn BufferedStream {
        match self {
            BufferedFile::Reader(reader) => reader,
            BufferedFile::Writer(writer) => writer,
        }
    }

    fn stream_mut(&mut self) -> &mut dyn BufferedStream {
        match self {
            BufferedFile::Reader(reader) => reader,
            BufferedFile::Writer(writer) => writer,
        }
    }
}

impl<D: Descriptor> BufferedStream for BufferedFile<D> {
    fn mode(&self) -> Mode {
        self.stream().mode()
    }

    fn position(&self) -> u64 {
        self.stream().position()
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.stream_mut().seek(pos)
    }

    fn flush(&mut self) -> Result<usize> {
        self.stream_mut().flush()
    }

    fn size(&self) -> Option<u64> {
        self.stream().size()
    }
}
