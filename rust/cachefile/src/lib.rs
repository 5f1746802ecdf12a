//! Single-window buffered I/O over a raw descriptor:
//! - `BufferedReader`: read-only cache with block-aligned refills and cache-hit seeks.
//! - `BufferedWriter`: write-only staging buffer committed through `flush()`.
//! - `BufferedFile`: a handle whose behavior is selected once, at construction, by `Mode`.
//!
//! The underlying byte source/sink is abstracted by the [`Descriptor`] trait, with a
//! filesystem implementation ([`fs::FileDescriptor`]) and an in-memory one
//! ([`memory::MemoryDescriptor`]) that counts calls and injects faults.

pub mod descriptor;
pub mod fs;
pub mod handle;
pub mod memory;
pub mod options;
mod reader;
mod window;
mod writer;


pub use cachefile_common::{Result, error::Error, error::ErrorKind};
pub use descriptor::Descriptor;
pub use handle::BufferedFile;
pub use options::{BLOCK, CacheOptions};
pub use reader::BufferedReader;
pub use writer::BufferedWriter;

/// Access mode of a buffered handle, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ReadOnly,
    WriteOnly,
}

/// The capability shared by read-only and write-only handles.
pub trait BufferedStream {
    /// Returns the access mode this handle was created with.
    fn mode(&self) -> Mode;

    /// Returns the file offset of the next byte to be read or written.
    fn position(&self) -> u64;

    /// Moves the logical cursor to the absolute file offset `pos`.
    fn seek(&mut self, pos: u64) -> Result<()>;

    /// Commits buffered writes to the descriptor with a single raw write and returns
    /// the number of bytes written. Read-only handles report `Ok(0)`.
    fn flush(&mut self) -> Result<usize>;

    /// Returns the size of the underlying object if it is a regular file.
    fn size(&self) -> Option<u64>;
}
