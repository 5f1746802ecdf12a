//! An in-memory [`Descriptor`] with call accounting and fault injection.
//!
//! `MemoryFile` is shared storage; every `open()` produces an independent
//! `MemoryDescriptor` positioned at offset 0, so a test can write through one
//! handle, close it, and read the same bytes back through another.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{Descriptor, descriptor::released_error};

/// Counts of primitive calls issued against a [`MemoryFile`], failed ones included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoStats {
    pub reads: usize,
    pub writes: usize,
    pub repositions: usize,
    pub releases: usize,
}

#[derive(Clone, Default)]
pub struct MemoryFile(Arc<Mutex<MemoryFileInner>>);

struct MemoryFileInner {
    data: Vec<u8>,
    stats: IoStats,
    failing_reads: usize,
    failing_writes: usize,
    failing_repositions: usize,
    write_limit: Option<usize>,
    seekable: bool,
}

impl Default for MemoryFileInner {
    fn default() -> Self {
        MemoryFileInner {
            data: Vec::new(),
            stats: IoStats::default(),
            failing_reads: 0,
            failing_writes: 0,
            failing_repositions: 0,
            write_limit: None,
            seekable: true,
        }
    }
}

impl MemoryFile {
    /// Opens a new descriptor over this file, positioned at offset 0.
    pub fn open(&self) -> MemoryDescriptor {
        MemoryDescriptor {
            file: self.clone(),
            pos: 0,
            released: false,
        }
    }

    /// Returns a copy of the current contents.
    pub fn contents(&self) -> Vec<u8> {
        self.lock().data.clone()
    }

    pub fn stats(&self) -> IoStats {
        self.lock().stats
    }

    pub fn reset_stats(&self) {
        self.lock().stats = IoStats::default();
    }

    /// Makes the next `count` raw reads fail without transferring data.
    pub fn fail_next_reads(&self, count: usize) {
        self.lock().failing_reads = count;
    }

    /// Makes the next `count` raw writes fail without transferring data.
    pub fn fail_next_writes(&self, count: usize) {
        self.lock().failing_writes = count;
    }

    /// Makes the next `count` repositions fail, leaving the offset unchanged.
    pub fn fail_next_repositions(&self, count: usize) {
        self.lock().failing_repositions = count;
    }

    /// Caps the number of bytes a single raw write accepts.
    pub fn set_write_limit(&self, limit: Option<usize>) {
        self.lock().write_limit = limit;
    }

    /// A non-seekable file behaves like a pipe: repositioning fails and the size
    /// is undefined.
    pub fn set_seekable(&self, seekable: bool) {
        self.lock().seekable = seekable;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryFileInner> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl From<Vec<u8>> for MemoryFile {
    fn from(data: Vec<u8>) -> MemoryFile {
        let file = MemoryFile::default();
        file.lock().data = data;
        file
    }
}

/// A positioned view of a [`MemoryFile`].
pub struct MemoryDescriptor {
    file: MemoryFile,
    pos: u64,
    released: bool,
}

impl MemoryDescriptor {
    pub fn file(&self) -> &MemoryFile {
        &self.file
    }

    fn check_open(&self) -> std::io::Result<()> {
        if self.released {
            Err(released_error())
        } else {
            Ok(())
        }
    }
}

impl Descriptor for MemoryDescriptor {
    fn raw_read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.check_open()?;
        let mut inner = self.file.lock();
        inner.stats.reads += 1;
        if take_fault(&mut inner.failing_reads) {
            return Err(injected("read"));
        }
        let len = inner.data.len() as u64;
        if self.pos >= len {
            return Ok(0);
        }
        let from = self.pos as usize;
        let n = buf.len().min(inner.data.len() - from);
        buf[..n].copy_from_slice(&inner.data[from..from + n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn raw_write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.check_open()?;
        let mut inner = self.file.lock();
        inner.stats.writes += 1;
        if take_fault(&mut inner.failing_writes) {
            return Err(injected("write"));
        }
        let n = inner.write_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
        let from = self.pos as usize;
        if inner.data.len() < from + n {
            inner.data.resize(from + n, 0);
        }
        inner.data[from..from + n].copy_from_slice(&buf[..n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn reposition(&mut self, pos: u64) -> std::io::Result<u64> {
        self.check_open()?;
        let mut inner = self.file.lock();
        inner.stats.repositions += 1;
        if !inner.seekable {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotSeekable,
                "memory file is not seekable",
            ));
        }
        if take_fault(&mut inner.failing_repositions) {
            return Err(injected("reposition"));
        }
        self.pos = pos;
        Ok(pos)
    }

    fn size(&self) -> Option<u64> {
        let inner = self.file.lock();
        inner.seekable.then_some(inner.data.len() as u64)
    }

    fn release(&mut self) -> std::io::Result<()> {
        self.check_open()?;
        self.released = true;
        self.file.lock().stats.releases += 1;
        Ok(())
    }
}

fn take_fault(counter: &mut usize) -> bool {
    if *counter > 0 {
        *counter -= 1;
        true
    } else {
        false
    }
}

fn injected(op: &str) -> std::io::Error {
    std::io::Error::other(format!("injected {op} failure"))
}

#[cfg(test)]
mod tests {
    use super::{IoStats, MemoryFile};
    use crate::Descriptor;

    #[test]
    fn test_descriptors_share_contents() {
        let file = MemoryFile::default();
        let mut writer = file.open();
        assert_eq!(writer.raw_write(b"abcd").unwrap(), 4);
        writer.reposition(6).unwrap();
        assert_eq!(writer.raw_write(b"xy").unwrap(), 2);
        assert_eq!(file.contents(), b"abcd\0\0xy");

        let mut reader = file.open();
        let mut buf = [0u8; 3];
        assert_eq!(reader.raw_read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"abc");
        reader.reposition(7).unwrap();
        assert_eq!(reader.raw_read(&mut buf).unwrap(), 1);
        assert_eq!(reader.raw_read(&mut buf).unwrap(), 0);
        assert_eq!(reader.size(), Some(8));
    }

    #[test]
    fn test_stats_and_faults() {
        let file = MemoryFile::from(b"0123456789".to_vec());
        file.fail_next_reads(1);
        file.set_write_limit(Some(2));
        let mut desc = file.open();
        let mut buf = [0u8; 4];
        assert!(desc.raw_read(&mut buf).is_err());
        assert_eq!(desc.raw_read(&mut buf).unwrap(), 4);
        assert_eq!(desc.raw_write(b"abc").unwrap(), 2);
        assert_eq!(file.contents(), b"0123ab6789");
        assert_eq!(
            file.stats(),
            IoStats {
                reads: 2,
                writes: 1,
                repositions: 0,
                releases: 0,
            }
        );
    }

    #[test]
    fn test_released_descriptor_fails() {
        let file = MemoryFile::default();
        let mut desc = file.open();
        desc.release().unwrap();
        assert!(desc.release().is_err());
        assert!(desc.raw_write(b"a").is_err());
        assert_eq!(file.stats().releases, 1);
    }

    #[test]
    fn test_unseekable_file() {
        let file = MemoryFile::from(vec![1, 2, 3]);
        file.set_seekable(false);
        let mut desc = file.open();
        assert_eq!(desc.size(), None);
        assert!(desc.reposition(1).is_err());
    }
}
