//! Filesystem-backed descriptors: opening paths and standard streams, querying
//! sizes, and releasing descriptors with an observable status.

use std::{
    fs::File,
    io::{Read, Seek, SeekFrom, Write},
    path::Path,
};

use cachefile_common::{
    Result,
    error::{Error, ErrorKind},
};

use crate::{BufferedFile, CacheOptions, Descriptor, Mode, descriptor::released_error};

#[cfg_attr(any(unix, target_os = "redox", target_os = "wasi"), path = "unix.rs")]
#[cfg_attr(windows, path = "windows.rs")]
mod platform;

/// A [`Descriptor`] backed by an open file or a duplicated standard stream.
pub struct FileDescriptor {
    file: Option<File>,
}

impl FileDescriptor {
    pub fn new(file: File) -> FileDescriptor {
        FileDescriptor { file: Some(file) }
    }

    /// Duplicates standard input.
    pub fn stdin() -> std::io::Result<FileDescriptor> {
        platform::dup_stdin().map(FileDescriptor::new)
    }

    /// Duplicates standard output.
    pub fn stdout() -> std::io::Result<FileDescriptor> {
        platform::dup_stdout().map(FileDescriptor::new)
    }

    fn file(&mut self) -> std::io::Result<&mut File> {
        self.file.as_mut().ok_or_else(released_error)
    }
}

impl From<File> for FileDescriptor {
    fn from(file: File) -> FileDescriptor {
        FileDescriptor::new(file)
    }
}

impl Descriptor for FileDescriptor {
    fn raw_read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file()?.read(buf)
    }

    fn raw_write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file()?.write(buf)
    }

    fn reposition(&mut self, pos: u64) -> std::io::Result<u64> {
        self.file()?.seek(SeekFrom::Start(pos))
    }

    fn size(&self) -> Option<u64> {
        let metadata = self.file.as_ref()?.metadata().ok()?;
        metadata.is_file().then(|| metadata.len())
    }

    fn release(&mut self) -> std::io::Result<()> {
        let file = self.file.take().ok_or_else(released_error)?;
        platform::close(file)
    }
}

/// Opens `path` for `mode`, or the matching standard stream when `path` is `None`
/// (standard input for reading, standard output for writing).
///
/// Write mode creates the file if needed and truncates it.
pub fn open(path: Option<&Path>, mode: Mode) -> Result<FileDescriptor> {
    let Some(path) = path else {
        let stream = match mode {
            Mode::ReadOnly => FileDescriptor::stdin(),
            Mode::WriteOnly => FileDescriptor::stdout(),
        };
        return stream.map_err(|e| Error::io("duplicate standard stream", e));
    };
    let file = platform::open_options(mode)
        .open(path)
        .map_err(|e| Error::io(path.display().to_string(), e))?;
    Ok(FileDescriptor::new(file))
}

/// Opens `path` (or a standard stream) and wraps it in a buffered handle.
///
/// On failure, prints `<path>: <reason>` to standard error and exits the process
/// with status 1.
pub fn open_check(
    path: Option<&Path>,
    mode: Mode,
    options: CacheOptions,
) -> BufferedFile<FileDescriptor> {
    match open(path, mode) {
        Ok(descriptor) => BufferedFile::with_options(descriptor, mode, options),
        Err(e) => {
            let name = path.map_or_else(|| "<stdio>".to_string(), |p| p.display().to_string());
            let reason = match e.into_kind() {
                ErrorKind::Io { source, .. } => source.to_string(),
                kind => kind.to_string(),
            };
            eprintln!("{name}: {reason}");
            std::process::exit(1);
        }
    }
}

/// Returns the byte length of the object behind `descriptor`, or `None` if it is
/// not a regular file (for instance, a pipe).
pub fn filesize(descriptor: &FileDescriptor) -> Option<u64> {
    descriptor.size()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{FileDescriptor, filesize, open};
    use crate::{BufferedFile, Descriptor, Mode};

    #[test]
    fn test_open_missing_file_fails() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("missing.bin");
        let err = open(Some(&path), Mode::ReadOnly).err().expect("open must fail");
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_write_mode_truncates() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("out.bin");
        std::fs::write(&path, b"old contents").unwrap();

        let descriptor = open(Some(&path), Mode::WriteOnly).unwrap();
        let mut handle = BufferedFile::new(descriptor, Mode::WriteOnly);
        handle.write(b"new").unwrap();
        handle.close().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_filesize_of_regular_file() {
        let mut file = tempfile::tempfile().expect("tempfile");
        file.write_all(&[7u8; 1234]).unwrap();
        let descriptor = FileDescriptor::new(file);
        assert_eq!(filesize(&descriptor), Some(1234));
    }

    #[test]
    fn test_release_reports_status_once() {
        let file = tempfile::tempfile().expect("tempfile");
        let mut descriptor = FileDescriptor::new(file);
        descriptor.release().unwrap();
        assert!(descriptor.release().is_err());
        assert!(descriptor.raw_write(b"x").is_err());
        assert_eq!(descriptor.size(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_has_no_size() {
        let (reader, _writer) = std::io::pipe().expect("pipe");
        let fd = std::os::fd::OwnedFd::from(reader);
        let descriptor = FileDescriptor::new(std::fs::File::from(fd));
        assert_eq!(descriptor.size(), None);
    }
}
