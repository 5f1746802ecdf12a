//! Unix-specific descriptor operations.
//!
//! Standard streams are duplicated so that releasing the descriptor never closes
//! the process-wide stdin/stdout. Releasing goes through `libc::close` directly,
//! because dropping a `File` discards the close status.

use std::{
    fs::{File, OpenOptions},
    os::fd::{AsFd, IntoRawFd},
};

use crate::Mode;

/// Options for opening a path in `mode`. Write mode creates the file with
/// permissions 0666 (before umask) and truncates it.
pub fn open_options(mode: Mode) -> OpenOptions {
    let mut options = OpenOptions::new();
    match mode {
        Mode::ReadOnly => {
            options.read(true);
        }
        Mode::WriteOnly => {
            options.write(true).create(true).truncate(true);
            #[cfg(not(target_os = "wasi"))]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o666);
            }
        }
    }
    options
}

pub fn dup_stdin() -> std::io::Result<File> {
    Ok(File::from(std::io::stdin().as_fd().try_clone_to_owned()?))
}

pub fn dup_stdout() -> std::io::Result<File> {
    Ok(File::from(std::io::stdout().as_fd().try_clone_to_owned()?))
}

/// Closes `file` and reports the status of the underlying `close(2)`.
pub fn close(file: File) -> std::io::Result<()> {
    let fd = file.into_raw_fd();
    // SAFETY: `fd` was just detached from `file`, so it is open and owned here.
    let r = unsafe { libc::close(fd) };
    if r == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}
