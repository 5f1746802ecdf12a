//! Windows-specific descriptor operations.
//!
//! Standard streams are duplicated so that releasing the descriptor never closes
//! the process-wide stdin/stdout.

use std::{
    fs::{File, OpenOptions},
    os::windows::io::AsHandle,
};

use crate::Mode;

/// Options for opening a path in `mode`. Write mode creates and truncates the file.
pub fn open_options(mode: Mode) -> OpenOptions {
    let mut options = OpenOptions::new();
    match mode {
        Mode::ReadOnly => {
            options.read(true);
        }
        Mode::WriteOnly => {
            options.write(true).create(true).truncate(true);
        }
    }
    options
}

pub fn dup_stdin() -> std::io::Result<File> {
    Ok(File::from(std::io::stdin().as_handle().try_clone_to_owned()?))
}

pub fn dup_stdout() -> std::io::Result<File> {
    Ok(File::from(std::io::stdout().as_handle().try_clone_to_owned()?))
}

/// Closes `file`. `CloseHandle` failures are not observable through `File`, so
/// this always succeeds once the handle is dropped.
pub fn close(file: File) -> std::io::Result<()> {
    drop(file);
    Ok(())
}
