//! Reverse command implementation

use anyhow::{Context, Result};

use cachefile::{BufferedFile, BufferedStream, CacheOptions, Descriptor, Mode, fs};

use crate::utils;

/// Run the reverse command
pub fn run(input: Option<String>, output: Option<String>) -> Result<()> {
    let options = CacheOptions::default();
    let mut reader = fs::open_check(utils::as_path(&input), Mode::ReadOnly, options);
    let mut writer = fs::open_check(utils::as_path(&output), Mode::WriteOnly, options);

    let size = reverse(&mut reader, &mut writer)?;

    writer.close().with_context(|| "Failed to close output")?;
    reader.close().with_context(|| "Failed to close input")?;
    log::info!("reversed {}", utils::format_size(size));
    Ok(())
}

/// Writes the bytes of `reader` to `writer` last to first, one seek and one
/// single-byte read per byte. Returns the number of bytes written.
pub fn reverse<R: Descriptor, W: Descriptor>(
    reader: &mut BufferedFile<R>,
    writer: &mut BufferedFile<W>,
) -> Result<u64> {
    let size = reader
        .size()
        .context("Input has no well-defined size (not a regular file)")?;

    for pos in (0..size).rev() {
        reader
            .seek(pos)
            .with_context(|| format!("Failed to seek input to {pos}"))?;
        let byte = reader
            .read_byte()
            .with_context(|| format!("Failed to read input at {pos}"))?
            .with_context(|| format!("Input ended before offset {pos}"))?;
        writer
            .write_byte(byte)
            .with_context(|| "Failed to write output")?;
    }
    Ok(size)
}
