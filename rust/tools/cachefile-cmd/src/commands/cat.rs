//! Cat command implementation

use anyhow::{Context, Result};
use std::time::Instant;

use cachefile::{BufferedFile, CacheOptions, Descriptor, Mode, fs};

use crate::utils;

/// Run the cat command
pub fn run(input: Option<String>, output: Option<String>, block_size: usize) -> Result<()> {
    let options = CacheOptions::with_block_size(block_size)
        .with_context(|| format!("Invalid block size: {block_size}"))?;

    let mut reader = fs::open_check(utils::as_path(&input), Mode::ReadOnly, options);
    let mut writer = fs::open_check(utils::as_path(&output), Mode::WriteOnly, options);

    let start_time = Instant::now();
    let copied = copy(&mut reader, &mut writer, block_size)?;

    writer.close().with_context(|| "Failed to close output")?;
    reader.close().with_context(|| "Failed to close input")?;

    log::info!(
        "copied {} in {:.3} seconds",
        utils::format_size(copied),
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Copies everything `reader` yields into `writer`, `chunk` bytes at a time.
/// Returns the number of bytes copied.
pub fn copy<R: Descriptor, W: Descriptor>(
    reader: &mut BufferedFile<R>,
    writer: &mut BufferedFile<W>,
    chunk: usize,
) -> Result<u64> {
    let mut buf = vec![0u8; chunk.max(1)];
    let mut total = 0u64;
    loop {
        let n = reader
            .read(&mut buf)
            .with_context(|| format!("Failed to read input at offset {total}"))?;
        if n == 0 {
            return Ok(total);
        }
        write_all(writer, &buf[..n])
            .with_context(|| format!("Failed to write output at offset {total}"))?;
        total += n as u64;
    }
}

/// Writes all of `buf`, retrying after short counts.
pub fn write_all<W: Descriptor>(writer: &mut BufferedFile<W>, mut buf: &[u8]) -> Result<()> {
    while !buf.is_empty() {
        let n = writer.write(buf)?;
        if n == 0 {
            anyhow::bail!("output accepted no bytes");
        }
        buf = &buf[n..];
    }
    Ok(())
}
