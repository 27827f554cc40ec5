//! File helpers for round logs.
//!
//! Paths ending in `.zst` are transparently compressed on write and
//! decompressed on read with Zstandard; everything else is plain binary.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Ensure parent directory exists for given path, creating if needed.
pub fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
        }
    }
    Ok(())
}

fn is_zstd(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "zst")
}

/// Destination for a round log; call [`LogSink::close`] to finish the
/// compressed frame and surface any flush error.
pub enum LogSink {
    Plain(BufWriter<File>),
    Zstd(zstd::stream::write::Encoder<'static, BufWriter<File>>),
}

impl LogSink {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        ensure_parent_dir(path).map_err(std::io::Error::other)?;
        let file = BufWriter::new(File::create(path)?);
        if is_zstd(path) {
            Ok(LogSink::Zstd(zstd::stream::write::Encoder::new(file, 0)?))
        } else {
            Ok(LogSink::Plain(file))
        }
    }

    pub fn close(self) -> std::io::Result<()> {
        match self {
            LogSink::Plain(mut w) => w.flush(),
            LogSink::Zstd(enc) => enc.finish()?.flush(),
        }
    }
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            LogSink::Plain(w) => w.write(buf),
            LogSink::Zstd(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            LogSink::Plain(w) => w.flush(),
            LogSink::Zstd(w) => w.flush(),
        }
    }
}

/// Opens a round log for reading, decompressing `.zst` files on the fly.
pub fn open_log_source(path: &Path) -> std::io::Result<Box<dyn Read>> {
    let file = File::open(path)?;
    if is_zstd(path) {
        Ok(Box::new(zstd::stream::read::Decoder::new(file)?))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
