//! Purpose: Decide whether a candidate file is an SQLite database.
//! Exports: `SQLITE_MAGIC`, `MIN_DB_FILE_LEN`, `probe`, `is_sqlite_file`.
//! Role: Shared gate for single-file and directory-mode input selection.
//! Invariants: `probe` reads at most the 16-byte header; it never opens
//! the file through SQLite.
//! Invariants: `is_sqlite_file` never propagates an error; it logs and
//! returns a verdict.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::core::error::{Error, ErrorKind, io_error_kind};

/// First 16 bytes of every SQLite 3 database file.
pub const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// An SQLite database is never smaller than its 100-byte header page.
pub const MIN_DB_FILE_LEN: u64 = 100;

pub fn probe(path: &Path) -> Result<(), Error> {
    let meta = fs::metadata(path).map_err(|err| {
        Error::new(io_error_kind(&err))
            .with_message("failed to stat candidate file")
            .with_path(path)
            .with_source(err)
    })?;
    if !meta.is_file() {
        return Err(Error::new(ErrorKind::NotSqlite)
            .with_message("not a regular file")
            .with_path(path));
    }
    if meta.len() < MIN_DB_FILE_LEN {
        return Err(Error::new(ErrorKind::NotSqlite)
            .with_message(format!(
                "file is too small to be an SQLite database ({} bytes)",
                meta.len()
            ))
            .with_path(path));
    }

    let mut header = [0u8; SQLITE_MAGIC.len()];
    let mut file = fs::File::open(path).map_err(|err| {
        Error::new(io_error_kind(&err))
            .with_message("failed to open candidate file")
            .with_path(path)
            .with_source(err)
    })?;
    file.read_exact(&mut header).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read file header")
            .with_path(path)
            .with_source(err)
    })?;

    if &header != SQLITE_MAGIC {
        return Err(Error::new(ErrorKind::NotSqlite)
            .with_message(format!(
                "wrong header magic: {}",
                header.escape_ascii()
            ))
            .with_path(path));
    }

    Ok(())
}

/// Boolean-verdict wrapper around [`probe`]. The diagnostic is logged
/// here so callers can treat a negative verdict as "skip this input".
pub fn is_sqlite_file(path: &Path) -> bool {
    match probe(path) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!("{err}");
            false
        }
    }
}
