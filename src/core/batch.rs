//! Purpose: Drive validation, log folding, and per-table export for one
//! file or a directory of files.
//! Exports: `export_file`, `export_dir`, `FileSummary`, `DirSummary`.
//! Role: Decides which failures stop a file and which are skipped over.
//! Invariants: A table failure never aborts sibling tables; a file
//! failure never aborts sibling files.
//! Invariants: Exactly one connection per source file, open for the
//! duration of that file's export.

use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::core::error::{Error, ErrorKind};
use crate::core::{catalog, export, paths, sniff, wal};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FileSummary {
    pub tables: usize,
    pub rows: u64,
    pub failed_tables: usize,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DirSummary {
    pub files: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Export every table of one database file. With `already_validated`
/// the header probe is skipped (directory mode has already run it).
pub fn export_file(
    db_path: &Path,
    output_dir: &Path,
    already_validated: bool,
) -> Result<FileSummary, Error> {
    tracing::info!("processing {}", db_path.display());
    if !already_validated {
        sniff::probe(db_path)?;
    }

    let file_output_dir = paths::file_output_dir(output_dir, db_path);
    fs::create_dir_all(&file_output_dir).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to create per-file output directory")
            .with_path(&file_output_dir)
            .with_source(err)
    })?;

    // One connection for the whole file; closed on drop in every path,
    // with close errors swallowed by the drop.
    let conn = Connection::open(db_path).map_err(|err| {
        Error::new(ErrorKind::Db)
            .with_message("failed to open database")
            .with_path(db_path)
            .with_source(err)
    })?;

    if let Err(err) = wal::fold_wal(&conn, db_path) {
        tracing::error!("log fold failed, exporting current state: {err}");
    }

    let tables = catalog::user_tables(&conn).map_err(|err| err.with_path(db_path))?;

    let mut summary = FileSummary::default();
    for table in &tables {
        match export::export_table(&conn, &file_output_dir, table) {
            Ok(rows) => {
                summary.tables += 1;
                summary.rows += rows;
            }
            Err(err) => {
                summary.failed_tables += 1;
                tracing::error!("table export failed: {err}");
            }
        }
    }

    tracing::info!(
        "exported {} of {} tables ({} rows) from {}",
        summary.tables,
        tables.len(),
        summary.rows,
        db_path.display()
    );
    Ok(summary)
}

/// Export every SQLite file among the immediate entries of `dir`
/// (non-recursive). Entries failing the header probe are skipped with
/// the probe's own diagnostic; a failing file does not stop the batch.
pub fn export_dir(dir: &Path, output_dir: &Path) -> Result<DirSummary, Error> {
    let entries = fs::read_dir(dir).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read input directory")
            .with_path(dir)
            .with_source(err)
    })?;

    let mut summary = DirSummary::default();
    for entry in entries.flatten() {
        let path = entry.path();
        if !sniff::is_sqlite_file(&path) {
            summary.skipped += 1;
            continue;
        }
        match export_file(&path, output_dir, true) {
            Ok(_) => summary.files += 1,
            Err(err) => {
                summary.failed += 1;
                tracing::error!("file export failed: {err}");
            }
        }
    }
    Ok(summary)
}
