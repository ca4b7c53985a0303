//! Purpose: Shared path policy for outputs and database sibling files.
//! Exports: `file_output_dir`, `table_output_path`, `wal_path`, `backup_path`.
//! Role: Keep CLI and core path semantics aligned from one source.
//! Invariants: Output always nests under the output directory, even for
//! absolute input paths.
//! Invariants: Sibling names follow SQLite conventions (`<db>-wal`) and
//! the exporter's `<db>.backup`.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Per-file output directory: `{output_dir}/{input_path}` with the input's
/// root/prefix components stripped so the result cannot escape `output_dir`.
pub fn file_output_dir(output_dir: &Path, db_path: &Path) -> PathBuf {
    let mut out = output_dir.to_path_buf();
    for component in db_path.components() {
        match component {
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
            Component::ParentDir => {}
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

pub fn table_output_path(file_output_dir: &Path, table: &str) -> PathBuf {
    file_output_dir.join(format!("{table}.jsonl"))
}

/// SQLite names the write-ahead log by appending `-wal` to the full
/// database file name, extension included.
pub fn wal_path(db_path: &Path) -> PathBuf {
    sibling_with_suffix(db_path, "-wal")
}

pub fn backup_path(db_path: &Path) -> PathBuf {
    sibling_with_suffix(db_path, ".backup")
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
