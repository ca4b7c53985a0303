//! Purpose: Shared core library crate used by the `litedump` CLI and tests.
//! Exports: `core` (validation, log folding, catalog, export, errors).
//! Role: Internal library backing the binary; not yet a stable public SDK.
//! Invariants: Treat the crate API as internal until a dedicated library release.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
#![allow(clippy::result_large_err)]
pub mod core;

pub use crate::core::batch::{DirSummary, FileSummary, export_dir, export_file};
pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use crate::core::sniff::{is_sqlite_file, probe};
pub use crate::core::value::{ColumnValue, blob_to_display};
