//! Purpose: Fold a pending write-ahead log into the main database file.
//! Exports: `BackupGuard`, `fold_wal`.
//! Role: The only step that rewrites a source database in place.
//! Invariants: A backup exists for the whole checkpoint/compaction window;
//! every exit path either commits (backup removed) or restores.
//! Invariants: No retry; a failed fold leaves the source file as it was.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::core::error::{Error, ErrorKind, io_error_kind};
use crate::core::paths;

/// Scoped backup of a database file. Dropping the guard without calling
/// [`BackupGuard::commit`] restores the original from the backup copy and
/// removes the copy.
#[derive(Debug)]
pub struct BackupGuard {
    original: PathBuf,
    backup: PathBuf,
    committed: bool,
}

impl BackupGuard {
    pub fn acquire(original: &Path) -> Result<Self, Error> {
        let backup = paths::backup_path(original);
        fs::copy(original, &backup).map_err(|err| {
            Error::new(io_error_kind(&err))
                .with_message("failed to back up database before folding the log")
                .with_path(original)
                .with_source(err)
        })?;
        tracing::debug!("backed up {} to {}", original.display(), backup.display());
        Ok(Self {
            original: original.to_path_buf(),
            backup,
            committed: false,
        })
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    /// Accept the folded state: drop the backup copy.
    pub fn commit(mut self) -> Result<(), Error> {
        self.committed = true;
        fs::remove_file(&self.backup).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to remove backup after folding the log")
                .with_path(&self.backup)
                .with_source(err)
        })
    }
}

impl Drop for BackupGuard {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(err) = fs::copy(&self.backup, &self.original) {
            // Restore failed; keep the backup so nothing is lost.
            tracing::error!(
                "failed to restore {} from {}: {err}",
                self.original.display(),
                self.backup.display()
            );
            return;
        }
        tracing::warn!("restored {} from backup", self.original.display());
        if let Err(err) = fs::remove_file(&self.backup) {
            tracing::warn!("failed to remove {}: {err}", self.backup.display());
        }
    }
}

/// Checkpoint and compact `db_path` if a `-wal` sibling exists. The
/// backup scaffolding runs either way, so a crash mid-fold can always be
/// rolled back by hand from the `.backup` copy.
pub fn fold_wal(conn: &Connection, db_path: &Path) -> Result<(), Error> {
    let wal = paths::wal_path(db_path);
    let guard = BackupGuard::acquire(db_path)?;

    if wal.exists() {
        checkpoint_and_compact(conn).map_err(|err| err.with_path(db_path))?;
        tracing::info!("folded write-ahead log into {}", db_path.display());
    } else {
        tracing::info!("no write-ahead log next to {}", db_path.display());
    }

    guard.commit()
}

fn checkpoint_and_compact(conn: &Connection) -> Result<(), Error> {
    // wal_checkpoint(FULL) yields one (busy, wal_pages, checkpointed) row.
    let busy: i64 = conn.query_row("PRAGMA wal_checkpoint(FULL)", [], |row| row.get(0))?;
    if busy != 0 {
        return Err(Error::new(ErrorKind::Db)
            .with_message("wal checkpoint could not complete (database busy)"));
    }
    conn.execute("VACUUM", [])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{BackupGuard, fold_wal};
    use crate::core::paths;
    use rusqlite::Connection;
    use std::fs;
    use std::path::Path;

    fn create_db(path: &Path) -> Connection {
        let conn = Connection::open(path).expect("open");
        conn.execute_batch(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, body TEXT);
             INSERT INTO t (body) VALUES ('one'), ('two');",
        )
        .expect("schema");
        conn
    }

    #[test]
    fn drop_without_commit_restores_original_bytes() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("app.db");
        fs::write(&path, b"original contents").expect("write");

        {
            let guard = BackupGuard::acquire(&path).expect("acquire");
            fs::write(&path, b"clobbered").expect("write");
            assert!(guard.backup_path().exists());
        }

        assert_eq!(fs::read(&path).expect("read"), b"original contents");
        assert!(!paths::backup_path(&path).exists());
    }

    #[test]
    fn commit_keeps_new_bytes_and_removes_backup() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("app.db");
        fs::write(&path, b"before").expect("write");

        let guard = BackupGuard::acquire(&path).expect("acquire");
        fs::write(&path, b"after").expect("write");
        guard.commit().expect("commit");

        assert_eq!(fs::read(&path).expect("read"), b"after");
        assert!(!paths::backup_path(&path).exists());
    }

    #[test]
    fn fold_without_wal_leaves_file_unchanged() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("app.db");
        let conn = create_db(&path);
        let before = fs::read(&path).expect("read");

        fold_wal(&conn, &path).expect("fold");

        assert_eq!(fs::read(&path).expect("read"), before);
        assert!(!paths::backup_path(&path).exists());
        assert!(!paths::wal_path(&path).exists());
    }

    #[test]
    fn fold_with_wal_checkpoints_and_cleans_up() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("app.db");
        let conn = create_db(&path);
        conn.pragma_update(None, "journal_mode", "wal")
            .expect("wal mode");
        conn.execute("INSERT INTO t (body) VALUES ('three')", [])
            .expect("insert");
        assert!(paths::wal_path(&path).exists());

        fold_wal(&conn, &path).expect("fold");

        assert!(!paths::backup_path(&path).exists());
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 3);
    }
}
