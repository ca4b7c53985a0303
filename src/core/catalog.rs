//! Purpose: Read table and column metadata from the SQLite catalog.
//! Exports: `user_tables`, `table_columns`, `quote_ident`.
//! Role: Single source for catalog queries and identifier quoting.
//! Invariants: Only user tables are listed; views, indexes, and
//! `sqlite_%` internal tables are excluded.
//! Invariants: Orders follow the engine's catalog/declaration order.

use rusqlite::Connection;

use crate::core::error::Error;

pub fn user_tables(conn: &Connection) -> Result<Vec<String>, Error> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Column names for one table, in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, Error> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Double-quote an identifier for interpolation into catalog queries.
/// Table names come from `sqlite_master`, not the user, but may still
/// contain quotes or spaces.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
