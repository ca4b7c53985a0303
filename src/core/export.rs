//! Purpose: Stream one table's rows into a JSON Lines file.
//! Exports: `export_table`.
//! Role: Owns the scan -> record -> write path for a single table.
//! Invariants: Output is one JSON object per line, keys in column
//! declaration order, truncate-on-open.
//! Invariants: Rows are written as they are scanned; nothing is retained
//! beyond the current row.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use rusqlite::{Connection, Row};
use serde_json::{Map, Value};

use crate::core::catalog::{self, quote_ident};
use crate::core::error::{Error, ErrorKind};
use crate::core::paths;
use crate::core::value::ColumnValue;

/// Export all rows of `table` to `<file_output_dir>/<table>.jsonl`,
/// replacing any previous file. Returns the number of rows written.
pub fn export_table(
    conn: &Connection,
    file_output_dir: &Path,
    table: &str,
) -> Result<u64, Error> {
    let columns = catalog::table_columns(conn, table)
        .map_err(|err| err.with_table(table))?;

    let out_path = paths::table_output_path(file_output_dir, table);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to create output directory")
                .with_path(parent)
                .with_source(err)
        })?;
    }
    let file = File::create(&out_path).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to create table output file")
            .with_path(&out_path)
            .with_table(table)
            .with_source(err)
    })?;
    let mut writer = BufWriter::new(file);

    let mut stmt = conn
        .prepare(&format!("SELECT * FROM {}", quote_ident(table)))
        .map_err(|err| Error::from(err).with_table(table))?;
    let mut rows = stmt
        .query([])
        .map_err(|err| Error::from(err).with_table(table))?;

    let mut written = 0u64;
    loop {
        let row = match rows.next() {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(err) => return Err(Error::from(err).with_table(table)),
        };
        let record = row_record(row, &columns)
            .map_err(|err| Error::from(err).with_table(table))?;
        serde_json::to_writer(&mut writer, &record).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to serialize record")
                .with_path(&out_path)
                .with_table(table)
                .with_source(err)
        })?;
        writer.write_all(b"\n").map_err(write_error(&out_path, table))?;
        written += 1;
    }

    writer.flush().map_err(write_error(&out_path, table))?;
    tracing::debug!("wrote {written} rows to {}", out_path.display());
    Ok(written)
}

fn row_record(row: &Row<'_>, columns: &[String]) -> Result<Map<String, Value>, rusqlite::Error> {
    let mut record = Map::with_capacity(columns.len());
    for (index, column) in columns.iter().enumerate() {
        let value = ColumnValue::from(row.get_ref(index)?);
        record.insert(column.clone(), value.to_json());
    }
    Ok(record)
}

fn write_error<'a>(
    out_path: &'a Path,
    table: &'a str,
) -> impl Fn(std::io::Error) -> Error + 'a {
    move |err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write table output file")
            .with_path(out_path)
            .with_table(table)
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::export_table;
    use rusqlite::Connection;
    use serde_json::Value;
    use std::fs;

    fn fixture() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch(
            "CREATE TABLE mixed (id INTEGER, score REAL, name TEXT, data BLOB);
             INSERT INTO mixed VALUES (1, 0.5, 'alpha', x'00ff');
             INSERT INTO mixed VALUES (2, NULL, NULL, NULL);
             CREATE TABLE empty (a, b);",
        )
        .expect("schema");
        conn
    }

    #[test]
    fn writes_one_json_object_per_row() {
        let conn = fixture();
        let temp = tempfile::tempdir().expect("tempdir");

        let written = export_table(&conn, temp.path(), "mixed").expect("export");
        assert_eq!(written, 2);

        let text = fs::read_to_string(temp.path().join("mixed.jsonl")).expect("read");
        let lines: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[0]["score"], 0.5);
        assert_eq!(lines[0]["name"], "alpha");
        assert_eq!(lines[0]["data"], "\\x00\\xff");
        assert_eq!(lines[1]["score"], Value::Null);
    }

    #[test]
    fn record_keys_follow_declaration_order() {
        let conn = fixture();
        let temp = tempfile::tempdir().expect("tempdir");
        export_table(&conn, temp.path(), "mixed").expect("export");

        let text = fs::read_to_string(temp.path().join("mixed.jsonl")).expect("read");
        let first = text.lines().next().expect("line");
        let record: serde_json::Map<String, Value> =
            serde_json::from_str(first).expect("record");
        let keys: Vec<&String> = record.keys().collect();
        assert_eq!(keys, ["id", "score", "name", "data"]);
    }

    #[test]
    fn empty_table_produces_empty_file() {
        let conn = fixture();
        let temp = tempfile::tempdir().expect("tempdir");
        let written = export_table(&conn, temp.path(), "empty").expect("export");
        assert_eq!(written, 0);
        let text = fs::read_to_string(temp.path().join("empty.jsonl")).expect("read");
        assert!(text.is_empty());
    }

    #[test]
    fn rerun_overwrites_previous_output() {
        let conn = fixture();
        let temp = tempfile::tempdir().expect("tempdir");

        export_table(&conn, temp.path(), "mixed").expect("first");
        let first = fs::read_to_string(temp.path().join("mixed.jsonl")).expect("read");
        export_table(&conn, temp.path(), "mixed").expect("second");
        let second = fs::read_to_string(temp.path().join("mixed.jsonl")).expect("read");

        assert_eq!(first, second);
        assert_eq!(second.lines().count(), 2);
    }
}
