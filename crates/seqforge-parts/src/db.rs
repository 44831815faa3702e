use rusqlite::{params, Connection, OptionalExtension};
use seqforge_core::{Nucleotide, PartCatalog, PartDefinition};
use tracing::debug;

use crate::part::StoredPart;
use crate::seed_data::builtin_parts;
use crate::{PartsError, Result};

const PART_COLUMNS: &str = "id, part_type, prefix, suffix, info, strip_stop, is_builtin";

/// Create the parts table if it does not exist.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS parts (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            part_type   TEXT NOT NULL UNIQUE,
            prefix      TEXT NOT NULL,
            suffix      TEXT NOT NULL,
            info        TEXT,
            strip_stop  INTEGER NOT NULL DEFAULT 0,
            is_builtin  INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_parts_builtin ON parts(is_builtin);",
    )?;
    Ok(())
}

/// Seed built-in part types (idempotent via INSERT OR IGNORE).
/// Returns the number of newly inserted rows.
pub fn seed_builtins(conn: &Connection) -> Result<usize> {
    let mut count = 0usize;
    for part in builtin_parts() {
        count += conn.execute(
            "INSERT OR IGNORE INTO parts (part_type, prefix, suffix, info, strip_stop, is_builtin)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            params![
                part.part_type,
                part.prefix,
                part.suffix,
                part.info,
                part.strip_stop,
            ],
        )?;
    }
    debug!(inserted = count, "seeded built-in part types");
    Ok(count)
}

/// Open (or create) a parts library, ready for use.
pub fn open(path: &std::path::Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_db(&conn)?;
    seed_builtins(&conn)?;
    Ok(conn)
}

/// In-memory library holding only the built-ins.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_db(&conn)?;
    seed_builtins(&conn)?;
    Ok(conn)
}

/// Retrieve part types, optionally only built-ins or only custom ones.
pub fn get_parts(conn: &Connection, builtin: Option<bool>) -> Result<Vec<StoredPart>> {
    let mut parts = Vec::new();
    match builtin {
        Some(flag) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PART_COLUMNS} FROM parts WHERE is_builtin = ?1 ORDER BY id"
            ))?;
            for row in stmt.query_map(params![flag], row_to_part)? {
                parts.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!("SELECT {PART_COLUMNS} FROM parts ORDER BY id"))?;
            for row in stmt.query_map([], row_to_part)? {
                parts.push(row?);
            }
        }
    }
    Ok(parts)
}

/// Get a single part type by its code.
pub fn get_part(conn: &Connection, part_type: &str) -> Result<Option<StoredPart>> {
    let part = conn
        .query_row(
            &format!("SELECT {PART_COLUMNS} FROM parts WHERE part_type = ?1"),
            params![part_type],
            row_to_part,
        )
        .optional()?;
    Ok(part)
}

/// Insert a user-defined part type. Returns the new row ID.
///
/// Flanks must use the nucleotide alphabet; a code already in the library is
/// rejected by the UNIQUE constraint.
pub fn add_custom_part(conn: &Connection, definition: &PartDefinition) -> Result<i64> {
    if definition.part_type.trim().is_empty() {
        return Err(PartsError::InvalidPart("part type must not be empty".to_string()));
    }
    Nucleotide::new(format!("{}-prefix", definition.part_type), &definition.prefix)?;
    Nucleotide::new(format!("{}-suffix", definition.part_type), &definition.suffix)?;

    let part = StoredPart::custom(definition.clone());
    conn.execute(
        "INSERT INTO parts (part_type, prefix, suffix, info, strip_stop, is_builtin)
         VALUES (?1, ?2, ?3, ?4, ?5, 0)",
        params![
            part.part_type,
            part.prefix,
            part.suffix,
            part.info,
            part.strip_stop
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Delete a user-defined part type. Built-ins cannot be deleted.
/// Returns true if a row was deleted.
pub fn delete_custom_part(conn: &Connection, part_type: &str) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM parts WHERE part_type = ?1 AND is_builtin = 0",
        params![part_type],
    )?;
    Ok(changed > 0)
}

/// Search part types by code or description (case-insensitive LIKE).
pub fn search_parts(conn: &Connection, query: &str) -> Result<Vec<StoredPart>> {
    let pattern = format!("%{}%", query);
    let mut stmt = conn.prepare(&format!(
        "SELECT {PART_COLUMNS} FROM parts
         WHERE part_type LIKE ?1 OR info LIKE ?1 ORDER BY id"
    ))?;
    let mut results = Vec::new();
    for row in stmt.query_map(params![pattern], row_to_part)? {
        results.push(row?);
    }
    Ok(results)
}

/// Everything in the library as a catalog for part wrapping.
pub fn load_catalog(conn: &Connection) -> Result<PartCatalog> {
    let parts = get_parts(conn, None)?;
    Ok(PartCatalog::new(parts.iter().map(StoredPart::definition)))
}

/// Pretty JSON dump of the custom part types.
pub fn export_custom_parts(conn: &Connection) -> Result<String> {
    let parts = get_parts(conn, Some(false))?;
    Ok(serde_json::to_string_pretty(&parts)?)
}

fn row_to_part(row: &rusqlite::Row) -> rusqlite::Result<StoredPart> {
    Ok(StoredPart {
        id: row.get(0)?,
        part_type: row.get(1)?,
        prefix: row.get(2)?,
        suffix: row.get(3)?,
        info: row.get(4)?,
        strip_stop: row.get::<_, i32>(5)? != 0,
        is_builtin: row.get::<_, i32>(6)? != 0,
    })
}
