use anyhow::{bail, Result};
use rusqlite::Connection;
use seqforge_core::PartDefinition;
use seqforge_parts::db;

use crate::dto::PartDto;
use crate::Engine;

fn library(engine: &Engine) -> Result<Connection> {
    Ok(match &engine.config.parts.database {
        Some(path) => db::open(path)?,
        None => db::open_in_memory()?,
    })
}

fn writable_library(engine: &Engine) -> Result<Connection> {
    if engine.config.parts.database.is_none() {
        bail!("No parts database configured; set [parts] database in seqforge.toml");
    }
    library(engine)
}

pub fn list(engine: &Engine) -> Result<Vec<PartDto>> {
    let conn = library(engine)?;
    Ok(db::get_parts(&conn, None)?.iter().map(PartDto::from).collect())
}

pub fn search(engine: &Engine, query: &str) -> Result<Vec<PartDto>> {
    let conn = library(engine)?;
    Ok(db::search_parts(&conn, query)?
        .iter()
        .map(PartDto::from)
        .collect())
}

pub fn add(engine: &Engine, definition: &PartDefinition) -> Result<i64> {
    let conn = writable_library(engine)?;
    Ok(db::add_custom_part(&conn, definition)?)
}

/// Returns false when the type is unknown or built in.
pub fn remove(engine: &Engine, part_type: &str) -> Result<bool> {
    let conn = writable_library(engine)?;
    Ok(db::delete_custom_part(&conn, part_type)?)
}

pub fn export(engine: &Engine) -> Result<String> {
    let conn = library(engine)?;
    Ok(db::export_custom_parts(&conn)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_builtins_without_database() {
        let engine = Engine::new(EngineConfig::default());
        let parts = list(&engine).unwrap();
        assert_eq!(parts.len(), 17);
        assert!(parts.iter().all(|p| p.builtin));

        let definition = PartDefinition::new("9", "AA", "TT", "", false);
        assert!(add(&engine, &definition).is_err());
    }

    #[test]
    fn test_custom_part_used_for_wrapping() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EngineConfig::default();
        config.parts.database = Some(dir.path().join("parts.db"));
        let engine = Engine::new(config);

        add(&engine, &PartDefinition::new("9", "GGAG", "CGCT", "Spacer", false)).unwrap();
        assert_eq!(search(&engine, "spacer").unwrap()[0].part_type, "9");
        assert!(engine.part_catalog().unwrap().get("9").is_some());

        assert!(remove(&engine, "9").unwrap());
        assert!(!remove(&engine, "3t").unwrap());
        assert_eq!(export(&engine).unwrap(), "[]");
    }
}
