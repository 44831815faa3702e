use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use seqforge_formats::fasta;
use seqforge_formats::spsum::{list_organisms, CatalogEntry, CdsReport, OrganismSummary, BUILTIN_CATALOG};
use tracing::info;

use crate::Engine;

/// Organisms in the main catalog followed by those in the custom catalog.
pub fn organisms(engine: &Engine) -> Result<Vec<OrganismSummary>> {
    let mut all = match &engine.config.catalog.path {
        Some(path) => list_organisms(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open catalog {}", path.display()))?,
        ))?,
        None => list_organisms(BUILTIN_CATALOG.as_bytes())?,
    };

    let custom = &engine.config.catalog.custom_path;
    if custom.exists() {
        all.extend(list_organisms(BufReader::new(File::open(custom)?))?);
    }
    Ok(all)
}

/// Count codons over a CDS FASTA and append the table to `output`.
pub fn build_table(
    fasta_text: &str,
    taxid: &str,
    name: &str,
    output: &Path,
) -> Result<CdsReport> {
    let records = fasta::parse(fasta_text)?;
    let (entry, report) = CatalogEntry::from_cds_records(taxid, name, &records);
    entry
        .to_table()
        .with_context(|| format!("No usable codons for {taxid}"))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(output)
        .with_context(|| format!("Failed to open {}", output.display()))?;
    file.write_all(entry.serialize().as_bytes())?;

    info!(
        taxid,
        genes = report.genes_used,
        partial = report.partial.len(),
        "appended codon table to {}",
        output.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_custom_table_becomes_available() {
        let dir = tempfile::tempdir().unwrap();
        let custom_path = dir.path().join("custom_table.spsum");
        let mut config = EngineConfig::default();
        config.catalog.custom_path = custom_path.clone();
        let engine = Engine::new(config);

        assert!(engine.table("31337").is_err());
        let builtin = organisms(&engine).unwrap().len();

        let report = build_table(
            ">g1\nATGAAACTGTAA\n>g2\nATGAAGCTTTGA\n>bad\nATGA\n",
            "31337",
            "Examplea testii",
            &custom_path,
        )
        .unwrap();
        assert_eq!(report.genes_used, 2);
        assert_eq!(report.partial, vec!["bad".to_string()]);

        let table = engine.table("31337").unwrap();
        assert_eq!(table.organism_name, "Examplea testii");
        assert_eq!(organisms(&engine).unwrap().len(), builtin + 1);
    }

    #[test]
    fn test_build_table_rejects_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.spsum");
        assert!(build_table(">x\nNNNNNN\n", "1", "Nothing", &path).is_err());
        assert!(!path.exists());
    }
}
