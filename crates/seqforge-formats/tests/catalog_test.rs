use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use seqforge_core::codon::CATALOG_CODONS;
use seqforge_core::SeqError;
use seqforge_formats::fasta;
use seqforge_formats::spsum::{list_organisms, load_codon_table, open_catalog, CatalogEntry};
use seqforge_formats::ParseError;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_every_fixture_table_is_normalized() {
    let reader = open_catalog(fixture("codon_usage.spsum")).expect("Failed to open catalog");

    let mut seen = 0;
    for entry in reader {
        let table = entry.expect("Failed to parse entry").to_table().unwrap();
        seen += 1;

        for aa in table.amino_acids() {
            let sum: f64 = table.synonyms(aa).unwrap().iter().map(|c| c.fraction).sum();
            assert!((sum - 1.0).abs() < 1e-9, "{} {aa}: {sum}", table.organism_id);
        }
        let frequencies: f64 = table.rows().map(|c| c.frequency).sum();
        assert!((frequencies - 1000.0).abs() < 1e-6);
        assert_eq!(table.rows().count(), CATALOG_CODONS.len());
    }
    assert_eq!(seen, 2);
}

#[test]
fn test_load_by_alias_from_file() {
    let file = std::fs::File::open(fixture("codon_usage.spsum")).unwrap();
    let table = load_codon_table(std::io::BufReader::new(file), "ecoli").unwrap();
    assert_eq!(table.organism_id, "83333");
    assert_eq!(table.organism_name, "Escherichia coli K12");
    assert_eq!(table.get("CTG").unwrap().amino_acid, 'L');
}

#[test]
fn test_unknown_organism() {
    let file = std::fs::File::open(fixture("codon_usage.spsum")).unwrap();
    let err = load_codon_table(std::io::BufReader::new(file), "9606").unwrap_err();
    assert!(matches!(err, ParseError::Sequence(SeqError::OrganismNotFound(_))));
}

#[test]
fn test_custom_table_appended_and_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom_table.spsum");

    let records = fasta::parse(">g1\nATGGCTGCAAAATAA\n>g2\nATGCTGCTGTGA\n").unwrap();
    let (entry, report) = CatalogEntry::from_cds_records("424242", "Test bug", &records);
    assert_eq!(report.genes_used, 2);

    for _ in 0..2 {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();
        file.write_all(entry.serialize().as_bytes()).unwrap();
    }

    let organisms = list_organisms(std::io::BufReader::new(std::fs::File::open(&path).unwrap())).unwrap();
    assert_eq!(organisms.len(), 2);
    assert_eq!(organisms[0].name, "Test bug");

    let file = std::fs::File::open(&path).unwrap();
    let table = load_codon_table(std::io::BufReader::new(file), "424242").unwrap();
    assert_eq!(table.get("CTG").unwrap().count, 2);
    assert!((table.get("CTG").unwrap().fraction - 1.0).abs() < 1e-12);
}
