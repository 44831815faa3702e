use seqforge_core::{Nucleotide, Protein, SequenceEntity};
use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Longest identifier kept from a header line.
pub const MAX_ID_LENGTH: usize = 70;

pub const LINE_WIDTH: usize = 80;

/// A raw `(id, body)` pair before alphabet validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastaRecord {
    pub id: String,
    pub sequence: String,
}

impl SequenceEntity for FastaRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn sequence(&self) -> &str {
        &self.sequence
    }
}

/// Parse a FASTA format string into one or more records
pub fn parse(input: &str) -> Result<Vec<FastaRecord>, ParseError> {
    let mut records = Vec::new();
    let mut current_id: Option<String> = None;
    let mut current_seq = String::new();

    for line in input.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('>') {
            if let Some(id) = current_id.take() {
                if !current_seq.is_empty() {
                    records.push(FastaRecord {
                        id,
                        sequence: std::mem::take(&mut current_seq),
                    });
                }
            }
            current_id = Some(header.trim().chars().take(MAX_ID_LENGTH).collect());
            current_seq.clear();
        } else if current_id.is_none() {
            return Err(ParseError::InvalidFormat(
                "Missing FASTA header \">Sequence name\"".to_string(),
            ));
        } else {
            current_seq.extend(
                trimmed
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| c.to_ascii_uppercase()),
            );
        }
    }

    if let Some(id) = current_id {
        if !current_seq.is_empty() {
            records.push(FastaRecord {
                id,
                sequence: current_seq,
            });
        }
    }

    if records.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA input".to_string(),
        ));
    }

    Ok(records)
}

pub fn parse_nucleotides(input: &str) -> Result<Vec<Nucleotide>, ParseError> {
    parse(input)?
        .into_iter()
        .map(|r| Nucleotide::new(r.id, r.sequence).map_err(ParseError::from))
        .collect()
}

pub fn parse_proteins(input: &str) -> Result<Vec<Protein>, ParseError> {
    parse(input)?
        .into_iter()
        .map(|r| Protein::new(r.id, r.sequence).map_err(ParseError::from))
        .collect()
}

/// Serialize sequences to FASTA format with 80-character lines
pub fn serialize<'a, E, I>(entities: I) -> String
where
    E: SequenceEntity + ?Sized + 'a,
    I: IntoIterator<Item = &'a E>,
{
    let mut out = String::new();

    for entity in entities {
        out.push('>');
        out.push_str(entity.id());
        out.push('\n');

        for chunk in entity.sequence().as_bytes().chunks(LINE_WIDTH) {
            out.push_str(&String::from_utf8_lossy(chunk));
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use seqforge_core::SequenceRecord;

    #[test]
    fn test_parse_single_sequence() {
        let input = ">seq1 A test sequence\natcgatcg\nGGCC TTAA\n";
        let records = parse(input).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "seq1 A test sequence");
        assert_eq!(records[0].sequence, "ATCGATCGGGCCTTAA");
    }

    #[test]
    fn test_parse_multi_sequence() {
        let input = ">seq1\nATCG\n;comment\n>seq2\nGGCC\n\n>seq3\nTTAA\n";
        let records = parse(input).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].sequence, "GGCC");
        assert_eq!(records[2].id, "seq3");
    }

    #[test]
    fn test_header_truncated() {
        let header = "x".repeat(100);
        let records = parse(&format!(">{header}\nACGT\n")).unwrap();
        assert_eq!(records[0].id.len(), MAX_ID_LENGTH);
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            parse("ATGC\n>seq\nAAA\n"),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(parse("").is_err());
        assert!(parse(">empty\n").is_err());
    }

    #[test]
    fn test_parse_proteins_keeps_symbols() {
        let proteins = parse_proteins(">p\nMK?L*\n").unwrap();
        assert_eq!(proteins[0].sequence(), "MK?L*");
    }

    #[test]
    fn test_serialize_wraps_lines() {
        let seq = Nucleotide::new("long", "A".repeat(170)).unwrap();
        let text = serialize([&seq]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], ">long");
        assert_eq!(lines[1].len(), 80);
        assert_eq!(lines[3].len(), 10);
    }

    #[test]
    fn test_serialize_mixed_records() {
        let records = vec![
            SequenceRecord::Nucleotide(Nucleotide::new("n", "ATG").unwrap()),
            SequenceRecord::Protein(Protein::new("p", "M").unwrap()),
        ];
        let text = serialize(records.iter().map(SequenceRecord::as_entity));
        assert_eq!(text, ">n\nATG\n>p\nM\n");
    }

    #[test]
    fn test_roundtrip() {
        let seqs = parse_nucleotides(">test\nATCGATCGATCGATCG\n").unwrap();
        let reparsed = parse_nucleotides(&serialize(&seqs)).unwrap();
        assert_eq!(seqs, reparsed);
    }
}
