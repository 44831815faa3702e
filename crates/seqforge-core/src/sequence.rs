use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::codon::START_CODON;
use crate::error::{Result, SeqError};

pub const NUCLEOTIDE_ALPHABET: &str = "ACGTNUSW";
pub const PROTEIN_ALPHABET: &str = "GALMFWKQESPVICYHRNDTX?*";

/// Identifier marker that forces translation of non-CDS input.
pub const FORCED_MARKER: &str = "FORCED";

static NUCLEOTIDE_FORBIDDEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^ACGTNUSW]").expect("nucleotide alphabet regex"));
static PROTEIN_FORBIDDEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^GALMFWKQESPVICYHRNDTX?*]").expect("protein alphabet regex"));

fn validate(id: &str, sequence: &str, forbidden: &Regex, allowed: &'static str) -> Result<()> {
    match forbidden.find(sequence) {
        Some(m) => Err(SeqError::InvalidSequence {
            id: id.to_string(),
            found: m.as_str().chars().next().unwrap_or('?'),
            allowed,
        }),
        None => Ok(()),
    }
}

/// Behaviour shared by nucleotide and protein sequences.
pub trait SequenceEntity {
    fn id(&self) -> &str;
    fn sequence(&self) -> &str;

    fn len(&self) -> usize {
        self.sequence().len()
    }

    fn is_empty(&self) -> bool {
        self.sequence().is_empty()
    }

    /// Single-record FASTA text.
    fn fasta(&self) -> String {
        format!(">{}\n{}\n", self.id(), self.sequence())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nucleotide {
    id: String,
    sequence: String,
}

impl Nucleotide {
    pub fn new(id: impl Into<String>, sequence: impl AsRef<str>) -> Result<Self> {
        let id = id.into();
        let sequence = sequence.as_ref().to_ascii_uppercase();
        validate(&id, &sequence, &NUCLEOTIDE_FORBIDDEN, NUCLEOTIDE_ALPHABET)?;
        Ok(Self { id, sequence })
    }

    /// New entity with the same identifier and a replaced body.
    pub fn with_sequence(&self, sequence: impl AsRef<str>) -> Result<Self> {
        Self::new(self.id.clone(), sequence)
    }

    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence: self.sequence.clone(),
        }
    }

    /// Starts with ATG and consists of whole codons.
    pub fn is_basic_cds(&self) -> bool {
        self.sequence.starts_with(START_CODON) && self.sequence.len() % 3 == 0
    }

    pub fn is_forced(&self) -> bool {
        self.id.contains(FORCED_MARKER)
    }

    /// Consecutive in-frame chunks of three; the last one may be shorter.
    pub fn triplets(&self) -> Vec<&str> {
        self.sequence
            .as_bytes()
            .chunks(3)
            .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
            .collect()
    }
}

impl SequenceEntity for Nucleotide {
    fn id(&self) -> &str {
        &self.id
    }

    fn sequence(&self) -> &str {
        &self.sequence
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protein {
    id: String,
    sequence: String,
}

impl Protein {
    pub fn new(id: impl Into<String>, sequence: impl AsRef<str>) -> Result<Self> {
        let id = id.into();
        let sequence = sequence.as_ref().to_ascii_uppercase();
        validate(&id, &sequence, &PROTEIN_FORBIDDEN, PROTEIN_ALPHABET)?;
        Ok(Self { id, sequence })
    }
}

impl SequenceEntity for Protein {
    fn id(&self) -> &str {
        &self.id
    }

    fn sequence(&self) -> &str {
        &self.sequence
    }
}

/// Either kind of sequence, for operations that may hand back their input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SequenceRecord {
    Nucleotide(Nucleotide),
    Protein(Protein),
}

impl SequenceRecord {
    pub fn as_entity(&self) -> &dyn SequenceEntity {
        match self {
            SequenceRecord::Nucleotide(n) => n,
            SequenceRecord::Protein(p) => p,
        }
    }

    pub fn into_protein(self) -> Option<Protein> {
        match self {
            SequenceRecord::Protein(p) => Some(p),
            SequenceRecord::Nucleotide(_) => None,
        }
    }

    pub fn into_nucleotide(self) -> Option<Nucleotide> {
        match self {
            SequenceRecord::Nucleotide(n) => Some(n),
            SequenceRecord::Protein(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_nucleotide() {
        let seq = Nucleotide::new("test", "atgAAAtga").unwrap();
        assert_eq!(seq.id(), "test");
        assert_eq!(seq.sequence(), "ATGAAATGA");
        assert_eq!(seq.len(), 9);
        assert!(seq.is_basic_cds());
    }

    #[test]
    fn test_invalid_nucleotide() {
        let err = Nucleotide::new("bad", "ATGXAA").unwrap_err();
        match err {
            SeqError::InvalidSequence { id, found, allowed } => {
                assert_eq!(id, "bad");
                assert_eq!(found, 'X');
                assert_eq!(allowed, NUCLEOTIDE_ALPHABET);
            }
            other => panic!("unexpected error {other:?}"),
        }

        let message = Nucleotide::new("seq7", "ACGZ").unwrap_err().to_string();
        assert!(message.starts_with(">seq7 ::"));
        assert!(message.contains(NUCLEOTIDE_ALPHABET));
    }

    #[test]
    fn test_mutation_is_validated() {
        let seq = Nucleotide::new("s", "ATG").unwrap();
        assert!(seq.with_sequence("ATGQ").is_err());
        assert_eq!(seq.with_sequence("atgccc").unwrap().sequence(), "ATGCCC");
    }

    #[test]
    fn test_basic_cds() {
        assert!(!Nucleotide::new("a", "ATGAA").unwrap().is_basic_cds());
        assert!(!Nucleotide::new("b", "TTGAAA").unwrap().is_basic_cds());
        assert!(Nucleotide::new("c", "ATGAAA").unwrap().is_basic_cds());
        assert!(!Nucleotide::new("d", "").unwrap().is_basic_cds());
    }

    #[test]
    fn test_triplets() {
        let seq = Nucleotide::new("t", "ATGAAATG").unwrap();
        assert_eq!(seq.triplets(), vec!["ATG", "AAA", "TG"]);
    }

    #[test]
    fn test_protein_alphabet() {
        let p = Protein::new("p", "mk?x*").unwrap();
        assert_eq!(p.sequence(), "MK?X*");
        assert!(Protein::new("p", "MKB").is_err());
        assert!(Protein::new("p", "MK1").is_err());
    }

    #[test]
    fn test_non_ascii_letters_rejected() {
        // Unicode uppercasing would turn these into S / SS
        assert!(matches!(
            Nucleotide::new("x", "ATG\u{df}"),
            Err(SeqError::InvalidSequence { found: '\u{df}', .. })
        ));
        assert!(matches!(
            Protein::new("p", "M\u{17f}"),
            Err(SeqError::InvalidSequence { found: '\u{17f}', .. })
        ));
    }

    #[test]
    fn test_fasta() {
        let p = Protein::new("prot", "MK").unwrap();
        assert_eq!(p.fasta(), ">prot\nMK\n");
    }

    #[test]
    fn test_forced_marker() {
        assert!(Nucleotide::new("gene FORCED", "AC").unwrap().is_forced());
        assert!(!Nucleotide::new("gene", "AC").unwrap().is_forced());
    }
}
