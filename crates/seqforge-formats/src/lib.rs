pub mod detect;
pub mod fasta;
pub mod spsum;

use seqforge_core::{Nucleotide, Protein, SeqError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sequence(#[from] SeqError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Fasta,
    Spsum,
    /// Bare sequence text without a header.
    Raw,
    Unknown,
}

/// Parse nucleotide input based on detected format. Raw text becomes a single
/// record named `seq1`.
pub fn parse_nucleotide_input(content: &str) -> Result<Vec<Nucleotide>, ParseError> {
    match detect::detect_format(content) {
        FileFormat::Fasta => fasta::parse_nucleotides(content),
        FileFormat::Raw => {
            let body: String = content.split_whitespace().collect();
            Ok(vec![Nucleotide::new("seq1", body)?])
        }
        _ => Err(ParseError::InvalidFormat(
            "Unsupported or unrecognized sequence input".to_string(),
        )),
    }
}

/// Protein counterpart of [`parse_nucleotide_input`].
pub fn parse_protein_input(content: &str) -> Result<Vec<Protein>, ParseError> {
    match detect::detect_format(content) {
        FileFormat::Fasta => fasta::parse_proteins(content),
        // stops and unknown residues are not plain text to the detector
        FileFormat::Raw | FileFormat::Unknown => {
            let body: String = content.split_whitespace().collect();
            if body.is_empty() {
                return Err(ParseError::InvalidFormat("No protein sequence given".to_string()));
            }
            Ok(vec![Protein::new("seq1", body)?])
        }
        _ => Err(ParseError::InvalidFormat(
            "Unsupported or unrecognized protein input".to_string(),
        )),
    }
}
