use thiserror::Error;

/// Errors raised by the codon usage engine.
#[derive(Debug, Error)]
pub enum SeqError {
    #[error(">{id} :: includes forbidden character '{found}'! Allowed characters: \"{allowed}\"")]
    InvalidSequence {
        id: String,
        found: char,
        allowed: &'static str,
    },

    #[error("Organism not found in codon usage catalog: {0}")]
    OrganismNotFound(String),

    #[error("No alternative codon for amino acid '{amino_acid}' after excluding {excluded:?}")]
    NoAlternativeCodon {
        amino_acid: char,
        excluded: Vec<String>,
    },

    #[error("Cannot remove cutsite {pattern} at position {position} by silent recoding")]
    UnresolvableCutsite { pattern: String, position: usize },

    #[error("Unknown part type: {0}")]
    UnknownPartType(String),

    #[error("Invalid harmonization mode {0} (expected 0 or 1)")]
    InvalidMode(u8),

    #[error("Gave up generating chunk {chunk} after {attempts} attempts; constraints may be unsatisfiable")]
    GenerationExhausted { chunk: usize, attempts: usize },

    #[error("Invalid codon catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, SeqError>;
