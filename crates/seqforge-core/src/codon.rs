use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeqError};

/// Codon order used by SPSUM codon usage catalogs (one count per entry).
pub const CATALOG_CODONS: [&str; 64] = [
    "CGA", "CGC", "CGG", "CGT", "AGA", "AGG", "CTA", "CTC",
    "CTG", "CTT", "TTA", "TTG", "TCA", "TCC", "TCG", "TCT",
    "AGC", "AGT", "ACA", "ACC", "ACG", "ACT", "CCA", "CCC",
    "CCG", "CCT", "GCA", "GCC", "GCG", "GCT", "GGA", "GGC",
    "GGG", "GGT", "GTA", "GTC", "GTG", "GTT", "AAA", "AAG",
    "AAC", "AAT", "CAA", "CAG", "CAC", "CAT", "GAA", "GAG",
    "GAC", "GAT", "TAC", "TAT", "TGC", "TGT", "TTC", "TTT",
    "ATA", "ATC", "ATT", "ATG", "TGG", "TAA", "TAG", "TGA",
];

/// Standard genetic code aligned with [`CATALOG_CODONS`].
pub const STANDARD_GENETIC_CODE: [char; 64] = [
    'R', 'R', 'R', 'R', 'R', 'R', 'L', 'L',
    'L', 'L', 'L', 'L', 'S', 'S', 'S', 'S',
    'S', 'S', 'T', 'T', 'T', 'T', 'P', 'P',
    'P', 'P', 'A', 'A', 'A', 'A', 'G', 'G',
    'G', 'G', 'V', 'V', 'V', 'V', 'K', 'K',
    'N', 'N', 'Q', 'Q', 'H', 'H', 'E', 'E',
    'D', 'D', 'Y', 'Y', 'C', 'C', 'F', 'F',
    'I', 'I', 'I', 'M', 'W', '*', '*', '*',
];

pub const START_CODON: &str = "ATG";

/// Usage statistics for one codon of an organism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodonUsage {
    pub triplet: String,
    pub amino_acid: char,
    /// Raw observed occurrences.
    pub count: u64,
    /// Share of the amino acid's synonymous codons (sums to 1.0 per amino acid).
    pub fraction: f64,
    /// Occurrences per 1000 codons across the whole table.
    pub frequency: f64,
}

/// Immutable per-organism codon usage table.
///
/// Rows are grouped by amino acid, each group ordered by triplet, with an
/// index for constant-time lookup by triplet.
#[derive(Debug, Clone, Serialize)]
pub struct CodonUsageTable {
    pub organism_id: String,
    pub organism_name: String,
    groups: BTreeMap<char, Vec<CodonUsage>>,
    #[serde(skip)]
    index: HashMap<String, (char, usize)>,
}

impl CodonUsageTable {
    /// Build a table from 64 counts given in [`CATALOG_CODONS`] order.
    pub fn from_counts(
        organism_id: impl Into<String>,
        organism_name: impl Into<String>,
        counts: &[u64],
    ) -> Result<Self> {
        let organism_id = organism_id.into();
        if counts.len() != CATALOG_CODONS.len() {
            return Err(SeqError::InvalidCatalog(format!(
                "organism {} has {} codon counts, expected {}",
                organism_id,
                counts.len(),
                CATALOG_CODONS.len()
            )));
        }

        let total: u64 = counts.iter().sum();
        if total == 0 {
            return Err(SeqError::InvalidCatalog(format!(
                "organism {} has no codon observations",
                organism_id
            )));
        }

        let mut groups: BTreeMap<char, Vec<CodonUsage>> = BTreeMap::new();
        for ((triplet, aa), count) in CATALOG_CODONS
            .iter()
            .zip(STANDARD_GENETIC_CODE.iter())
            .zip(counts.iter())
        {
            groups.entry(*aa).or_default().push(CodonUsage {
                triplet: triplet.to_string(),
                amino_acid: *aa,
                count: *count,
                fraction: 0.0,
                frequency: *count as f64 / total as f64 * 1000.0,
            });
        }

        let mut index = HashMap::with_capacity(CATALOG_CODONS.len());
        for (aa, synonyms) in groups.iter_mut() {
            synonyms.sort_by(|a, b| a.triplet.cmp(&b.triplet));
            let group_total: u64 = synonyms.iter().map(|c| c.count).sum();
            let n = synonyms.len() as f64;
            for (slot, codon) in synonyms.iter_mut().enumerate() {
                // Unobserved amino acids get a uniform split so every group still sums to 1.
                codon.fraction = if group_total == 0 {
                    1.0 / n
                } else {
                    codon.count as f64 / group_total as f64
                };
                index.insert(codon.triplet.clone(), (*aa, slot));
            }
        }

        Ok(CodonUsageTable {
            organism_id,
            organism_name: organism_name.into(),
            groups,
            index,
        })
    }

    /// Usage row for a triplet.
    pub fn get(&self, triplet: &str) -> Option<&CodonUsage> {
        let (aa, slot) = self.index.get(triplet)?;
        self.groups.get(aa).map(|synonyms| &synonyms[*slot])
    }

    /// Amino acid encoded by a triplet, if the triplet is a plain A/C/G/T codon.
    pub fn amino_acid(&self, triplet: &str) -> Option<char> {
        self.index.get(triplet).map(|(aa, _)| *aa)
    }

    /// All codons encoding an amino acid (`*` for stop), ordered by triplet.
    pub fn synonyms(&self, amino_acid: char) -> Option<&[CodonUsage]> {
        self.groups.get(&amino_acid).map(Vec::as_slice)
    }

    pub fn amino_acids(&self) -> impl Iterator<Item = char> + '_ {
        self.groups.keys().copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &CodonUsage> {
        self.groups.values().flatten()
    }

    pub fn total_count(&self) -> u64 {
        self.rows().map(|c| c.count).sum()
    }
}
