//! Flat, JSON-friendly DTOs for command output.

use seqforge_core::minmax::CodonWindowProfile;
use seqforge_core::search::SequenceMatch;
use seqforge_parts::StoredPart;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    MinMax,
    Fraction,
}

/// One window series, ready for plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDto {
    pub id: String,
    pub organism: String,
    pub kind: ProfileKind,
    pub window: usize,
    /// Codon index where each window starts; gaps mark undefined windows.
    pub positions: Vec<usize>,
    pub values: Vec<f64>,
}

impl ProfileDto {
    pub fn new(id: &str, organism: &str, kind: ProfileKind, profile: &CodonWindowProfile) -> Self {
        ProfileDto {
            id: id.to_string(),
            organism: organism.to_string(),
            kind,
            window: profile.window,
            positions: profile.scores.iter().map(|s| s.position).collect(),
            values: profile.values(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KmerDto {
    pub kmer: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceStatsDto {
    pub id: String,
    pub length: usize,
    pub gc_content: f64,
    pub melting_temperature: u32,
    pub is_cds: bool,
    pub longest_homopolymer: usize,
    pub repeated_kmers: Vec<KmerDto>,
    /// Restriction sites still present.
    pub cutsites: Vec<SequenceMatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartDto {
    pub part_type: String,
    pub info: String,
    pub prefix: String,
    pub suffix: String,
    pub strip_stop: bool,
    pub builtin: bool,
}

impl From<&StoredPart> for PartDto {
    fn from(p: &StoredPart) -> Self {
        PartDto {
            part_type: p.part_type.clone(),
            info: p.info.clone().unwrap_or_default(),
            prefix: p.prefix.clone(),
            suffix: p.suffix.clone(),
            strip_stop: p.strip_stop,
            builtin: p.is_builtin,
        }
    }
}
