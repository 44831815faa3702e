use anyhow::Result;
use seqforge_core::minmax::{fraction_profile, minmax_profile, set_minimal_optimization_value};
use seqforge_core::operations::{
    gc_content, kmer_analysis, longest_homopolymer, melting_temperature,
    reverse_complement_entity,
};
use seqforge_core::search::find_cutsites;
use seqforge_core::transform::{self, check_cds};
use seqforge_core::{CodonUsageTable, Nucleotide, SequenceEntity, SequenceRecord};
use tracing::warn;

use super::selection_mode;
use crate::dto::{KmerDto, ProfileDto, ProfileKind, SequenceStatsDto};
use crate::Engine;

/// Cutsite removal and part wrapping applied after the main operation.
///
/// Choosing a part type implies cutsite removal.
#[derive(Debug, Clone, Default)]
pub struct PartOptions {
    pub remove_cutsites: bool,
    pub part_type: Option<String>,
}

pub(crate) fn finish(
    engine: &mut Engine,
    table: &CodonUsageTable,
    sequences: Vec<Nucleotide>,
    options: &PartOptions,
) -> Result<Vec<Nucleotide>> {
    let mut out = sequences;

    if options.remove_cutsites || options.part_type.is_some() {
        let enzymes = engine.config.optimization.restriction_enzymes.clone();
        let policy = engine.config.optimization.retry_policy();
        out = out
            .iter()
            .map(|s| transform::remove_cutsites(s, table, &enzymes, policy, &mut engine.selector))
            .collect::<Result<_, _>>()?;
    }

    if let Some(part_type) = &options.part_type {
        let catalog = engine.part_catalog()?;
        out = out
            .iter()
            .map(|s| transform::make_part(s, table, part_type, &catalog))
            .collect::<Result<_, _>>()?;
    }

    Ok(out)
}

/// Translate every record. With `cds_only`, non-CDS records pass through.
pub fn translate(
    table: &CodonUsageTable,
    sequences: &[Nucleotide],
    cds_only: bool,
) -> Result<Vec<SequenceRecord>> {
    Ok(sequences
        .iter()
        .map(|s| transform::translate(s, table, !cds_only))
        .collect::<Result<_, _>>()?)
}

pub fn optimize(
    engine: &mut Engine,
    table: &CodonUsageTable,
    sequences: &[Nucleotide],
    maximize: bool,
    minimal_optimization: bool,
    options: &PartOptions,
) -> Result<Vec<Nucleotide>> {
    let mode = selection_mode(maximize);
    let settings = engine.config.optimization.settings();

    let mut optimized = Vec::with_capacity(sequences.len());
    for seq in sequences {
        let mut out = transform::optimize_codon_usage(seq, table, mode, &mut engine.selector)?;
        if minimal_optimization {
            out = set_minimal_optimization_value(&out, table, &settings, &mut engine.selector)?;
        }
        optimized.push(out);
    }

    finish(engine, table, optimized, options)
}

pub fn harmonize(
    engine: &mut Engine,
    target: &CodonUsageTable,
    source: &CodonUsageTable,
    sequences: &[Nucleotide],
    mode: u8,
    options: &PartOptions,
) -> Result<Vec<Nucleotide>> {
    let harmonized = sequences
        .iter()
        .map(|s| transform::harmonize(s, target, source, mode))
        .collect::<Result<_, _>>()?;
    finish(engine, target, harmonized, options)
}

pub fn remove_cutsites(
    engine: &mut Engine,
    table: &CodonUsageTable,
    sequences: &[Nucleotide],
    part_type: Option<String>,
) -> Result<Vec<Nucleotide>> {
    let options = PartOptions {
        remove_cutsites: true,
        part_type,
    };
    finish(engine, table, sequences.to_vec(), &options)
}

/// Wrap records as parts without touching their sequence.
pub fn make_part(
    engine: &Engine,
    table: &CodonUsageTable,
    sequences: &[Nucleotide],
    part_type: &str,
) -> Result<Vec<Nucleotide>> {
    let catalog = engine.part_catalog()?;
    Ok(sequences
        .iter()
        .map(|s| transform::make_part(s, table, part_type, &catalog))
        .collect::<Result<_, _>>()?)
}

pub fn reverse_complement(sequences: &[Nucleotide]) -> Result<Vec<Nucleotide>> {
    Ok(sequences
        .iter()
        .map(reverse_complement_entity)
        .collect::<Result<_, _>>()?)
}

pub fn stats(
    table: &CodonUsageTable,
    sequences: &[Nucleotide],
    enzymes: &[String],
    kmer_threshold: usize,
    kmer_length: usize,
) -> Result<Vec<SequenceStatsDto>> {
    sequences
        .iter()
        .map(|s| {
            Ok(SequenceStatsDto {
                id: s.id().to_string(),
                length: s.len(),
                gc_content: gc_content(s.sequence()),
                melting_temperature: melting_temperature(s.sequence()),
                is_cds: check_cds(s, table)?,
                longest_homopolymer: longest_homopolymer(s.sequence()),
                repeated_kmers: kmer_analysis(s.sequence(), kmer_threshold, kmer_length)
                    .into_iter()
                    .map(|(kmer, count)| KmerDto { kmer, count })
                    .collect(),
                cutsites: find_cutsites(s.sequence(), enzymes),
            })
        })
        .collect()
}

/// Window series per record. Records the profile is undefined for are skipped.
pub fn profile(
    table: &CodonUsageTable,
    sequences: &[Nucleotide],
    kind: ProfileKind,
    window: usize,
) -> Result<Vec<ProfileDto>> {
    let mut profiles = Vec::new();
    for seq in sequences {
        let series = match kind {
            ProfileKind::MinMax => minmax_profile(seq, table, window)?,
            ProfileKind::Fraction => fraction_profile(seq, table, window)?,
        };
        match series {
            Some(series) => profiles.push(ProfileDto::new(
                seq.id(),
                &table.organism_name,
                kind,
                &series,
            )),
            None => warn!("{}: no {:?} profile for this sequence", seq.id(), kind),
        }
    }
    Ok(profiles)
}
