use anyhow::Result;
use seqforge_core::transform::reverse_translate;
use seqforge_core::{CodonUsageTable, Nucleotide, Protein};

use super::dna::{finish, PartOptions};
use super::selection_mode;
use crate::Engine;

/// Back-translate proteins, then remove cutsites and wrap as parts if asked.
pub fn reverse_translate_all(
    engine: &mut Engine,
    table: &CodonUsageTable,
    proteins: &[Protein],
    maximize: bool,
    options: &PartOptions,
) -> Result<Vec<Nucleotide>> {
    let mode = selection_mode(maximize);
    let dna = proteins
        .iter()
        .map(|p| reverse_translate(p, table, mode, &mut engine.selector))
        .collect::<Result<_, _>>()?;
    finish(engine, table, dna, options)
}
