use anyhow::Result;
use seqforge_core::generator::{generate, GeneratorSettings};
use seqforge_core::Nucleotide;
use tracing::info;

use crate::Engine;

/// Random DNA under the given constraints, named `id`.
pub fn random_dna(engine: &mut Engine, settings: &GeneratorSettings, id: &str) -> Result<Nucleotide> {
    let dna = generate(settings, &mut engine.rng)?;
    info!(length = dna.len(), "generated random DNA");
    Ok(Nucleotide::new(id, dna)?)
}
