use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::codon::CodonUsage;
use crate::error::{Result, SeqError};

/// How a codon is picked among synonymous candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Inverse-CDF sampling weighted by usage fraction.
    #[default]
    Stochastic,
    /// Always the most used codon (first one wins on ties).
    Maximum,
}

/// Picks one codon from a synonym group.
///
/// Owns its random source so runs can be reproduced with [`CodonSelector::seeded`].
pub struct CodonSelector {
    rng: StdRng,
}

impl CodonSelector {
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Select a codon from `synonyms`, skipping any triplet listed in `exclude`.
    pub fn select(
        &mut self,
        synonyms: &[CodonUsage],
        mode: SelectionMode,
        exclude: &[&str],
    ) -> Result<String> {
        let candidates: Vec<&CodonUsage> = synonyms
            .iter()
            .filter(|c| !exclude.contains(&c.triplet.as_str()))
            .collect();

        if candidates.is_empty() {
            return Err(SeqError::NoAlternativeCodon {
                amino_acid: synonyms.first().map(|c| c.amino_acid).unwrap_or('?'),
                excluded: exclude.iter().map(|s| s.to_string()).collect(),
            });
        }

        let chosen = match mode {
            SelectionMode::Maximum => first_max(&candidates),
            SelectionMode::Stochastic => {
                let draw: f64 = self.rng.random();
                self.sample(&candidates, draw)
            }
        };
        Ok(chosen.triplet.clone())
    }

    fn sample<'a>(&mut self, candidates: &[&'a CodonUsage], draw: f64) -> &'a CodonUsage {
        let mut cumulative = Vec::with_capacity(candidates.len());
        let mut running = 0.0;
        for codon in candidates {
            running += codon.fraction;
            cumulative.push(running);
        }

        if running <= 0.0 {
            return candidates[self.rng.random_range(0..candidates.len())];
        }

        cumulative
            .iter()
            .position(|c| c / running > draw)
            .map(|i| candidates[i])
            .unwrap_or(candidates[candidates.len() - 1])
    }
}

impl Default for CodonSelector {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

fn first_max<'a>(candidates: &[&'a CodonUsage]) -> &'a CodonUsage {
    let mut best = candidates[0];
    for codon in &candidates[1..] {
        if codon.fraction > best.fraction {
            best = codon;
        }
    }
    best
}
