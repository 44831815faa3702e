//! Generate-and-test random DNA under run-length, GC and restriction-site constraints.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SeqError};
use crate::operations::{gc_content, longest_homopolymer, longest_strength_run};
use crate::search::contains_any;

const BASES: [char; 4] = ['A', 'C', 'G', 'T'];

pub const DEFAULT_MAX_ATTEMPTS_PER_CHUNK: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub length: usize,
    /// Longest allowed run of a single base.
    pub homopolymer_limit: usize,
    /// Runs of G/C or of A/T must stay shorter than this.
    pub gc_stretch_limit: usize,
    /// Each chunk's G+C ratio must exceed this value.
    pub max_gc_ratio: Option<f64>,
    pub restriction_enzymes: Vec<String>,
    pub max_attempts_per_chunk: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            length: 1000,
            homopolymer_limit: 10,
            gc_stretch_limit: 20,
            max_gc_ratio: Some(0.3),
            restriction_enzymes: Vec::new(),
            max_attempts_per_chunk: DEFAULT_MAX_ATTEMPTS_PER_CHUNK,
        }
    }
}

impl GeneratorSettings {
    pub fn chunk_size(&self) -> usize {
        5 * self.homopolymer_limit.min(self.gc_stretch_limit)
    }

    fn validate(&self) -> Result<()> {
        if self.homopolymer_limit == 0 || self.gc_stretch_limit == 0 {
            return Err(SeqError::InvalidInput(
                "homopolymer and GC stretch limits must be at least 1".to_string(),
            ));
        }
        if self.max_attempts_per_chunk == 0 {
            return Err(SeqError::InvalidInput(
                "max_attempts_per_chunk must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Bases of the previous chunk that a run or site could extend from.
    fn carry_over(&self) -> usize {
        let longest_site = self
            .restriction_enzymes
            .iter()
            .map(|s| s.len())
            .max()
            .unwrap_or(0);
        self.homopolymer_limit
            .max(self.gc_stretch_limit)
            .max(longest_site.saturating_sub(1))
    }

    /// `tail` is already-confirmed sequence directly preceding `chunk`.
    fn accepts(&self, tail: &str, chunk: &str) -> bool {
        if let Some(ratio) = self.max_gc_ratio {
            if gc_content(chunk) <= ratio {
                return false;
            }
        }

        let joined = format!("{tail}{chunk}");
        longest_homopolymer(&joined) <= self.homopolymer_limit
            && longest_strength_run(&joined) < self.gc_stretch_limit
            && !contains_any(&joined, &self.restriction_enzymes)
    }
}

fn random_chunk<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length).map(|_| BASES[rng.random_range(0..4)]).collect()
}

/// Redraw a chunk until it fits after `tail`. `None` once the budget is spent.
fn draw_chunk<R: Rng>(
    settings: &GeneratorSettings,
    rng: &mut R,
    tail: &str,
    length: usize,
) -> Option<(String, usize)> {
    (1..=settings.max_attempts_per_chunk).find_map(|attempt| {
        let candidate = random_chunk(rng, length);
        settings.accepts(tail, &candidate).then_some((candidate, attempt))
    })
}

/// Random DNA of exactly `settings.length` bases.
///
/// The target is cut into chunks of at most `5 * min(limits)` bases. Each
/// chunk is redrawn until it passes every constraint, checked together with
/// the end of the sequence confirmed so far. A chunk that cannot follow its
/// predecessor discards that predecessor and draws it again; the number of
/// such steps back is bounded by `max_attempts_per_chunk` as well.
pub fn generate<R: Rng>(settings: &GeneratorSettings, rng: &mut R) -> Result<String> {
    settings.validate()?;

    let chunk_size = settings.chunk_size();
    let carry = settings.carry_over();
    let enzymes: Vec<String> = settings
        .restriction_enzymes
        .iter()
        .map(|s| s.to_uppercase())
        .collect();
    let settings = GeneratorSettings {
        restriction_enzymes: enzymes,
        ..settings.clone()
    };

    let mut confirmed = String::with_capacity(settings.length);
    let mut chunk_starts: Vec<usize> = Vec::new();
    let mut backtracks = 0;

    while confirmed.len() < settings.length {
        let chunk_index = chunk_starts.len();
        let length = chunk_size.min(settings.length - confirmed.len());
        let tail = &confirmed[confirmed.len().saturating_sub(carry)..];

        match draw_chunk(&settings, rng, tail, length) {
            Some((chunk, attempts)) => {
                debug!(chunk = chunk_index, attempts, "chunk accepted");
                chunk_starts.push(confirmed.len());
                confirmed.push_str(&chunk);
            }
            None => match chunk_starts.pop() {
                Some(start) if backtracks < settings.max_attempts_per_chunk => {
                    backtracks += 1;
                    debug!(
                        chunk = chunk_index,
                        backtracks,
                        "no valid continuation, redrawing previous chunk"
                    );
                    confirmed.truncate(start);
                }
                _ => {
                    return Err(SeqError::GenerationExhausted {
                        chunk: chunk_index,
                        attempts: settings.max_attempts_per_chunk,
                    })
                }
            },
        }
    }

    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings(length: usize) -> GeneratorSettings {
        GeneratorSettings {
            length,
            homopolymer_limit: 3,
            gc_stretch_limit: 5,
            max_gc_ratio: Some(0.6),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_length() {
        let mut rng = StdRng::seed_from_u64(7);
        for length in [0, 1, 14, 15, 16, 100] {
            let dna = generate(&settings(length), &mut rng).unwrap();
            assert_eq!(dna.len(), length);
        }
    }

    #[test]
    fn test_chunk_size() {
        assert_eq!(settings(10).chunk_size(), 15);
        assert_eq!(GeneratorSettings::default().chunk_size(), 50);
    }

    #[test]
    fn test_avoids_restriction_sites() {
        let mut rng = StdRng::seed_from_u64(11);
        let settings = GeneratorSettings {
            length: 400,
            max_gc_ratio: None,
            restriction_enzymes: vec!["ggtctc".to_string(), "GAATTC".to_string()],
            ..Default::default()
        };
        let dna = generate(&settings, &mut rng).unwrap();
        assert!(!dna.contains("GGTCTC"));
        assert!(!dna.contains("GAATTC"));
    }

    #[test]
    fn test_boundaries_checked() {
        let settings = settings(0);
        assert!(!settings.accepts("GGGCCC", "CAGCAG"));
        assert!(!settings.accepts("AATA", "TGCGCAG"));
        assert!(settings.accepts("CAT", "GCGAGCGCAG"));
    }

    #[test]
    fn test_gc_ratio_must_be_exceeded() {
        let settings = GeneratorSettings {
            homopolymer_limit: 10,
            gc_stretch_limit: 20,
            max_gc_ratio: Some(0.5),
            ..Default::default()
        };
        assert!(!settings.accepts("", "ACGT"));
        assert!(settings.accepts("", "ACGC"));
    }

    #[test]
    fn test_unsatisfiable_exhausts() {
        let mut rng = StdRng::seed_from_u64(3);
        let settings = GeneratorSettings {
            length: 10,
            homopolymer_limit: 1,
            gc_stretch_limit: 1,
            max_gc_ratio: None,
            max_attempts_per_chunk: 50,
            ..Default::default()
        };
        let err = generate(&settings, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SeqError::GenerationExhausted {
                chunk: 0,
                attempts: 50
            }
        ));
    }

    #[test]
    fn test_short_final_chunk_backtracks() {
        // A 1-base final chunk must be G/C; it has no valid continuation
        // whenever the previous chunk ends in four strong bases.
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let dna = generate(&settings(16), &mut rng).unwrap();
            assert_eq!(dna.len(), 16);
            assert!(longest_strength_run(&dna) < 5);
        }
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let settings = GeneratorSettings {
            homopolymer_limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            generate(&settings, &mut rng),
            Err(SeqError::InvalidInput(_))
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn generated_dna_respects_limits(seed in any::<u64>()) {
                let mut rng = StdRng::seed_from_u64(seed);
                let dna = generate(&settings(100), &mut rng).unwrap();

                prop_assert_eq!(dna.len(), 100);
                prop_assert!(dna.chars().all(|c| "ACGT".contains(c)));
                prop_assert!(longest_homopolymer(&dna) < 4);
                prop_assert!(longest_strength_run(&dna) < 5);
            }
        }
    }
}
