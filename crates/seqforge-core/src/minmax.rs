//! Windowed codon usage scores and local optimization.
//!
//! %MinMax after Clarke & Clark (2008), "Rare Codons Cluster", PLoS ONE 3(10): e3412.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codon::CodonUsageTable;
use crate::error::{Result, SeqError};
use crate::selector::{CodonSelector, SelectionMode};
use crate::sequence::{Nucleotide, SequenceEntity};
use crate::transform::{recode_sequence, RecodeTarget};

pub const DEFAULT_WINDOW: usize = 10;
pub const DEFAULT_THRESHOLD: f64 = 20.0;
pub const MAX_OPTIMIZATION_ITERATIONS: usize = 500;

/// Score of one window, keyed by the codon index where the window starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowScore {
    pub position: usize,
    pub value: f64,
}

/// Per-window scores along a sequence. Windows without a defined score are
/// absent, so positions are not necessarily contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodonWindowProfile {
    pub window: usize,
    pub scores: Vec<WindowScore>,
}

impl CodonWindowProfile {
    /// The plain series handed to plotting.
    pub fn values(&self) -> Vec<f64> {
        self.scores.iter().map(|s| s.value).collect()
    }

    pub fn min(&self) -> Option<WindowScore> {
        first_min(self.scores.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Frequencies backing one codon: its own, and the max, min and mean over its synonyms.
#[derive(Debug, Clone, Copy)]
struct CodonFrequencies {
    actual: f64,
    max: f64,
    min: f64,
    mean: f64,
}

fn codon_frequencies(table: &CodonUsageTable, triplet: &str) -> Option<CodonFrequencies> {
    let usage = table.get(triplet)?;
    let synonyms = table.synonyms(usage.amino_acid)?;
    let frequencies = synonyms.iter().map(|c| c.frequency);
    Some(CodonFrequencies {
        actual: usage.frequency,
        max: frequencies.clone().fold(f64::MIN, f64::max),
        min: frequencies.clone().fold(f64::MAX, f64::min),
        mean: frequencies.sum::<f64>() / synonyms.len() as f64,
    })
}

fn window_minmax(codons: &[Option<CodonFrequencies>]) -> Option<f64> {
    let n = codons.len() as f64;
    let (mut actual, mut max, mut min, mut mean) = (0.0, 0.0, 0.0, 0.0);
    for codon in codons {
        let codon = codon.as_ref()?;
        actual += codon.actual;
        max += codon.max;
        min += codon.min;
        mean += codon.mean;
    }
    let (actual, max, min, mean) = (actual / n, max / n, min / n, mean / n);

    let above = (actual - mean) / (max - mean) * 100.0;
    if above > 0.0 {
        return Some(above);
    }
    let below = (mean - actual) / (mean - min) * 100.0;
    if below > 0.0 {
        return Some(-below);
    }
    None
}

fn check_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(SeqError::InvalidInput("window size must be at least 1".to_string()));
    }
    Ok(())
}

fn first_min(scores: impl Iterator<Item = WindowScore>) -> Option<WindowScore> {
    scores.fold(None, |best: Option<WindowScore>, s| match best {
        Some(b) if b.value <= s.value => Some(b),
        _ => Some(s),
    })
}

/// Dense %MinMax state: per-codon frequencies and one optional score per window start.
struct MinMaxState {
    window: usize,
    codons: Vec<Option<CodonFrequencies>>,
    scores: Vec<Option<f64>>,
}

impl MinMaxState {
    fn new(seq: &Nucleotide, table: &CodonUsageTable, window: usize) -> Self {
        let codons: Vec<Option<CodonFrequencies>> = seq
            .triplets()
            .into_iter()
            .map(|t| codon_frequencies(table, t))
            .collect();
        let mut state = Self {
            window,
            scores: vec![None; (codons.len() + 1).saturating_sub(window)],
            codons,
        };
        state.rescore(0, state.scores.len());
        state
    }

    fn rescore(&mut self, from: usize, to: usize) {
        for start in from..to.min(self.scores.len()) {
            self.scores[start] = window_minmax(&self.codons[start..start + self.window]);
        }
    }

    /// Refresh the codons in `[first, last)` from `seq` and every window touching them.
    fn update(&mut self, seq: &Nucleotide, table: &CodonUsageTable, first: usize, last: usize) {
        let triplets = seq.triplets();
        for i in first..last.min(self.codons.len()) {
            self.codons[i] = codon_frequencies(table, triplets[i]);
        }
        let from = (first + 1).saturating_sub(self.window);
        self.rescore(from, last);
    }

    fn lowest(&self) -> Option<WindowScore> {
        first_min(
            self.scores
                .iter()
                .enumerate()
                .filter_map(|(position, s)| s.map(|value| WindowScore { position, value })),
        )
    }

    fn profile(&self) -> CodonWindowProfile {
        CodonWindowProfile {
            window: self.window,
            scores: self
                .scores
                .iter()
                .enumerate()
                .filter_map(|(position, s)| s.map(|value| WindowScore { position, value }))
                .collect(),
        }
    }
}

/// %MinMax per window of `window` codons. `None` unless the length is a multiple of 3.
///
/// Windows where neither the above-average nor the below-average branch is
/// positive, or that contain an untranslatable codon, are left out.
pub fn minmax_profile(
    seq: &Nucleotide,
    table: &CodonUsageTable,
    window: usize,
) -> Result<Option<CodonWindowProfile>> {
    check_window(window)?;
    if seq.len() % 3 != 0 {
        return Ok(None);
    }
    Ok(Some(MinMaxState::new(seq, table, window).profile()))
}

/// Mean codon fraction per window. `None` unless the sequence is a basic CDS.
pub fn fraction_profile(
    seq: &Nucleotide,
    table: &CodonUsageTable,
    window: usize,
) -> Result<Option<CodonWindowProfile>> {
    check_window(window)?;
    if !seq.is_basic_cds() {
        return Ok(None);
    }

    let fractions: Vec<Option<f64>> = seq
        .triplets()
        .into_iter()
        .map(|t| table.get(t).map(|c| c.fraction))
        .collect();

    let scores = fractions
        .windows(window)
        .enumerate()
        .filter_map(|(position, w)| {
            let total: Option<f64> = w.iter().copied().sum();
            total.map(|t| WindowScore {
                position,
                value: t / window as f64,
            })
        })
        .collect();

    Ok(Some(CodonWindowProfile { window, scores }))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizationSettings {
    /// Lowest acceptable %MinMax score.
    pub threshold: f64,
    pub window: usize,
    pub max_iterations: usize,
}

impl Default for OptimizationSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            window: DEFAULT_WINDOW,
            max_iterations: MAX_OPTIMIZATION_ITERATIONS,
        }
    }
}

/// Raise the weakest %MinMax windows to `threshold` by local recoding.
///
/// Each round recodes the codons under the lowest-scoring window and rescores
/// only the windows overlapping them. Stops at the threshold or after
/// `max_iterations` rounds (never more than [`MAX_OPTIMIZATION_ITERATIONS`]),
/// returning the best effort either way.
pub fn set_minimal_optimization_value(
    seq: &Nucleotide,
    table: &CodonUsageTable,
    settings: &OptimizationSettings,
    selector: &mut CodonSelector,
) -> Result<Nucleotide> {
    raise_floor(seq, table, settings, selector).map(|(optimized, _)| optimized)
}

/// Optimized sequence and the number of recode rounds spent on it.
fn raise_floor(
    seq: &Nucleotide,
    table: &CodonUsageTable,
    settings: &OptimizationSettings,
    selector: &mut CodonSelector,
) -> Result<(Nucleotide, usize)> {
    check_window(settings.window)?;
    if seq.len() % 3 != 0 {
        return Ok((seq.clone(), 0));
    }

    let window = settings.window;
    let cap = settings.max_iterations.min(MAX_OPTIMIZATION_ITERATIONS);
    let mut state = MinMaxState::new(seq, table, window);
    let mut current = seq.clone();
    let mut iterations = 0;

    while let Some(lowest) = state.lowest() {
        if lowest.value >= settings.threshold {
            break;
        }
        if iterations >= cap {
            debug!(
                id = current.id(),
                lowest = lowest.value,
                iterations,
                "minimal optimization stopped at iteration cap"
            );
            break;
        }

        let first = lowest.position;
        let last = first + window;
        current = recode_sequence(
            &current,
            table,
            RecodeTarget::Range(first * 3, last * 3),
            SelectionMode::Stochastic,
            selector,
        )?;
        state.update(&current, table, first, last);
        iterations += 1;
    }

    Ok((current, iterations))
}
