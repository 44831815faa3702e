//! Codon-usage-aware sequence transformations.
//!
//! Every transform returns a new entity whose identifier records what was
//! done to it; the input is never modified.

use tracing::debug;

use crate::codon::{CodonUsage, CodonUsageTable};
use crate::error::{Result, SeqError};
use crate::operations::replace_bases;
use crate::part::PartCatalog;
use crate::selector::{CodonSelector, SelectionMode};
use crate::sequence::{Nucleotide, Protein, SequenceEntity, SequenceRecord};

const UNKNOWN_CODON: &str = "NNN";

/// Translate a nucleotide sequence.
///
/// With `check` unset, input that is not a basic CDS comes back untouched
/// unless its identifier carries the `FORCED` marker.
pub fn translate(seq: &Nucleotide, table: &CodonUsageTable, check: bool) -> Result<SequenceRecord> {
    if !check && !seq.is_basic_cds() && !seq.is_forced() {
        return Ok(SequenceRecord::Nucleotide(seq.clone()));
    }
    translate_protein(seq, table).map(SequenceRecord::Protein)
}

/// Translate unconditionally. Partial codons, codons containing `N` and
/// anything the table does not know become `?`.
pub fn translate_protein(seq: &Nucleotide, table: &CodonUsageTable) -> Result<Protein> {
    let protein: String = seq
        .triplets()
        .into_iter()
        .map(|triplet| {
            if triplet.len() == 3 && !triplet.contains('N') {
                table.amino_acid(triplet).unwrap_or('?')
            } else {
                '?'
            }
        })
        .collect();
    Protein::new(format!("{}|PROT", seq.id()), protein)
}

/// Full CDS check: whole codons, ATG start, terminal stop and no internal stop.
pub fn check_cds(seq: &Nucleotide, table: &CodonUsageTable) -> Result<bool> {
    if !seq.is_basic_cds() {
        return Ok(false);
    }
    let protein = translate_protein(seq, table)?;
    let residues = protein.sequence();
    Ok(residues.ends_with('*') && !residues[..residues.len() - 1].contains('*'))
}

/// Back-translate a protein, choosing each codon with `selector`.
pub fn reverse_translate(
    protein: &Protein,
    table: &CodonUsageTable,
    mode: SelectionMode,
    selector: &mut CodonSelector,
) -> Result<Nucleotide> {
    let mut dna = String::with_capacity(protein.len() * 3);
    for amino in protein.sequence().chars() {
        if matches!(amino, '?' | 'X') {
            dna.push_str(UNKNOWN_CODON);
            continue;
        }
        let synonyms = table.synonyms(amino).ok_or_else(|| {
            SeqError::InvalidInput(format!("no codons for amino acid '{}'", amino))
        })?;
        dna.push_str(&selector.select(synonyms, mode, &[])?);
    }

    let tag = match mode {
        SelectionMode::Maximum => "|NUC-MAX",
        SelectionMode::Stochastic => "|NUC",
    };
    Nucleotide::new(format!("{}{}", protein.id(), tag), dna)
}

/// Re-pick every codon of a CDS from the target table's usage.
pub fn optimize_codon_usage(
    seq: &Nucleotide,
    table: &CodonUsageTable,
    mode: SelectionMode,
    selector: &mut CodonSelector,
) -> Result<Nucleotide> {
    if !seq.is_basic_cds() {
        return Ok(seq.clone());
    }
    let protein = translate_protein(seq, table)?;
    let optimized = reverse_translate(&protein, table, mode, selector)?;
    Ok(optimized.with_id(format!("{}|OPT", seq.id())))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmonizeMode {
    /// Target codon whose fraction is closest to the source codon's fraction.
    NearestFraction,
    /// Target codon with the same usage rank as the source codon.
    SameRank,
}

impl HarmonizeMode {
    pub fn code(self) -> u8 {
        match self {
            HarmonizeMode::NearestFraction => 0,
            HarmonizeMode::SameRank => 1,
        }
    }
}

impl TryFrom<u8> for HarmonizeMode {
    type Error = SeqError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(HarmonizeMode::NearestFraction),
            1 => Ok(HarmonizeMode::SameRank),
            other => Err(SeqError::InvalidMode(other)),
        }
    }
}

/// Recode a CDS so its codon usage in `target` mirrors its usage in `source`.
pub fn harmonize(
    seq: &Nucleotide,
    target: &CodonUsageTable,
    source: &CodonUsageTable,
    mode: u8,
) -> Result<Nucleotide> {
    let mode = HarmonizeMode::try_from(mode)?;
    if !seq.is_basic_cds() {
        return Ok(seq.clone());
    }

    let protein = translate_protein(seq, target)?;
    let mut harmonized = String::with_capacity(seq.len());

    for (amino, triplet) in protein.sequence().chars().zip(seq.triplets()) {
        let (Some(targets), Some(sources), Some(used)) = (
            target.synonyms(amino),
            source.synonyms(amino),
            source.get(triplet),
        ) else {
            harmonized.push_str(UNKNOWN_CODON);
            continue;
        };

        let chosen = match mode {
            HarmonizeMode::NearestFraction => nearest_fraction(targets, used.fraction),
            HarmonizeMode::SameRank => same_rank(targets, sources, used.fraction),
        };
        harmonized.push_str(chosen.map(|c| c.triplet.as_str()).unwrap_or(triplet));
    }

    Nucleotide::new(format!("{}|HARM{}", seq.id(), mode.code()), harmonized)
}

fn sorted_by_fraction(codons: &[CodonUsage]) -> Vec<&CodonUsage> {
    let mut sorted: Vec<&CodonUsage> = codons.iter().collect();
    sorted.sort_by(|a, b| a.fraction.total_cmp(&b.fraction));
    sorted
}

fn nearest_fraction(targets: &[CodonUsage], fraction: f64) -> Option<&CodonUsage> {
    let mut best: Option<(&CodonUsage, f64)> = None;
    for codon in sorted_by_fraction(targets) {
        let distance = (codon.fraction - fraction).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((codon, distance));
        }
    }
    best.map(|(codon, _)| codon)
}

fn same_rank<'a>(
    targets: &'a [CodonUsage],
    sources: &[CodonUsage],
    fraction: f64,
) -> Option<&'a CodonUsage> {
    let rank = sorted_by_fraction(sources)
        .iter()
        .position(|c| c.fraction == fraction)?;
    let sorted = sorted_by_fraction(targets);
    let value = sorted.get(rank)?.fraction;
    // Tied fractions resolve to the earliest triplet
    sorted.into_iter().find(|c| c.fraction == value)
}

/// What to recode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecodeTarget<'a> {
    /// First occurrence of a subsequence; nothing happens if it is absent.
    Pattern(&'a str),
    /// Half-open nucleotide range.
    Range(usize, usize),
}

/// Swap every codon overlapping `target` for a synonymous alternative.
///
/// The range is widened to codon boundaries. Amino acids with a single codon
/// and untranslatable codons stay as they are.
pub fn recode_sequence(
    seq: &Nucleotide,
    table: &CodonUsageTable,
    target: RecodeTarget<'_>,
    mode: SelectionMode,
    selector: &mut CodonSelector,
) -> Result<Nucleotide> {
    let (start, end) = match target {
        RecodeTarget::Pattern(pattern) => {
            let pattern = pattern.to_uppercase();
            match seq.sequence().find(&pattern) {
                Some(position) if !pattern.is_empty() => (position, position + pattern.len()),
                _ => return Ok(seq.clone()),
            }
        }
        RecodeTarget::Range(start, end) => (start, end),
    };

    let whole_codons = seq.len() - seq.len() % 3;
    let codon_start = start - start % 3;
    let codon_end = end.div_ceil(3).saturating_mul(3).min(whole_codons);

    let mut body = seq.sequence().to_string();
    let mut position = codon_start;
    while position < codon_end {
        let codon = body[position..position + 3].to_string();
        if let Some(synonyms) = table.amino_acid(&codon).and_then(|aa| table.synonyms(aa)) {
            if synonyms.len() > 1 {
                let replacement = selector.select(synonyms, mode, &[codon.as_str()])?;
                body = replace_bases(&body, position, 3, &replacement);
            }
        }
        position += 3;
    }

    let id = if seq.id().contains("|REC") {
        seq.id().to_string()
    } else {
        format!("{}|REC", seq.id())
    };
    Nucleotide::new(id, body)
}

/// Upper bound on recode attempts for loops that may not converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 1000 }
    }
}

/// Silently recode until none of `enzymes` (forward strand) remains.
///
/// Fails when a recode cannot change the offending span or the retry budget
/// runs out.
pub fn remove_cutsites(
    seq: &Nucleotide,
    table: &CodonUsageTable,
    enzymes: &[String],
    policy: RetryPolicy,
    selector: &mut CodonSelector,
) -> Result<Nucleotide> {
    let sites: Vec<String> = enzymes
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    let mut current = seq.clone();
    let mut attempts = 0;

    loop {
        let Some((site, position)) = sites
            .iter()
            .find_map(|site| current.sequence().find(site.as_str()).map(|p| (site, p)))
        else {
            break;
        };

        let unresolvable = || SeqError::UnresolvableCutsite {
            pattern: site.clone(),
            position,
        };
        if attempts >= policy.max_attempts {
            return Err(unresolvable());
        }
        attempts += 1;

        let recoded = recode_sequence(
            &current,
            table,
            RecodeTarget::Pattern(site),
            SelectionMode::Stochastic,
            selector,
        )?;
        if recoded.sequence() == current.sequence() {
            return Err(unresolvable());
        }
        debug!(site = %site, position, attempts, "recoded cutsite");
        current = recoded;
    }

    Ok(current)
}

/// Wrap a sequence with the flanks of a GoldenGate part type.
pub fn make_part(
    seq: &Nucleotide,
    table: &CodonUsageTable,
    part_type: &str,
    catalog: &PartCatalog,
) -> Result<Nucleotide> {
    let part = catalog
        .get(part_type)
        .ok_or_else(|| SeqError::UnknownPartType(part_type.to_string()))?;

    let body = seq.sequence();
    let insert = if part.strip_stop
        && body.len() >= 3
        && translate_protein(seq, table)?.sequence().ends_with('*')
    {
        &body[..body.len() - 3]
    } else {
        body
    };

    Nucleotide::new(
        format!("part{}_{}", part_type, seq.id()),
        format!("{}{}{}", part.prefix, insert, part.suffix),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codon::test_tables::{ecoli, yeast};
    use crate::part::PartDefinition;
    use crate::search::default_restriction_enzymes;

    fn nuc(id: &str, seq: &str) -> Nucleotide {
        Nucleotide::new(id, seq).unwrap()
    }

    fn translated(seq: &Nucleotide) -> String {
        translate_protein(seq, &ecoli()).unwrap().sequence().to_string()
    }

    #[test]
    fn test_translate() {
        let table = ecoli();
        let protein = translate(&nuc("gene", "ATGAAATTTTAA"), &table, false)
            .unwrap()
            .into_protein()
            .unwrap();
        assert_eq!(protein.id(), "gene|PROT");
        assert_eq!(protein.sequence(), "MKF*");
    }

    #[test]
    fn test_translate_unknown_codons() {
        let table = ecoli();
        let protein = translate(&nuc("x", "ATGNNNAA"), &table, true)
            .unwrap()
            .into_protein()
            .unwrap();
        assert_eq!(protein.sequence(), "M??");
        let protein = translate_protein(&nuc("u", "ATGUUU"), &table).unwrap();
        assert_eq!(protein.sequence(), "M?");
    }

    #[test]
    fn test_translate_skips_non_cds() {
        let table = ecoli();
        let seq = nuc("promoter", "TTGACAAT");
        let out = translate(&seq, &table, false).unwrap();
        assert_eq!(out, SequenceRecord::Nucleotide(seq));

        let forced = nuc("promoter FORCED", "TTGACA");
        let out = translate(&forced, &table, false).unwrap().into_protein().unwrap();
        assert_eq!(out.sequence(), "LT");
    }

    #[test]
    fn test_check_cds() {
        let table = ecoli();
        assert!(check_cds(&nuc("a", "ATGAAATAA"), &table).unwrap());
        assert!(!check_cds(&nuc("b", "ATGTAAAAA"), &table).unwrap());
        assert!(!check_cds(&nuc("c", "ATGTAATAA"), &table).unwrap());
        assert!(!check_cds(&nuc("d", "ATGAAA"), &table).unwrap());
    }

    #[test]
    fn test_reverse_translate_maximum() {
        let table = ecoli();
        let mut selector = CodonSelector::seeded(3);
        let protein = Protein::new("p", "MKLX*").unwrap();
        let dna = reverse_translate(&protein, &table, SelectionMode::Maximum, &mut selector).unwrap();
        assert_eq!(dna.id(), "p|NUC-MAX");
        assert_eq!(dna.sequence(), "ATGAAACTGNNNTAA");
    }

    #[test]
    fn test_reverse_translate_stochastic_tag() {
        let table = ecoli();
        let mut selector = CodonSelector::seeded(3);
        let protein = Protein::new("p", "MW?").unwrap();
        let dna =
            reverse_translate(&protein, &table, SelectionMode::Stochastic, &mut selector).unwrap();
        assert_eq!(dna.id(), "p|NUC");
        assert_eq!(dna.sequence(), "ATGTGGNNN");
    }

    #[test]
    fn test_optimize_preserves_protein() {
        let table = ecoli();
        let mut selector = CodonSelector::seeded(11);
        let seq = nuc("gene", "ATGTTATCGAGAGGGCCCTAA");
        let optimized =
            optimize_codon_usage(&seq, &table, SelectionMode::Stochastic, &mut selector).unwrap();
        assert_eq!(optimized.id(), "gene|OPT");
        assert_eq!(optimized.len(), seq.len());
        assert_eq!(translated(&optimized), translated(&seq));

        let maximum =
            optimize_codon_usage(&seq, &table, SelectionMode::Maximum, &mut selector).unwrap();
        assert_eq!(maximum.sequence(), "ATGCTGAGCCGCGGCCCGTAA");
    }

    #[test]
    fn test_optimize_non_cds_is_noop() {
        let table = ecoli();
        let mut selector = CodonSelector::seeded(11);
        let seq = nuc("frag", "TTATCGA");
        let out = optimize_codon_usage(&seq, &table, SelectionMode::Maximum, &mut selector).unwrap();
        assert_eq!(out, seq);
    }

    #[test]
    fn test_harmonize_same_table_is_identity() {
        let table = ecoli();
        let mut selector = CodonSelector::seeded(5);
        let protein = Protein::new("p", "MSTARLKGGEDVWYFHQNCIPLLKR*").unwrap();
        let seq = reverse_translate(&protein, &table, SelectionMode::Stochastic, &mut selector)
            .unwrap();
        for mode in [0, 1] {
            let harmonized = harmonize(&seq, &table, &table, mode).unwrap();
            assert_eq!(harmonized.sequence(), seq.sequence());
            assert_eq!(harmonized.id(), format!("{}|HARM{}", seq.id(), mode));
        }
    }

    #[test]
    fn test_harmonize_between_organisms() {
        let target = ecoli();
        let source = yeast();
        let seq = nuc("gene", "ATGTTGTAA");
        assert_eq!(harmonize(&seq, &target, &source, 0).unwrap().sequence(), "ATGTTATAA");
        assert_eq!(harmonize(&seq, &target, &source, 1).unwrap().sequence(), "ATGCTGTAA");
    }

    #[test]
    fn test_same_rank_ties_take_first_triplet() {
        let mut counts = [10u64; 64];
        // Cysteine unobserved in the target: TGC and TGT tie at 0.5
        counts[52] = 0;
        counts[53] = 0;
        let target = CodonUsageTable::from_counts("1", "tied", &counts).unwrap();
        let source = ecoli();
        for codon in ["TGC", "TGT"] {
            let seq = nuc("gene", &format!("ATG{codon}TAA"));
            let out = harmonize(&seq, &target, &source, 1).unwrap();
            assert_eq!(&out.sequence()[3..6], "TGC");
        }
    }

    #[test]
    fn test_harmonize_invalid_mode() {
        let table = ecoli();
        let err = harmonize(&nuc("g", "ATGTAA"), &table, &table, 2).unwrap_err();
        assert!(matches!(err, SeqError::InvalidMode(2)));
    }

    #[test]
    fn test_harmonize_keeps_unknown_codons() {
        let table = ecoli();
        let out = harmonize(&nuc("g", "ATGNNNTAA"), &table, &yeast(), 0).unwrap();
        assert_eq!(&out.sequence()[3..6], "NNN");
    }

    #[test]
    fn test_recode_pattern() {
        let table = ecoli();
        let mut selector = CodonSelector::seeded(21);
        let seq = nuc("gene", "ATGGGTCTCAAA");
        let recoded = recode_sequence(
            &seq,
            &table,
            RecodeTarget::Pattern("GGTCTC"),
            SelectionMode::Stochastic,
            &mut selector,
        )
        .unwrap();
        let body = recoded.sequence();
        assert_eq!(recoded.id(), "gene|REC");
        assert_eq!(&body[..3], "ATG");
        assert_ne!(&body[3..6], "GGT");
        assert_ne!(&body[6..9], "CTC");
        assert_eq!(&body[9..], "AAA");
        assert_eq!(translated(&recoded), translated(&seq));
    }

    #[test]
    fn test_recode_missing_pattern_is_noop() {
        let table = ecoli();
        let mut selector = CodonSelector::seeded(21);
        let seq = nuc("gene", "ATGAAA");
        let out = recode_sequence(
            &seq,
            &table,
            RecodeTarget::Pattern("GGTCTC"),
            SelectionMode::Stochastic,
            &mut selector,
        )
        .unwrap();
        assert_eq!(out, seq);
    }

    #[test]
    fn test_recode_range_expands_to_codons() {
        let table = ecoli();
        let mut selector = CodonSelector::seeded(8);
        let seq = nuc("gene", "ATGCTGCTGCTG");
        let out = recode_sequence(
            &seq,
            &table,
            RecodeTarget::Range(4, 5),
            SelectionMode::Maximum,
            &mut selector,
        )
        .unwrap();
        assert_eq!(out.sequence(), "ATGTTACTGCTG");
    }

    #[test]
    fn test_recode_tags_once_and_skips_fixed_codons() {
        let table = ecoli();
        let mut selector = CodonSelector::seeded(8);
        let seq = nuc("gene", "ATGTGG");
        let once = recode_sequence(
            &seq,
            &table,
            RecodeTarget::Range(0, 6),
            SelectionMode::Stochastic,
            &mut selector,
        )
        .unwrap();
        let twice = recode_sequence(
            &once,
            &table,
            RecodeTarget::Range(0, 6),
            SelectionMode::Stochastic,
            &mut selector,
        )
        .unwrap();
        assert_eq!(twice.id(), "gene|REC");
        assert_eq!(twice.sequence(), "ATGTGG");
    }

    #[test]
    fn test_remove_cutsites() {
        let table = ecoli();
        let enzymes = default_restriction_enzymes();
        let seq = nuc("gene", "ATGGGTCTCAAAGAGACCGCGGCCGCCTCGAGTAA");
        for seed in 0..20 {
            let mut selector = CodonSelector::seeded(seed);
            let clean =
                remove_cutsites(&seq, &table, &enzymes, RetryPolicy::default(), &mut selector)
                    .unwrap();
            for site in &enzymes {
                assert!(!clean.sequence().contains(site.as_str()), "{} left in", site);
            }
            assert_eq!(clean.len(), seq.len());
            assert_eq!(translated(&clean), translated(&seq));
        }
    }

    #[test]
    fn test_remove_cutsites_unresolvable() {
        let table = ecoli();
        let mut selector = CodonSelector::seeded(1);
        let err = remove_cutsites(
            &nuc("gene", "ATGTGGTAA"),
            &table,
            &["ATGTGG".to_string()],
            RetryPolicy::default(),
            &mut selector,
        )
        .unwrap_err();
        assert!(matches!(err, SeqError::UnresolvableCutsite { position: 0, .. }));
    }

    #[test]
    fn test_remove_cutsites_exhausts_budget() {
        let table = ecoli();
        let mut selector = CodonSelector::seeded(1);
        let err = remove_cutsites(
            &nuc("gene", "ATGGGTCTCTAA"),
            &table,
            &["GGTCTC".to_string()],
            RetryPolicy { max_attempts: 0 },
            &mut selector,
        )
        .unwrap_err();
        assert!(matches!(err, SeqError::UnresolvableCutsite { position: 3, .. }));
    }

    fn catalog() -> PartCatalog {
        PartCatalog::new([
            PartDefinition::new("3", "GGTCTCAT", "GGATCC", "CDS, no stop", true),
            PartDefinition::new("3t", "GGTCTCAT", "ATCC", "CDS with stop", false),
        ])
    }

    #[test]
    fn test_make_part_strips_stop() {
        let table = ecoli();
        let part = make_part(&nuc("gene", "ATGAAATAA"), &table, "3", &catalog()).unwrap();
        assert_eq!(part.id(), "part3_gene");
        assert_eq!(part.sequence(), "GGTCTCATATGAAAGGATCC");
    }

    #[test]
    fn test_make_part_keeps_stop_for_other_types() {
        let table = ecoli();
        let part = make_part(&nuc("gene", "ATGAAATAA"), &table, "3t", &catalog()).unwrap();
        assert_eq!(part.sequence(), "GGTCTCATATGAAATAAATCC");
        let no_stop = make_part(&nuc("gene", "ATGAAA"), &table, "3", &catalog()).unwrap();
        assert_eq!(no_stop.sequence(), "GGTCTCATATGAAAGGATCC");
    }

    #[test]
    fn test_make_part_unknown_type() {
        let err = make_part(&nuc("gene", "ATG"), &ecoli(), "9z", &catalog()).unwrap_err();
        assert!(matches!(err, SeqError::UnknownPartType(t) if t == "9z"));
    }
}
