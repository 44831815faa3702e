/// Recognition sites avoided in assembly parts: BsaI, BsmBI (both orientations), NotI, XhoI, NdeI.
pub const DEFAULT_RESTRICTION_ENZYMES: [&str; 7] = [
    "GGTCTC", "GAGACC", "CGTCTC", "GAGACG", "GCGGCCGC", "CTCGAG", "CATATG",
];

pub fn default_restriction_enzymes() -> Vec<String> {
    DEFAULT_RESTRICTION_ENZYMES.iter().map(|s| s.to_string()).collect()
}

/// A match in the sequence
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SequenceMatch {
    pub start: usize,
    pub end: usize,
    pub matched: String,
}

/// Find exact, possibly overlapping, forward-strand matches (case-insensitive).
pub fn find_pattern(sequence: &str, pattern: &str) -> Vec<SequenceMatch> {
    let upper_seq = sequence.to_uppercase();
    let upper_pat = pattern.to_uppercase();

    if upper_pat.is_empty() || upper_seq.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    let mut pos = 0;
    while let Some(idx) = upper_seq[pos..].find(&upper_pat) {
        let abs_pos = pos + idx;
        matches.push(SequenceMatch {
            start: abs_pos,
            end: abs_pos + upper_pat.len(),
            matched: upper_pat.clone(),
        });
        pos = abs_pos + 1;
    }

    matches
}

/// All occurrences of any recognition site, ordered by position.
pub fn find_cutsites(sequence: &str, enzymes: &[String]) -> Vec<SequenceMatch> {
    let mut matches: Vec<SequenceMatch> = enzymes
        .iter()
        .flat_map(|site| find_pattern(sequence, site))
        .collect();
    matches.sort_by_key(|m| m.start);
    matches
}

pub fn contains_any(sequence: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .any(|p| !p.is_empty() && sequence.contains(p.as_str()))
}
