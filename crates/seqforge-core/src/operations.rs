use std::collections::HashMap;

use crate::error::Result;
use crate::sequence::{Nucleotide, SequenceEntity};

/// Complement a single DNA base
pub fn complement_base(base: char) -> char {
    match base.to_ascii_uppercase() {
        'A' => 'T',
        'T' | 'U' => 'A',
        'G' => 'C',
        'C' => 'G',
        // S, W and N are their own complements
        other => other,
    }
}

/// Reverse complement of a DNA sequence
pub fn reverse_complement(seq: &str) -> String {
    seq.chars().rev().map(complement_base).collect()
}

/// Reverse complement as a new entity tagged `|REVC`.
pub fn reverse_complement_entity(seq: &Nucleotide) -> Result<Nucleotide> {
    Nucleotide::new(
        format!("{}|REVC", seq.id()),
        reverse_complement(seq.sequence()),
    )
}

/// Calculate GC content as a fraction (0.0 to 1.0)
pub fn gc_content(seq: &str) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let gc_count = seq
        .chars()
        .filter(|c| matches!(c.to_ascii_uppercase(), 'G' | 'C'))
        .count();
    gc_count as f64 / seq.len() as f64
}

/// Melting temperature by the Wallace rule: 2°C per weak base, 4°C per strong base.
///
/// Meant for primers of roughly 14-20 nt; characters other than A/T/W and
/// C/G/S are ignored.
pub fn melting_temperature(seq: &str) -> u32 {
    seq.chars()
        .map(|c| match c.to_ascii_uppercase() {
            'A' | 'T' | 'W' => 2,
            'C' | 'G' | 'S' => 4,
            _ => 0,
        })
        .sum()
}

/// k-mers of `length` that occur more than `threshold` times, most frequent first.
pub fn kmer_analysis(seq: &str, threshold: usize, length: usize) -> Vec<(String, usize)> {
    if length == 0 || seq.len() < length {
        return Vec::new();
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for i in 0..=seq.len() - length {
        *counts.entry(&seq[i..i + length]).or_default() += 1;
    }

    let mut repeated: Vec<(String, usize)> = counts
        .into_iter()
        .filter(|(_, n)| *n > threshold)
        .map(|(kmer, n)| (kmer.to_string(), n))
        .collect();
    repeated.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    repeated
}

/// Length of the longest run of one repeated character.
pub fn longest_homopolymer(seq: &str) -> usize {
    longest_run_by(seq, |a, b| a == b)
}

/// Length of the longest run of strong (G/C) or of weak (A/T) bases.
pub fn longest_strength_run(seq: &str) -> usize {
    let class = |c: u8| match c {
        b'G' | b'C' => Some(true),
        b'A' | b'T' => Some(false),
        _ => None,
    };
    longest_run_by(seq, |a, b| class(a).is_some() && class(a) == class(b))
}

fn longest_run_by(seq: &str, same: impl Fn(u8, u8) -> bool) -> usize {
    let bytes = seq.as_bytes();
    if bytes.is_empty() {
        return 0;
    }
    let mut longest = 1;
    let mut current = 1;
    for pair in bytes.windows(2) {
        if same(pair[0], pair[1]) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    longest
}

/// Replace bases at a range
pub fn replace_bases(seq: &str, start: usize, length: usize, replacement: &str) -> String {
    let start = start.min(seq.len());
    let end = (start + length).min(seq.len());
    let mut result = String::with_capacity(seq.len() - (end - start) + replacement.len());
    result.push_str(&seq[..start]);
    result.push_str(replacement);
    result.push_str(&seq[end..]);
    result
}
