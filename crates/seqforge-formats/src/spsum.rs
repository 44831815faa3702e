//! Codon usage catalogs in the SPSUM layout.
//!
//! Each organism takes two lines: a header `taxid:name: cds-count` and the
//! 64 codon counts in [`CATALOG_CODONS`] order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nom::bytes::complete::{take_till, take_till1};
use nom::character::complete::{char, space0, space1, u64 as count};
use nom::combinator::{all_consuming, opt};
use nom::multi::separated_list1;
use nom::sequence::{delimited, preceded};
use nom::IResult;
use seqforge_core::codon::CATALOG_CODONS;
use seqforge_core::{CodonUsageTable, SeqError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::fasta::FastaRecord;
use crate::ParseError;

/// Catalog shipped with the tool.
pub const BUILTIN_CATALOG: &str = include_str!("../data/codon_usage.spsum");

/// Short names accepted wherever a taxonomy id is expected.
pub const ORGANISM_ALIASES: [(&str, &str); 5] = [
    ("ecoli", "83333"),
    ("yeast", "4932"),
    ("human", "9606"),
    ("bsub", "1423"),
    ("yali", "284591"),
];

/// Below this many genes a custom table is unlikely to be representative.
const MIN_REPRESENTATIVE_GENES: usize = 100;

/// Map an alias to its taxonomy id; anything else passes through unchanged.
pub fn resolve_alias(organism: &str) -> &str {
    let key = organism.trim();
    ORGANISM_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(key))
        .map(|(_, taxid)| *taxid)
        .unwrap_or(key)
}

/// One organism's raw record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub taxid: String,
    pub name: String,
    /// Number of stop codons counted, which equals the number of CDS.
    pub stop_total: Option<u64>,
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganismSummary {
    pub taxid: String,
    pub name: String,
}

/// What [`CatalogEntry::from_cds_records`] left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CdsReport {
    pub genes_used: usize,
    /// Records whose length is not a whole number of codons.
    pub partial: Vec<String>,
    /// `(record id, codon)` pairs with characters other than A/C/G/T.
    pub skipped_codons: Vec<(String, String)>,
}

impl CatalogEntry {
    pub fn to_table(&self) -> Result<CodonUsageTable, SeqError> {
        CodonUsageTable::from_counts(&self.taxid, &self.name, &self.counts)
    }

    pub fn summary(&self) -> OrganismSummary {
        OrganismSummary {
            taxid: self.taxid.clone(),
            name: self.name.clone(),
        }
    }

    /// Count codons over a collection of coding sequences.
    ///
    /// RNA input is read as DNA. Records that are not a whole number of codons
    /// are skipped entirely; codons with ambiguous bases are dropped one by one.
    pub fn from_cds_records(
        taxid: impl Into<String>,
        name: impl Into<String>,
        records: &[FastaRecord],
    ) -> (Self, CdsReport) {
        let mut counts = vec![0u64; CATALOG_CODONS.len()];
        let mut report = CdsReport::default();

        for record in records {
            let sequence = record.sequence.to_uppercase().replace('U', "T");
            if sequence.len() % 3 != 0 {
                report.partial.push(record.id.clone());
                continue;
            }
            report.genes_used += 1;

            for codon in sequence.as_bytes().chunks(3) {
                let codon = String::from_utf8_lossy(codon);
                match CATALOG_CODONS.iter().position(|c| *c == codon) {
                    Some(slot) => counts[slot] += 1,
                    None => report
                        .skipped_codons
                        .push((record.id.clone(), codon.into_owned())),
                }
            }
        }

        if report.genes_used < MIN_REPRESENTATIVE_GENES {
            warn!(
                genes = report.genes_used,
                "fewer than {MIN_REPRESENTATIVE_GENES} genes in custom codon table"
            );
        }

        // TAA, TAG, TGA close the catalog order
        let stop_total = counts[61..].iter().sum();
        let entry = CatalogEntry {
            taxid: taxid.into(),
            name: name.into(),
            stop_total: Some(stop_total),
            counts,
        };
        (entry, report)
    }

    /// The two catalog lines for this entry.
    pub fn serialize(&self) -> String {
        let stop_total = self
            .stop_total
            .unwrap_or_else(|| self.counts.iter().skip(61).sum());
        let counts: Vec<String> = self.counts.iter().map(u64::to_string).collect();
        format!(
            "{}:{}: {}\n{}\n",
            self.taxid,
            self.name,
            stop_total,
            counts.join(" ")
        )
    }
}

fn header(input: &str) -> IResult<&str, (&str, &str, Option<u64>)> {
    let (input, taxid) = take_till1(|c: char| c == ':' || c.is_whitespace())(input)?;
    let (input, _) = char(':')(input)?;
    let (input, name) = take_till(|c: char| c == ':')(input)?;
    let (input, stop_total) = opt(preceded(char(':'), preceded(space0, count)))(input)?;
    let (input, _) = space0(input)?;
    Ok((input, (taxid, name.trim(), stop_total)))
}

fn counts(input: &str) -> IResult<&str, Vec<u64>> {
    delimited(space0, separated_list1(space1, count), space0)(input)
}

/// Streaming reader over catalog entries.
pub struct CatalogReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> CatalogReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    fn next_line(&mut self) -> Option<std::io::Result<String>> {
        self.line_no += 1;
        self.lines.next()
    }

    fn read_entry(&mut self, header_line: &str) -> Result<CatalogEntry, ParseError> {
        let header_no = self.line_no;
        let (_, (taxid, name, stop_total)) = all_consuming(header)(header_line.trim())
            .map_err(|_| {
                ParseError::InvalidFormat(format!(
                    "line {header_no}: expected `taxid:name: count` header"
                ))
            })?;

        let count_line = self.next_line().ok_or(ParseError::UnexpectedEnd)??;
        let count_no = self.line_no;
        let (_, values) = all_consuming(counts)(count_line.trim()).map_err(|_| {
            ParseError::InvalidFormat(format!("line {count_no}: expected codon counts"))
        })?;
        if values.len() != CATALOG_CODONS.len() {
            return Err(ParseError::InvalidFormat(format!(
                "line {count_no}: {} codon counts, expected {}",
                values.len(),
                CATALOG_CODONS.len()
            )));
        }

        Ok(CatalogEntry {
            taxid: taxid.to_string(),
            name: name.to_string(),
            stop_total,
            counts: values,
        })
    }
}

impl<R: BufRead> Iterator for CatalogReader<R> {
    type Item = Result<CatalogEntry, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.next_line()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            if !line.trim().is_empty() {
                return Some(self.read_entry(&line));
            }
        }
    }
}

pub fn open_catalog(path: impl AsRef<Path>) -> Result<CatalogReader<BufReader<File>>, ParseError> {
    let file = File::open(path)?;
    Ok(CatalogReader::new(BufReader::new(file)))
}

/// Build the table for `organism` (taxonomy id or alias), stopping at the first match.
pub fn load_codon_table<R: BufRead>(
    reader: R,
    organism: &str,
) -> Result<CodonUsageTable, ParseError> {
    let taxid = resolve_alias(organism);
    let mut scanned = 0usize;
    for entry in CatalogReader::new(reader) {
        let entry = entry?;
        scanned += 1;
        if entry.taxid == taxid {
            debug!(taxid, name = %entry.name, scanned, "codon table found");
            return Ok(entry.to_table()?);
        }
    }
    debug!(taxid, scanned, "codon table not found");
    Err(SeqError::OrganismNotFound(organism.to_string()).into())
}

/// Every organism in a catalog, in file order.
pub fn list_organisms<R: BufRead>(reader: R) -> Result<Vec<OrganismSummary>, ParseError> {
    CatalogReader::new(reader)
        .map(|entry| entry.map(|e| e.summary()))
        .collect()
}
