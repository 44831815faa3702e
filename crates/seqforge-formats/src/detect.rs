use crate::FileFormat;

fn looks_like_catalog_header(line: &str) -> bool {
    match line.split_once(':') {
        Some((taxid, rest)) => {
            !taxid.is_empty() && taxid.bytes().all(|b| b.is_ascii_digit()) && rest.contains(':')
        }
        None => false,
    }
}

/// Auto-detect input format from content
pub fn detect_format(content: &str) -> FileFormat {
    let trimmed = content.trim_start();
    let first_line = trimmed.lines().next().unwrap_or_default();

    if trimmed.starts_with('>') {
        FileFormat::Fasta
    } else if looks_like_catalog_header(first_line) {
        FileFormat::Spsum
    } else if !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        FileFormat::Raw
    } else {
        FileFormat::Unknown
    }
}

/// Detect format from file extension
pub fn detect_format_from_extension(path: &str) -> FileFormat {
    let lower = path.to_lowercase();
    if lower.ends_with(".fa")
        || lower.ends_with(".fasta")
        || lower.ends_with(".fna")
        || lower.ends_with(".fsa")
        || lower.ends_with(".faa")
    {
        FileFormat::Fasta
    } else if lower.ends_with(".spsum") {
        FileFormat::Spsum
    } else if lower.ends_with(".txt") || lower.ends_with(".seq") {
        FileFormat::Raw
    } else {
        FileFormat::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_fasta() {
        assert_eq!(detect_format("\n>seq1\nATCGATCG"), FileFormat::Fasta);
    }

    #[test]
    fn test_detect_catalog() {
        assert_eq!(
            detect_format("4932:Saccharomyces cerevisiae: 2300\n3000 2600"),
            FileFormat::Spsum
        );
        assert_eq!(detect_format("abc:def: 1"), FileFormat::Unknown);
    }

    #[test]
    fn test_detect_raw_and_unknown() {
        assert_eq!(detect_format("ATGC\nAAA"), FileFormat::Raw);
        assert_eq!(detect_format(""), FileFormat::Unknown);
        assert_eq!(detect_format("{\"id\": 1}"), FileFormat::Unknown);
    }

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(detect_format_from_extension("genes.FNA"), FileFormat::Fasta);
        assert_eq!(detect_format_from_extension("custom.spsum"), FileFormat::Spsum);
        assert_eq!(detect_format_from_extension("plasmid.gb"), FileFormat::Unknown);
    }
}
