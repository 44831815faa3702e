use seqforge_core::{PartCatalog, PartDefinition};

/// GoldenGate part types, one row per type.
const PARTS_CSV: &str = include_str!("../data/parts.csv");

/// Parse the embedded CSV.
///
/// CSV columns: part_type, prefix, suffix, strip_stop, info
pub fn builtin_parts() -> Vec<PartDefinition> {
    let mut parts = Vec::new();

    for line in PARTS_CSV.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields = parse_csv_line(line);
        if fields.len() < 5 || fields[0].is_empty() {
            continue;
        }

        parts.push(PartDefinition::new(
            fields[0].as_str(),
            fields[1].as_str(),
            fields[2].as_str(),
            fields[4].as_str(),
            fields[3] == "1",
        ));
    }

    parts
}

pub fn builtin_catalog() -> PartCatalog {
    PartCatalog::new(builtin_parts())
}

/// Simple CSV line parser that handles quoted fields.
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match (in_quotes, ch) {
            (true, '"') if chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            (true, '"') => in_quotes = false,
            (false, '"') => in_quotes = true,
            (false, ',') => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}
