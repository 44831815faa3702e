use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Flanking sequences that turn an insert into a GoldenGate assembly part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDefinition {
    /// Short type code, e.g. "3t" or "4a".
    pub part_type: String,
    pub prefix: String,
    pub suffix: String,
    #[serde(default)]
    pub info: String,
    /// CDS-class part types drop the insert's terminal stop codon before wrapping.
    #[serde(default)]
    pub strip_stop: bool,
}

impl PartDefinition {
    pub fn new(
        part_type: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        info: impl Into<String>,
        strip_stop: bool,
    ) -> Self {
        Self {
            part_type: part_type.into(),
            prefix: prefix.into().to_uppercase(),
            suffix: suffix.into().to_uppercase(),
            info: info.into(),
            strip_stop,
        }
    }
}

/// Part types available to [`crate::transform::make_part`], keyed by type code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartCatalog {
    parts: BTreeMap<String, PartDefinition>,
}

impl PartCatalog {
    pub fn new(parts: impl IntoIterator<Item = PartDefinition>) -> Self {
        let mut catalog = Self::default();
        for part in parts {
            catalog.insert(part);
        }
        catalog
    }

    /// Add or replace a part type.
    pub fn insert(&mut self, part: PartDefinition) {
        self.parts.insert(part.part_type.clone(), part);
    }

    pub fn get(&self, part_type: &str) -> Option<&PartDefinition> {
        self.parts.get(part_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartDefinition> {
        self.parts.values()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
