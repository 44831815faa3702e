use seqforge_core::PartDefinition;
use serde::{Deserialize, Serialize};

/// A part type as stored in the parts library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPart {
    /// Database primary key (assigned on insert).
    pub id: i64,
    pub part_type: String,
    pub prefix: String,
    pub suffix: String,
    pub info: Option<String>,
    pub strip_stop: bool,
    /// Shipped with the tool (true) or added by the user (false).
    pub is_builtin: bool,
}

impl StoredPart {
    pub fn custom(definition: PartDefinition) -> Self {
        Self {
            id: 0,
            part_type: definition.part_type,
            prefix: definition.prefix,
            suffix: definition.suffix,
            info: (!definition.info.is_empty()).then_some(definition.info),
            strip_stop: definition.strip_stop,
            is_builtin: false,
        }
    }

    pub fn definition(&self) -> PartDefinition {
        PartDefinition::new(
            self.part_type.clone(),
            self.prefix.clone(),
            self.suffix.clone(),
            self.info.clone().unwrap_or_default(),
            self.strip_stop,
        )
    }
}
