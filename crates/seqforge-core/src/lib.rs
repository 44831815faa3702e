pub mod codon;
pub mod error;
pub mod generator;
pub mod minmax;
pub mod operations;
pub mod part;
pub mod search;
pub mod selector;
pub mod sequence;
pub mod transform;

pub use codon::{CodonUsage, CodonUsageTable};
pub use error::{Result, SeqError};
pub use part::{PartCatalog, PartDefinition};
pub use selector::{CodonSelector, SelectionMode};
pub use sequence::*;
