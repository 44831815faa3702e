pub mod commands;
pub mod config;
pub mod dto;

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use seqforge_core::{CodonSelector, CodonUsageTable, PartCatalog, SeqError};
use seqforge_formats::spsum::{load_codon_table, BUILTIN_CATALOG};
use seqforge_formats::ParseError;
use seqforge_parts::{db, seed_data};
use tracing::debug;

use crate::config::EngineConfig;

/// Configuration plus the random state shared by one invocation.
pub struct Engine {
    pub config: EngineConfig,
    pub selector: CodonSelector,
    pub rng: StdRng,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let (selector, rng) = match config.seed {
            Some(seed) => (CodonSelector::seeded(seed), StdRng::seed_from_u64(seed)),
            None => (CodonSelector::from_os_rng(), StdRng::from_os_rng()),
        };
        Self {
            config,
            selector,
            rng,
        }
    }

    /// Codon table for a taxonomy id or alias.
    ///
    /// The main catalog is searched first, then the custom catalog if present.
    pub fn table(&self, organism: &str) -> Result<CodonUsageTable> {
        let primary = match &self.config.catalog.path {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open catalog {}", path.display()))?;
                load_codon_table(BufReader::new(file), organism)
            }
            None => load_codon_table(BUILTIN_CATALOG.as_bytes(), organism),
        };

        match primary {
            Err(ParseError::Sequence(SeqError::OrganismNotFound(_)))
                if self.config.catalog.custom_path.exists() =>
            {
                let path = &self.config.catalog.custom_path;
                debug!("{} not in main catalog, trying {}", organism, path.display());
                let file = File::open(path)?;
                Ok(load_codon_table(BufReader::new(file), organism)?)
            }
            other => Ok(other?),
        }
    }

    /// Part types from the configured library, or the built-ins.
    pub fn part_catalog(&self) -> Result<PartCatalog> {
        match &self.config.parts.database {
            Some(path) => {
                let conn = db::open(path)
                    .with_context(|| format!("Failed to open parts library {}", path.display()))?;
                Ok(db::load_catalog(&conn)?)
            }
            None => Ok(seed_data::builtin_catalog()),
        }
    }
}
