//! `seqforge.toml` settings.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use seqforge_core::generator::GeneratorSettings;
use seqforge_core::minmax::{
    OptimizationSettings, DEFAULT_THRESHOLD, DEFAULT_WINDOW, MAX_OPTIMIZATION_ITERATIONS,
};
use seqforge_core::search::default_restriction_enzymes;
use seqforge_core::transform::RetryPolicy;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "seqforge.toml";

/// Main engine configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Fixed RNG seed for reproducible output; unset draws from the OS.
    pub seed: Option<u64>,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub parts: PartsConfig,
    #[serde(default)]
    pub optimization: OptimizationConfig,
    #[serde(default)]
    pub generator: GeneratorSettings,
}

/// Where codon usage tables come from
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// SPSUM catalog to read; the bundled catalog when unset.
    pub path: Option<PathBuf>,
    /// Catalog that `build-table` appends to, searched after `path`.
    pub custom_path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            custom_path: PathBuf::from("custom_table.spsum"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PartsConfig {
    /// SQLite parts library; only the built-in part types when unset.
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// %MinMax window in codons (default: 10)
    pub window: usize,
    /// Lowest acceptable %MinMax score (default: 20)
    pub threshold: f64,
    /// Local optimization rounds before giving up (default: 500)
    pub max_iterations: usize,
    /// Recode attempts for cutsite removal (default: 1000)
    pub cutsite_attempts: usize,
    /// Recognition sites removed from optimized sequences and parts
    pub restriction_enzymes: Vec<String>,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            threshold: DEFAULT_THRESHOLD,
            max_iterations: MAX_OPTIMIZATION_ITERATIONS,
            cutsite_attempts: RetryPolicy::default().max_attempts,
            restriction_enzymes: default_restriction_enzymes(),
        }
    }
}

impl OptimizationConfig {
    pub fn settings(&self) -> OptimizationSettings {
        OptimizationSettings {
            threshold: self.threshold,
            window: self.window,
            max_iterations: self.max_iterations,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.cutsite_attempts,
        }
    }
}

impl EngineConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The file at `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            Self::from_file(path)
        } else {
            info!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.optimization.window == 0 {
            bail!("optimization.window must be at least 1");
        }
        if self.optimization.max_iterations > MAX_OPTIMIZATION_ITERATIONS {
            bail!(
                "optimization.max_iterations must be at most {MAX_OPTIMIZATION_ITERATIONS}, got {}",
                self.optimization.max_iterations
            );
        }
        if self.generator.homopolymer_limit == 0 || self.generator.gc_stretch_limit == 0 {
            bail!("generator limits must be at least 1");
        }
        if let Some(ratio) = self.generator.max_gc_ratio {
            if !(0.0..1.0).contains(&ratio) {
                bail!("generator.max_gc_ratio must be in [0, 1), got {ratio}");
            }
        }
        Ok(())
    }
}
