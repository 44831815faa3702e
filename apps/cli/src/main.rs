//! seqforge - codon usage engine
//!
//! ## Usage
//!
//! ```bash
//! seqforge optimize --organism ecoli gene.fasta
//! seqforge reverse-translate --organism yali --part 3a protein.fasta
//! seqforge harmonize --target ecoli --source yeast --mode 1 gene.fasta
//! seqforge generate --length 2000 --avoid-sites
//! ```
//!
//! Sequence input is FASTA or plain sequence text; `-` reads stdin.
//! Results go to stdout unless `-o/--output` is given.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use seqforge_cli::commands::dna::PartOptions;
use seqforge_cli::commands::{catalog, dna, generator, parts, protein};
use seqforge_cli::config::{EngineConfig, DEFAULT_CONFIG_FILE};
use seqforge_cli::dto::ProfileKind;
use seqforge_cli::Engine;
use seqforge_core::{PartDefinition, SequenceRecord};
use seqforge_formats::{fasta, parse_nucleotide_input, parse_protein_input};

/// Codon usage optimization, harmonization and GoldenGate part design
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML); defaults apply when it does not exist
    #[arg(short = 'c', long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log filter, e.g. "info" or "seqforge_core=debug"
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Fixed RNG seed (overrides the configuration)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Write results to this file instead of stdout
    #[arg(short = 'o', long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Cutsite removal and part wrapping after the main operation
#[derive(Args, Debug)]
struct PartArgs {
    /// Remove the configured restriction sites
    #[arg(long)]
    remove_cutsites: bool,

    /// Wrap the result as a part of this type (implies --remove-cutsites)
    #[arg(long = "part")]
    part_type: Option<String>,
}

impl From<PartArgs> for PartOptions {
    fn from(args: PartArgs) -> Self {
        PartOptions {
            remove_cutsites: args.remove_cutsites,
            part_type: args.part_type,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProfileArg {
    /// %MinMax score per window
    Minmax,
    /// Mean relative codon fraction per window
    Fraction,
}

impl From<ProfileArg> for ProfileKind {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Minmax => ProfileKind::MinMax,
            ProfileArg::Fraction => ProfileKind::Fraction,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate nucleotide sequences to protein
    Translate {
        input: PathBuf,
        #[arg(long, default_value = "ecoli")]
        organism: String,
        /// Pass records that are not a complete CDS through unchanged
        #[arg(long)]
        cds_only: bool,
    },
    /// Back-translate proteins using an organism's codon usage
    ReverseTranslate {
        input: PathBuf,
        #[arg(long, default_value = "ecoli")]
        organism: String,
        /// Always pick the most frequent codon
        #[arg(long)]
        maximize: bool,
        #[command(flatten)]
        part: PartArgs,
    },
    /// Recode coding sequences for an organism
    Optimize {
        input: PathBuf,
        #[arg(long, default_value = "ecoli")]
        organism: String,
        #[arg(long)]
        maximize: bool,
        /// Raise every %MinMax window to the configured threshold afterwards
        #[arg(long)]
        min_optimize: bool,
        /// Override the %MinMax threshold
        #[arg(long)]
        threshold: Option<f64>,
        #[command(flatten)]
        part: PartArgs,
    },
    /// Carry codon usage from a source organism over to a target organism
    Harmonize {
        input: PathBuf,
        #[arg(long)]
        target: String,
        #[arg(long)]
        source: String,
        /// 0 picks the nearest relative fraction, 1 keeps the frequency rank
        #[arg(long, default_value_t = 0)]
        mode: u8,
        #[command(flatten)]
        part: PartArgs,
    },
    /// Recode restriction sites out of sequences
    RemoveCutsites {
        input: PathBuf,
        #[arg(long, default_value = "ecoli")]
        organism: String,
        #[arg(long = "part")]
        part_type: Option<String>,
    },
    /// Add part flanks around sequences as they are
    MakePart {
        input: PathBuf,
        #[arg(long, default_value = "ecoli")]
        organism: String,
        #[arg(long = "part")]
        part_type: String,
    },
    /// Reverse complement nucleotide sequences
    Revcomp { input: PathBuf },
    /// GC content, melting temperature, repeats and cutsites as JSON
    Stats {
        input: PathBuf,
        #[arg(long, default_value = "ecoli")]
        organism: String,
        /// Report k-mers seen more often than this
        #[arg(long, default_value_t = 1)]
        kmer_threshold: usize,
        #[arg(long, default_value_t = 8)]
        kmer_length: usize,
    },
    /// Sliding-window codon usage profile as JSON
    Profile {
        input: PathBuf,
        #[arg(long, default_value = "ecoli")]
        organism: String,
        #[arg(long, value_enum, default_value = "minmax")]
        kind: ProfileArg,
        /// Window size in codons (default: configured window)
        #[arg(long)]
        window: Option<usize>,
    },
    /// Generate random DNA under sequence constraints
    Generate {
        #[arg(long)]
        length: Option<usize>,
        /// Longest allowed single-base run
        #[arg(long)]
        homopolymer_limit: Option<usize>,
        /// Run of G/C bases that must not be reached
        #[arg(long)]
        gc_stretch_limit: Option<usize>,
        /// Every chunk's GC ratio must exceed this
        #[arg(long)]
        max_gc_ratio: Option<f64>,
        /// Also avoid the configured restriction sites
        #[arg(long)]
        avoid_sites: bool,
        #[arg(long, default_value = "random_dna")]
        id: String,
    },
    /// List organisms with codon tables
    Organisms,
    /// Count codons over CDS records and append a custom codon table
    BuildTable {
        input: PathBuf,
        #[arg(long)]
        taxid: String,
        #[arg(long)]
        name: String,
        /// Catalog to append to (default: configured custom catalog)
        #[arg(long)]
        into: Option<PathBuf>,
    },
    /// Manage the part type library
    Parts {
        #[command(subcommand)]
        action: PartsCommand,
    },
    /// Write a configuration file with all defaults
    Config,
}

#[derive(Subcommand, Debug)]
enum PartsCommand {
    List,
    Search {
        query: String,
    },
    Add {
        part_type: String,
        prefix: String,
        suffix: String,
        #[arg(long, default_value = "")]
        info: String,
        /// Drop the insert's stop codon when wrapping
        #[arg(long)]
        strip_stop: bool,
    },
    Remove {
        part_type: String,
    },
    /// Custom part types as JSON
    Export,
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid log level '{}'", level))?;

    // stdout carries results
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn emit(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let output = cli.output.as_deref();

    let mut config = EngineConfig::load_or_default(&cli.config)?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    match cli.command {
        Command::Translate {
            input,
            organism,
            cds_only,
        } => {
            let engine = Engine::new(config);
            let table = engine.table(&organism)?;
            let sequences = parse_nucleotide_input(&read_input(&input)?)?;
            let records = dna::translate(&table, &sequences, cds_only)?;
            emit(output, &fasta::serialize(records.iter().map(SequenceRecord::as_entity)))?;
        }
        Command::ReverseTranslate {
            input,
            organism,
            maximize,
            part,
        } => {
            let mut engine = Engine::new(config);
            let table = engine.table(&organism)?;
            let proteins = parse_protein_input(&read_input(&input)?)?;
            let out =
                protein::reverse_translate_all(&mut engine, &table, &proteins, maximize, &part.into())?;
            emit(output, &fasta::serialize(&out))?;
        }
        Command::Optimize {
            input,
            organism,
            maximize,
            min_optimize,
            threshold,
            part,
        } => {
            if let Some(threshold) = threshold {
                config.optimization.threshold = threshold;
            }
            let mut engine = Engine::new(config);
            let table = engine.table(&organism)?;
            let sequences = parse_nucleotide_input(&read_input(&input)?)?;
            let out = dna::optimize(
                &mut engine,
                &table,
                &sequences,
                maximize,
                min_optimize,
                &part.into(),
            )?;
            emit(output, &fasta::serialize(&out))?;
        }
        Command::Harmonize {
            input,
            target,
            source,
            mode,
            part,
        } => {
            let mut engine = Engine::new(config);
            let target = engine.table(&target)?;
            let source = engine.table(&source)?;
            let sequences = parse_nucleotide_input(&read_input(&input)?)?;
            let out = dna::harmonize(&mut engine, &target, &source, &sequences, mode, &part.into())?;
            emit(output, &fasta::serialize(&out))?;
        }
        Command::RemoveCutsites {
            input,
            organism,
            part_type,
        } => {
            let mut engine = Engine::new(config);
            let table = engine.table(&organism)?;
            let sequences = parse_nucleotide_input(&read_input(&input)?)?;
            let out = dna::remove_cutsites(&mut engine, &table, &sequences, part_type)?;
            emit(output, &fasta::serialize(&out))?;
        }
        Command::MakePart {
            input,
            organism,
            part_type,
        } => {
            let engine = Engine::new(config);
            let table = engine.table(&organism)?;
            let sequences = parse_nucleotide_input(&read_input(&input)?)?;
            let out = dna::make_part(&engine, &table, &sequences, &part_type)?;
            emit(output, &fasta::serialize(&out))?;
        }
        Command::Revcomp { input } => {
            let sequences = parse_nucleotide_input(&read_input(&input)?)?;
            emit(output, &fasta::serialize(&dna::reverse_complement(&sequences)?))?;
        }
        Command::Stats {
            input,
            organism,
            kmer_threshold,
            kmer_length,
        } => {
            let engine = Engine::new(config);
            let table = engine.table(&organism)?;
            let sequences = parse_nucleotide_input(&read_input(&input)?)?;
            let enzymes = &engine.config.optimization.restriction_enzymes;
            let stats = dna::stats(&table, &sequences, enzymes, kmer_threshold, kmer_length)?;
            emit(output, &to_json(&stats)?)?;
        }
        Command::Profile {
            input,
            organism,
            kind,
            window,
        } => {
            let window = window.unwrap_or(config.optimization.window);
            let engine = Engine::new(config);
            let table = engine.table(&organism)?;
            let sequences = parse_nucleotide_input(&read_input(&input)?)?;
            let profiles = dna::profile(&table, &sequences, kind.into(), window)?;
            emit(output, &to_json(&profiles)?)?;
        }
        Command::Generate {
            length,
            homopolymer_limit,
            gc_stretch_limit,
            max_gc_ratio,
            avoid_sites,
            id,
        } => {
            let mut settings = config.generator.clone();
            if let Some(length) = length {
                settings.length = length;
            }
            if let Some(limit) = homopolymer_limit {
                settings.homopolymer_limit = limit;
            }
            if let Some(limit) = gc_stretch_limit {
                settings.gc_stretch_limit = limit;
            }
            if max_gc_ratio.is_some() {
                settings.max_gc_ratio = max_gc_ratio;
            }
            if avoid_sites {
                settings.restriction_enzymes = config.optimization.restriction_enzymes.clone();
            }

            let mut engine = Engine::new(config);
            let dna = generator::random_dna(&mut engine, &settings, &id)?;
            emit(output, &fasta::serialize([&dna]))?;
        }
        Command::Organisms => {
            let engine = Engine::new(config);
            emit(output, &to_json(&catalog::organisms(&engine)?)?)?;
        }
        Command::BuildTable {
            input,
            taxid,
            name,
            into,
        } => {
            let target = into.unwrap_or_else(|| config.catalog.custom_path.clone());
            let report = catalog::build_table(&read_input(&input)?, &taxid, &name, &target)?;
            eprintln!(
                "Added {} ({}) to {}: {} genes used, {} partial skipped",
                taxid,
                name,
                target.display(),
                report.genes_used,
                report.partial.len()
            );
        }
        Command::Parts { action } => {
            let engine = Engine::new(config);
            match action {
                PartsCommand::List => emit(output, &to_json(&parts::list(&engine)?)?)?,
                PartsCommand::Search { query } => {
                    emit(output, &to_json(&parts::search(&engine, &query)?)?)?
                }
                PartsCommand::Add {
                    part_type,
                    prefix,
                    suffix,
                    info,
                    strip_stop,
                } => {
                    let definition = PartDefinition::new(part_type, prefix, suffix, info, strip_stop);
                    parts::add(&engine, &definition)?;
                    eprintln!("Added part type {}", definition.part_type);
                }
                PartsCommand::Remove { part_type } => {
                    if !parts::remove(&engine, &part_type)? {
                        bail!("No custom part type '{}'", part_type);
                    }
                    eprintln!("Removed part type {}", part_type);
                }
                PartsCommand::Export => {
                    let mut json = parts::export(&engine)?;
                    json.push('\n');
                    emit(output, &json)?;
                }
            }
        }
        Command::Config => {
            let path = output.unwrap_or(cli.config.as_path());
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            EngineConfig::default().to_file(path)?;
            eprintln!("Wrote default configuration to {}", path.display());
        }
    }

    Ok(())
}
