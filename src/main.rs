use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use gtf_splice_graph::{
    read_abundance, AbundanceOptions, AnnotationBuilder, IdNameKeys, SpliceGraph,
    ANNOTATION_DATASET,
};

/// Build, extend, inspect or subset a splice graph.
#[derive(Parser, Debug)]
#[command(name = "gtf-splice-graph")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a graph from one GTF/GFF3 file and write it to disk
    Build(BuildArgs),

    /// Merge another GTF/GFF3 dataset into an existing graph
    Add(AddArgs),

    /// Load a graph from disk and print summary stats
    Stats(StatsArgs),

    /// Write the subgraph of a single gene
    Subset(SubsetArgs),
}

#[derive(Args, Debug)]
struct KeyArgs {
    /// Attribute keys to use for gene ID (repeatable).
    #[arg(
        long = "gene-id-key",
        value_name = "KEY",
        num_args = 1..,
        default_values_t = vec!["gene_id".to_string()]
    )]
    gene_id_keys: Vec<String>,

    /// Attribute keys to use for gene name (repeatable).
    #[arg(
        long = "gene-name-key",
        value_name = "KEY",
        num_args = 1..,
        default_values_t = vec!["gene_name".to_string(), "Name".to_string()]
    )]
    gene_name_keys: Vec<String>,

    /// Attribute keys to use for transcript ID (repeatable).
    #[arg(
        long = "transcript-id-key",
        value_name = "KEY",
        num_args = 1..,
        default_values_t = vec!["transcript_id".to_string()]
    )]
    transcript_id_keys: Vec<String>,

    /// GFF3 exon->transcript linkage keys (repeatable).
    #[arg(
        long = "parent-key",
        value_name = "KEY",
        num_args = 1..,
        default_values_t = vec!["Parent".to_string()]
    )]
    parent_keys: Vec<String>,

    /// Feature types that count as exon blocks (repeatable).
    #[arg(
        long = "exon-feature-type",
        value_name = "TYPE",
        num_args = 1..,
        default_values_t = vec!["exon".to_string()]
    )]
    exon_feature_types: Vec<String>,
}

impl KeyArgs {
    fn builder(self) -> AnnotationBuilder {
        AnnotationBuilder::with_keys(IdNameKeys {
            gene_id_keys: self.gene_id_keys,
            gene_name_keys: self.gene_name_keys,
            transcript_id_keys: self.transcript_id_keys,
            parent_keys: self.parent_keys,
            exon_feature_types: self.exon_feature_types,
        })
    }
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Input annotation file (.gtf/.gff3, optionally .gz)
    #[arg(long, short)]
    annotation: PathBuf,

    /// Dataset name for the input
    #[arg(long, short, default_value = ANNOTATION_DATASET)]
    dataset: String,

    /// Output graph file
    #[arg(long, short)]
    out: PathBuf,

    #[command(flatten)]
    keys: KeyArgs,
}

#[derive(Args, Debug)]
struct AddArgs {
    /// Existing graph file
    #[arg(long, short)]
    graph: PathBuf,

    /// GTF/GFF3 file of the new dataset
    #[arg(long)]
    gtf: PathBuf,

    /// Name of the new dataset
    #[arg(long, short)]
    dataset: String,

    /// Tab-separated abundance file for the new dataset
    #[arg(long)]
    abundance: Option<PathBuf>,

    /// Transcript id column of the abundance file
    #[arg(long, default_value = "annot_transcript_id")]
    tid_col: String,

    /// Count columns of the abundance file, summed per transcript (repeatable)
    #[arg(long = "count-col", value_name = "COLUMN", num_args = 1..)]
    count_cols: Vec<String>,

    /// Output graph file
    #[arg(long, short)]
    out: PathBuf,

    #[command(flatten)]
    keys: KeyArgs,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Serialized graph file
    #[arg(long, short)]
    graph: PathBuf,
}

#[derive(Args, Debug)]
struct SubsetArgs {
    /// Serialized graph file
    #[arg(long, short)]
    graph: PathBuf,

    /// Gene id to keep
    #[arg(long)]
    gene: String,

    /// Output graph file
    #[arg(long, short)]
    out: PathBuf,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Build(args) => {
            let records = args
                .keys
                .builder()
                .build_from_path(&args.annotation)?;

            let mut g = SpliceGraph::new();
            g.add_dataset(&args.dataset, records)
                .with_context(|| format!("building graph from {}", args.annotation.display()))?;

            println!("{g}");

            g.save(&args.out)
                .with_context(|| format!("writing graph to {}", args.out.display()))?;
        }

        Command::Add(args) => {
            let mut g = SpliceGraph::load(&args.graph)
                .with_context(|| format!("reading graph {}", args.graph.display()))?;

            let records = args.keys.builder().build_from_path(&args.gtf)?;
            g.add_dataset(&args.dataset, records)
                .with_context(|| format!("adding dataset '{}' from {}", args.dataset, args.gtf.display()))?;

            if let Some(path) = &args.abundance {
                let opts = AbundanceOptions {
                    tid_col: args.tid_col.clone(),
                    count_cols: args.count_cols.clone(),
                };
                let file = File::open(path)
                    .with_context(|| format!("open abundance file {}", path.display()))?;
                let table = read_abundance(BufReader::new(file), &opts)
                    .with_context(|| format!("reading abundance from {}", path.display()))?;
                info!("{} transcripts with abundance for '{}'", table.len(), args.dataset);
                g.attach_abundance(&args.dataset, table)?;
            }

            println!("{g}");

            g.save(&args.out)
                .with_context(|| format!("writing graph to {}", args.out.display()))?;
        }

        Command::Stats(args) => {
            let g = SpliceGraph::load(&args.graph)
                .with_context(|| format!("reading graph {}", args.graph.display()))?;
            println!("{g}");
        }

        Command::Subset(args) => {
            let g = SpliceGraph::load(&args.graph)
                .with_context(|| format!("reading graph {}", args.graph.display()))?;
            let sub = g.subset_on_gene(&args.gene)?;

            println!("{sub}");

            sub.save(&args.out)
                .with_context(|| format!("writing graph to {}", args.out.display()))?;
        }
    }

    Ok(())
}
