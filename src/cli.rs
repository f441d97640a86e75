use crate::utils::Result;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="strtyper",
          version=&**FULL_VERSION,
          about="Tandem repeat genotyping from long-read allele measurements",
          long_about = None,
          disable_help_subcommand = true,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Tandem Repeat Allele Genotyper")]
    Genotype(GenotypeArgs),
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("genotype")))]
#[command(arg_required_else_help(true))]
pub struct GenotypeArgs {
    #[clap(required = true)]
    #[clap(short = 'a')]
    #[clap(long = "alleles")]
    #[clap(help = "Per-read allele table (TSV, optionally gzipped)")]
    #[clap(value_name = "ALLELES")]
    #[arg(value_parser = check_file_exists)]
    pub alleles_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(help = "Prefix for output files")]
    #[clap(value_name = "OUTPUT_PREFIX")]
    #[arg(value_parser = check_prefix_path)]
    pub output_prefix: String,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(long = "genotype-in-size")]
    #[clap(help = "Report genotypes in size instead of copy numbers")]
    pub genotype_in_size: bool,

    #[clap(long = "min-expansion")]
    #[clap(value_name = "BASES")]
    #[clap(help = "Only report loci with reads expanded by at least this many bases")]
    pub min_expansion: Option<u32>,

    #[clap(long = "collapse-alleles")]
    #[clap(help = "Write one TSV row per locus instead of one per read")]
    pub collapse_alleles: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "min-support")]
    #[clap(value_name = "READS")]
    #[clap(help = "Minimum number of supporting reads for detecting expansion")]
    #[clap(default_value = "2")]
    #[arg(value_parser = at_least_one)]
    pub min_support: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "min-cluster-size")]
    #[clap(value_name = "READS")]
    #[clap(help = "Minimum number of supporting reads for allele clustering")]
    #[clap(default_value = "2")]
    #[arg(value_parser = at_least_one)]
    pub min_cluster_size: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "max-num-clusters")]
    #[clap(value_name = "CLUSTERS")]
    #[clap(help = "Maximum number of clusters to try")]
    #[clap(default_value = "2")]
    #[arg(value_parser = at_least_one)]
    pub max_num_clusters: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "eps")]
    #[clap(value_name = "BASES")]
    #[clap(help = "Cluster by distance: link sizes at most this many bases apart")]
    #[arg(value_parser = ensure_positive_float)]
    pub eps: Option<f64>,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn at_least_one(s: &str) -> Result<usize> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid count", s))?;
    if value >= 1 {
        Ok(value)
    } else {
        Err("The value must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn ensure_positive_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(format!("The value must be positive, got: {}", value))
    }
}
