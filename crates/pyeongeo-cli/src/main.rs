//! pyeongeo CLI — browse the curriculum and generate 교과평어 sentences.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use pyeongeo_core::model::{Grade, SentenceCounts};

mod commands;
mod context;
mod output;

use context::AppContext;

#[derive(Parser)]
#[command(
    name = "pyeongeo",
    version,
    about = "Generate elementary school subject remarks (교과평어) from curriculum achievement levels"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the curriculum and guideline documents
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Generated sentence cache file
    #[arg(long, global = true)]
    cache_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively select standards, generate sentences and assemble a remark
    Session,

    /// List the subjects of a grade
    Subjects {
        /// Grade (1-6)
        #[arg(long)]
        grade: Grade,
    },

    /// List the domains of a subject
    Domains {
        #[arg(long)]
        grade: Grade,

        #[arg(long)]
        subject: String,
    },

    /// List the achievement standards of a domain
    Standards {
        #[arg(long)]
        grade: Grade,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        domain: String,

        /// Also show the 상/중/하 level descriptions
        #[arg(long)]
        levels: bool,
    },

    /// Generate sentences for one achievement standard
    Generate {
        #[arg(long)]
        grade: Grade,

        #[arg(long)]
        subject: String,

        /// Standard code, e.g. 4수01-01
        #[arg(long)]
        standard: String,

        /// Sentences for 상
        #[arg(long, default_value = "2")]
        high: u32,

        /// Sentences for 중
        #[arg(long, default_value = "2")]
        mid: u32,

        /// Sentences for 하
        #[arg(long, default_value = "2")]
        low: u32,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Use a canned offline reply; no API key needed, cache file untouched
        #[arg(long)]
        dry_run: bool,
    },

    /// Load every document and report problems
    Validate,

    /// Inspect the generated sentence cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// List models of the configured providers
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// Create a starter config file
    Init,
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached entries
    List,

    /// Show the sentences of one cache entry
    Show {
        /// Cache key, e.g. 3학년_수학_4수01-01_2_2_2
        key: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pyeongeo=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Init = cli.command {
        return commands::init::execute();
    }

    let ctx = AppContext::load(cli.config.as_deref(), cli.data_dir, cli.cache_file)?;

    match cli.command {
        Commands::Session => commands::session::execute(&ctx).await,
        Commands::Subjects { grade } => commands::browse::subjects(&ctx, grade),
        Commands::Domains { grade, subject } => commands::browse::domains(&ctx, grade, &subject),
        Commands::Standards {
            grade,
            subject,
            domain,
            levels,
        } => commands::browse::standards(&ctx, grade, &subject, &domain, levels),
        Commands::Generate {
            grade,
            subject,
            standard,
            high,
            mid,
            low,
            format,
            dry_run,
        } => {
            let counts = SentenceCounts::new(high, mid, low)?;
            commands::generate::execute(&ctx, grade, &subject, &standard, counts, format, dry_run)
                .await
        }
        Commands::Validate => commands::validate::execute(&ctx),
        Commands::Cache { action } => match action {
            CacheAction::List => commands::cache::list(&ctx),
            CacheAction::Show { key } => commands::cache::show(&ctx, &key),
        },
        Commands::ListModels { provider } => commands::list_models::execute(&ctx, provider),
        Commands::Init => commands::init::execute(),
    }
}
