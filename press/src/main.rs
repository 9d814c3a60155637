use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use cardstock::partition;
use clap::{Parser, Subcommand};
use press::{load_collection, read_selection, render_cards, write_selection, Config};
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info", global = true)]
    log_level: LevelFilter,
}

#[derive(Subcommand)]
enum Command {
    /// Partition the collection into the configured card groups
    Select {
        /// Path to the run configuration JSON file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Render one card per selected game, plus the shared card back
    Render {
        /// Path to the run configuration JSON file
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    match args.command {
        Command::Select { config } => run_select(&config),
        Command::Render { config } => run_render(&config),
    }
}

fn run_select(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    let pool = load_collection(&config.collection)?;
    info!(games = pool.len(), "collection loaded");

    let exclude: BTreeSet<u64> = config.exclude.iter().copied().collect();
    let groups = partition(pool, &config.groups, config.expansion_category, &exclude)?;
    for group in &groups {
        info!(
            group = %group.label,
            category = %group.category,
            games = group.games.len(),
            "group selected"
        );
    }

    write_selection(&config.selection_file, groups)?;
    info!(file = %config.selection_file.display(), "selection written");
    Ok(())
}

fn run_render(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    let collection = load_collection(&config.collection)?;
    let groups = read_selection(&config.selection_file)?;
    render_cards(&config, &groups, &collection)
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().event_format(format))
        .with(filter)
        .init();
}
