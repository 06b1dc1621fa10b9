mod config;
mod output;
mod prompt;
mod simulate;

use clap::Parser;
use pairsort_core::{deserialize, estimate_comparisons, ItemRegistry, SortMode, SortSession};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "pairsort", version, about = "Rank items by answering which-do-you-prefer questions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (default: ~/.config/pairsort/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Rank items interactively in the terminal
    Rank(RankArgs),
    /// Show the expected number of questions for every sort mode
    Estimate(ItemSource),
    /// Show a ranking from a share token or share link
    Decode(DecodeArgs),
    /// Run sessions against random hidden preferences and report question counts
    Simulate(SimulateArgs),
    /// Create a default config file at ~/.config/pairsort/config.toml
    Init,
}

#[derive(clap::Args)]
struct ItemSource {
    /// File with one item per line, or a JSON array of strings
    #[arg(long)]
    items: Option<PathBuf>,

    /// Inline item (repeatable)
    #[arg(long = "item")]
    inline_items: Vec<String>,
}

#[derive(clap::Args)]
struct RankArgs {
    #[command(flatten)]
    source: ItemSource,

    /// Sort mode: top-10, top-20, top-30, top-40, top-50 or full
    #[arg(long)]
    mode: Option<SortMode>,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct DecodeArgs {
    /// Share token, or a share link carrying it as ?r=<token>
    token: String,

    #[command(flatten)]
    source: ItemSource,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct SimulateArgs {
    /// Number of items per simulated session (at most 256)
    #[arg(long, default_value_t = 50)]
    count: usize,

    /// Sort mode: top-10, top-20, top-30, top-40, top-50 or full
    #[arg(long, default_value = "top-10")]
    mode: SortMode,

    /// Number of sessions to run
    #[arg(long, default_value_t = 100)]
    trials: usize,

    /// Probability that an item's hidden score ties an earlier item's (0.0 to 1.0)
    #[arg(long, default_value_t = 0.0)]
    tie_rate: f64,

    /// RNG seed for reproducible runs (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
}

/// Parse a string as either a JSON array of strings or plain text (one item per line).
fn parse_items_from_str(content: &str) -> Vec<String> {
    let trimmed = content.trim();
    if trimmed.starts_with('[') {
        let items: Vec<String> = serde_json::from_str(trimmed)
            .unwrap_or_else(|e| bail(format!("File looks like JSON but failed to parse: {e}")));
        items.into_iter().filter(|s| !s.trim().is_empty()).collect()
    } else {
        trimmed
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Load items from the --items file (or the config's items file) plus --item flags.
fn load_registry(source: &ItemSource, cfg: &config::PairsortConfig) -> Arc<ItemRegistry> {
    let mut items = Vec::new();

    if let Some(path) = source.items.as_ref().or(cfg.items.as_ref()) {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| bail(format!("Failed to read items file {}: {e}", path.display())));
        items = parse_items_from_str(&content);
    }

    items.extend(source.inline_items.iter().cloned());

    if items.is_empty() {
        bail("No items provided. Use --items <file>, --item <name>, or set items in the config file.");
    }

    let registry = ItemRegistry::from_entries(&items).unwrap_or_else(|e| bail(e));
    Arc::new(registry)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);

    match cli.command {
        Commands::Rank(args) => run_rank(args, &config::load_config(&config_path)),
        Commands::Estimate(source) => run_estimate(&source, &config::load_config(&config_path)),
        Commands::Decode(args) => run_decode(args, &config::load_config(&config_path)),
        Commands::Simulate(args) => run_simulate(args),
        Commands::Init => {
            let path = config::create_default_config();
            println!("Created config at {}", path.display());
            println!("Edit it to set your default mode, items file and share URL.");
        }
    }
}

fn run_rank(args: RankArgs, cfg: &config::PairsortConfig) {
    let mode = match (args.mode, cfg.mode.as_deref()) {
        (Some(mode), _) => mode,
        (None, Some(name)) => name
            .parse()
            .unwrap_or_else(|e| bail(format!("Invalid mode in config: {e}"))),
        (None, None) => SortMode::default(),
    };

    let registry = load_registry(&args.source, cfg);
    if !io::stdin().is_terminal() {
        tracing::warn!("stdin is not a terminal; reading answers from piped input");
    }

    let mut session = SortSession::with_mode(registry.clone(), mode).unwrap_or_else(|e| bail(e));
    eprintln!(
        "Ranking the top {} of {} items (~{} comparisons). Keys: {}",
        session.k(),
        registry.len(),
        session.estimated_comparisons(),
        prompt::KEY_HELP,
    );

    let stdin = io::stdin();
    let mut stderr = io::stderr();
    let ranking = match prompt::run_session(&mut session, stdin.lock(), &mut stderr) {
        Ok(Some(ranking)) => ranking,
        Ok(None) => {
            eprintln!("\nSession abandoned after {} comparisons.", session.comparisons());
            return;
        }
        Err(e) => bail(format!("Session failed: {e}")),
    };

    let token = pairsort_core::serialize_ranking(&ranking);
    if args.json {
        output::print_json(&ranking, session.comparisons(), &token, cfg.share_url.as_deref());
    } else {
        output::print_table(&ranking, Some(session.comparisons()), &token, cfg.share_url.as_deref());
    }
}

fn run_estimate(source: &ItemSource, cfg: &config::PairsortConfig) {
    let registry = load_registry(source, cfg);
    let n = registry.len();
    println!("{n} items");
    for mode in SortMode::presets() {
        let k = mode.resolve_k(n);
        println!("  {:<7} ~{} comparisons", mode.to_string(), estimate_comparisons(n, k));
    }
}

fn run_decode(args: DecodeArgs, cfg: &config::PairsortConfig) {
    let registry = load_registry(&args.source, cfg);
    let token = output::token_from_input(&args.token);

    let ranking = deserialize(token, &registry);
    if ranking.is_empty() {
        bail("No data: the token is malformed or names no known items.");
    }

    if args.json {
        output::print_json(&ranking, 0, token, cfg.share_url.as_deref());
    } else {
        output::print_table(&ranking, None, token, cfg.share_url.as_deref());
    }
}

fn run_simulate(args: SimulateArgs) {
    if args.count == 0 {
        bail("--count must be at least 1");
    }
    if !(0.0..=1.0).contains(&args.tie_rate) {
        bail(format!("--tie-rate must be between 0.0 and 1.0, got {}", args.tie_rate));
    }

    let seed = args.seed.unwrap_or_else(|| rand::random());
    tracing::debug!(seed, count = args.count, trials = args.trials, "starting simulation");

    let summary = simulate::run_simulation(args.count, args.mode, args.trials, args.tie_rate, seed);
    simulate::print_summary(&summary, args.count, args.mode, seed);
}
