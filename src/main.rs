use anyhow::Result;
use clap::{Parser, Subcommand};
use famdex::config::Config;
use famdex::load::{self, LoadMode};
use famdex::normalize::normalize;
use famdex::output;
use famdex::query::SearchEngine;
use famdex::tags::rank_tags;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "famdex")]
#[command(about = "Organize graphs into families, label them and search them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (also read from the CONF environment variable)
    #[arg(short = 'c', long)]
    conf: Option<PathBuf>,

    /// Data root holding the records
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Families file describing family metadata
    #[arg(short, long)]
    families: Option<PathBuf>,

    /// Index every image under the root and ignore records
    #[arg(short = 'a', long, overrides_with = "no_raw")]
    raw: bool,

    #[arg(long, overrides_with = "raw", hide = true)]
    no_raw: bool,

    /// Share of common words kept as tags
    #[arg(short, long)]
    keep: Option<f64>,

    /// Only count matches
    #[arg(short = 'H', long)]
    headless: bool,

    /// Log loading details
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search items; `inner | outer` also reports the share of `outer` matched
    Search {
        /// Free text, #keywords, -exclusions
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print autocomplete tags
    Tags {
        /// Share of common words kept
        #[arg(long)]
        keep: Option<f64>,
    },
    /// Print the family tree outline
    Map {
        /// List item titles under their family
        #[arg(short, long)]
        details: bool,
    },
    /// Write a families file skeleton from the loaded data
    ExportFamilies { file: PathBuf },
    /// Write the effective configuration
    ExportConf { file: PathBuf },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, then the configuration file, then flags
fn resolve_config(cli: &Cli) -> Config {
    let conf_file = cli
        .conf
        .clone()
        .or_else(|| std::env::var_os("CONF").map(PathBuf::from));

    let mut config = match conf_file {
        Some(path) => Config::load(&path),
        None => {
            info!("no configuration file provided");
            Config::default()
        }
    };

    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(families) = &cli.families {
        config.families = Some(families.clone());
    }
    if cli.raw {
        config.raw = true;
    }
    if cli.no_raw {
        config.raw = false;
    }
    if let Some(keep) = cli.keep {
        config.keep = keep;
    }
    config.headless |= cli.headless;
    config.verbose |= cli.verbose;
    config
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli);

    if let Commands::ExportConf { file } = &cli.command {
        return config.export(file);
    }

    let mode = if config.raw {
        LoadMode::Raw
    } else {
        LoadMode::Structured
    };
    let silent = matches!(cli.command, Commands::Search { json: true, .. })
        || !std::io::stderr().is_terminal();

    let mut tree = load::build_tree_with_progress(&config.root, mode, silent);
    if mode == LoadMode::Structured
        && let Some(families) = config.families_file()
    {
        load::load_family_metadata(&mut tree, &families);
    }

    if let Commands::ExportFamilies { file } = &cli.command {
        return load::export_families(&tree, file);
    }

    normalize(&mut tree);
    let color = std::io::stdout().is_terminal();

    match cli.command {
        Commands::Search { query, json } => {
            let engine = SearchEngine::new(tree);
            let result = engine.search_ratio(&query.join(" "), config.headless);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::print_results(&result, config.show_graph_numbers, color)?;
            }
        }
        Commands::Tags { keep } => {
            let tags = rank_tags(&tree, keep.unwrap_or(config.keep));
            output::print_tags(&tags, color)?;
        }
        Commands::Map { details } => {
            output::print_map(&tree.prettify(details))?;
        }
        Commands::ExportFamilies { .. } | Commands::ExportConf { .. } => {}
    }

    Ok(())
}
