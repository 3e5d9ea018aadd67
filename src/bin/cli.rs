//! link-nav command line
//!
//! Replays key presses and clicks against a page snapshot and manages the store of ignored
//! subreddits and counters.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use link_nav::dom::load_page;
use link_nav::store::{JsonFileBackend, normalize_sub};
use link_nav::{CommandRegistry, NavConfig, PageSession, Store};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "link-nav")]
#[command(version)]
#[command(about = "Keyboard navigation over post listings and comment trees", long_about = None)]
struct Cli {
    /// Store file holding ignored subreddits and counters
    #[arg(long, global = true, value_name = "PATH", default_value = "link-nav-store.json")]
    store: PathBuf,

    /// JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a page snapshot and replay input against it
    Replay {
        /// Page snapshot (JSON element tree)
        #[arg(long, value_name = "PATH")]
        page: PathBuf,

        /// Keys to press, in order (comma separated)
        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,

        /// Ids of elements to click before the keys are pressed
        #[arg(long, value_name = "ID")]
        click: Vec<String>,

        /// Write the resulting page snapshot here
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Manage ignored subreddits
    Ignored {
        #[command(subcommand)]
        action: IgnoredAction,
    },

    /// Show or clear counters
    Stats {
        #[command(subcommand)]
        action: StatsAction,
    },

    /// Send one JSON message to the store and print the response
    Message {
        /// e.g. '{"action": "getIgnoredSubs"}'
        json: String,
    },

    /// List available commands with their parameter schemas
    Commands,
}

#[derive(Subcommand)]
enum IgnoredAction {
    List,
    Add { name: String },
    Remove { name: String },
    /// Print the list as a JSON array
    Export,
    /// Replace the list with a JSON array or a newline separated file
    Import { file: PathBuf },
}

#[derive(Subcommand)]
enum StatsAction {
    Show,
    Reset,
    Clear { name: String },
}

fn open_store(path: &Path, config: &NavConfig) -> Result<Store> {
    Store::open(JsonFileBackend::new(path), config.flush_window_duration())
        .with_context(|| format!("failed to open store {}", path.display()))
}

fn replay(
    config: NavConfig,
    store: Store,
    page: &Path,
    clicks: &[String],
    keys: &[String],
    output: Option<&Path>,
) -> Result<()> {
    let tree = load_page(page, config.classifier.clone())
        .with_context(|| format!("failed to load page {}", page.display()))?;
    let mut session = PageSession::open(tree, store, config)?;
    eprintln!("View: {}", session.view().name());

    for id in clicks {
        let element = session
            .tree()
            .find_by_id(id)
            .with_context(|| format!("no element with id '{}'", id))?;
        let moved = session.handle_click(element);
        println!("{}", serde_json::json!({"click": id, "moved": moved, "selected": session.selected_id()}));
    }

    for key in keys {
        match session.handle_key(key)? {
            Some(result) => println!("{}", serde_json::json!({"key": key, "result": result})),
            None => println!("{}", serde_json::json!({"key": key, "result": null})),
        }
    }

    session.suspend()?;
    if let Some(output) = output {
        std::fs::write(output, session.snapshot_json()?)
            .with_context(|| format!("failed to write {}", output.display()))?;
        eprintln!("Snapshot written to {}", output.display());
    }
    Ok(())
}

fn ignored(store: &mut Store, action: IgnoredAction) -> Result<()> {
    match action {
        IgnoredAction::List => {
            for name in store.ignored_names() {
                println!("{}", name);
            }
        }
        IgnoredAction::Add { name } => {
            let name = normalize_sub(&name);
            if store.add_ignored(&name)? {
                eprintln!("Ignoring r/{}", name);
            } else {
                eprintln!("r/{} is already ignored", name);
            }
        }
        IgnoredAction::Remove { name } => {
            let name = normalize_sub(&name);
            if !store.remove_ignored(&name)? {
                eprintln!("r/{} was not ignored", name);
            }
        }
        IgnoredAction::Export => println!("{}", store.export_ignored()?),
        IgnoredAction::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let count = store.import_ignored(&text)?;
            eprintln!("Imported {} subreddits", count);
        }
    }
    Ok(())
}

fn stats(store: &mut Store, action: StatsAction) -> Result<()> {
    match action {
        StatsAction::Show => {
            for (name, count) in store.counters_by_count() {
                println!("{:>6}  {}", count, name);
            }
        }
        StatsAction::Reset => store.reset_counters()?,
        StatsAction::Clear { name } => {
            if !store.clear_counter(&name)? {
                eprintln!("No counter named {}", name);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NavConfig::from_file(path)?,
        None => NavConfig::default(),
    };

    match cli.command {
        Commands::Replay { page, keys, click, output } => {
            let store = open_store(&cli.store, &config)?;
            replay(config, store, &page, &click, &keys, output.as_deref())
        }
        Commands::Ignored { action } => ignored(&mut open_store(&cli.store, &config)?, action),
        Commands::Stats { action } => stats(&mut open_store(&cli.store, &config)?, action),
        Commands::Message { json } => {
            let mut store = open_store(&cli.store, &config)?;
            let response = store.handle_json(&json);
            store.flush_pending()?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Commands::Commands => {
            let registry = CommandRegistry::with_defaults();
            println!("{}", serde_json::to_string_pretty(&registry.describe())?);
            Ok(())
        }
    }
}
