use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use fuzzdex::index::build::{build_index_auto, Workspace};
use fuzzdex::index::stats::{list_indexes, show_stats};
use fuzzdex::output::{self, LineCache};
use fuzzdex::query::{parse_query, sort_by_distance, BackendKind, QueryBackend, QueryResponse};
use fuzzdex::utils::config::Settings;
use fuzzdex::utils::{find_codebase_root, remove_index};
use fuzzdex::watch::run_watcher;
use log::warn;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Instant;
use termcolor::{ColorChoice, StandardStream};

#[derive(Parser)]
#[command(name = "fuzzdex")]
#[command(about = "Typo-tolerant word search over a directory of text files")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Word to search for, optionally as WORD/DISTANCE (when no subcommand is given).
    /// Exactly one word is accepted.
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,

    /// Path to search in
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Maximum edit distance when the query has no /DISTANCE suffix
    #[arg(short, long)]
    distance: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index (auto-detects git root)
    Index {
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Discard the stored index and rebuild
        #[arg(short, long)]
        force: bool,

        #[arg(long, value_enum)]
        backend: Option<BackendKind>,
    },
    /// Search for words within an edit distance
    Search(SearchArgs),
    /// Keep the index up to date while files change
    Watch {
        #[arg(default_value = ".")]
        path: PathBuf,

        #[arg(long, value_enum)]
        backend: Option<BackendKind>,
    },
    /// Show index statistics
    Stats {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// List all indexed workspaces
    List,
    /// Remove an index
    Remove {
        /// Path to the workspace to remove the index for
        path: PathBuf,
    },
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Word to search for, optionally as WORD/DISTANCE
    word: String,

    /// Maximum edit distance when WORD has no /DISTANCE suffix
    #[arg(short, long)]
    distance: Option<usize>,

    /// Path to search in
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// One JSON object per match
    #[arg(long)]
    json: bool,

    /// Index representation to use
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,

    /// Closest matches first
    #[arg(long)]
    sort: bool,

    /// Fail instead of warning when the word is too short for the distance
    #[arg(long)]
    strict: bool,

    /// Only print the names of files with matches
    #[arg(short = 'l', long = "files-with-matches")]
    files_with_matches: bool,

    /// Only print the number of matches per file
    #[arg(short, long)]
    count: bool,

    #[arg(long, value_enum, default_value = "auto")]
    color: ColorMode,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
            ColorMode::Auto if std::io::stdout().is_terminal() => ColorChoice::Auto,
            ColorMode::Auto => ColorChoice::Never,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Index {
            path,
            force,
            backend,
        }) => {
            let settings = Settings::load()?;
            let kind = backend.unwrap_or(settings.search.backend);
            build_index_auto(&path, force, kind, settings.index)?;
        }
        Some(Commands::Search(args)) => {
            let found = run_search(args)?;
            if !found {
                std::process::exit(1);
            }
        }
        Some(Commands::Watch { path, backend }) => {
            run_watch(path, backend)?;
        }
        Some(Commands::Stats { path }) => {
            show_stats(&path)?;
        }
        Some(Commands::List) => {
            list_indexes()?;
        }
        Some(Commands::Remove { path }) => {
            let root = find_codebase_root(&path)?;
            if remove_index(&root)? {
                println!("Removed index for: {}", root.display());
            } else {
                println!("No index for: {}", root.display());
            }
        }
        None => {
            if cli.query.is_empty() {
                Cli::command().print_help()?;
                return Ok(());
            }
            let found = run_search(SearchArgs {
                word: cli.query.join(" "),
                distance: cli.distance,
                path: cli.path,
                json: false,
                backend: None,
                sort: false,
                strict: false,
                files_with_matches: false,
                count: false,
                color: ColorMode::Auto,
            })?;
            if !found {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Run one query, building the index on first use. Returns whether anything matched.
fn run_search(args: SearchArgs) -> Result<bool> {
    let settings = Settings::load()?;
    let query = parse_query(
        &args.word,
        args.distance.unwrap_or(settings.search.default_distance),
    )?;
    if args.strict {
        query.check_recommended_bound()?;
    } else if !query.within_recommended_bound() {
        warn!(
            "distance {} is large for {:?}; most short words will match",
            query.max_distance, query.word
        );
    }

    let root = find_codebase_root(&args.path)?;
    let kind = args.backend.unwrap_or(settings.search.backend);
    let workspace = Workspace::open(&root, kind, settings.index)?;
    let silent = args.json || !std::io::stderr().is_terminal();
    workspace.load_or_build(silent)?;

    let start = Instant::now();
    let mut results = workspace.backend.query(&query.word, query.max_distance);
    if args.sort {
        sort_by_distance(&mut results);
    }
    let response = QueryResponse {
        match_count: results.len(),
        corpus_size: workspace.document_count(),
        duration: start.elapsed(),
        results,
    };

    let mut stdout = StandardStream::stdout(args.color.choice());
    if args.json {
        output::print_json_lines(&mut stdout, &response.results)?;
    } else if args.files_with_matches {
        output::print_files_only(&mut stdout, &response.results)?;
    } else if args.count {
        output::print_match_counts(&mut stdout, &response.results)?;
    } else {
        output::print_matches(&mut stdout, &response.results, &mut LineCache::new())?;
        if std::io::stderr().is_terminal() {
            eprintln!("{}", output::summary_line(&response));
        }
    }
    stdout.flush()?;

    Ok(response.match_count > 0)
}

fn run_watch(path: PathBuf, backend: Option<BackendKind>) -> Result<()> {
    let settings = Settings::load()?;
    let root = find_codebase_root(&path)?;
    let kind = backend.unwrap_or(settings.search.backend);
    let workspace = Workspace::open(&root, kind, settings.index)?;
    workspace.load_or_build(false)?;

    println!(
        "Watching {} ({} documents, Ctrl+C to stop)",
        workspace.root.display(),
        workspace.document_count()
    );
    let shutdown = AtomicBool::new(false);
    run_watcher(&workspace, settings.watcher, &shutdown, |summary| {
        for filename in &summary.updated {
            println!("updated {filename}");
        }
        for filename in &summary.removed {
            println!("removed {filename}");
        }
    })
}
