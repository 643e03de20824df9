use clap::{Parser, Subcommand};
use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use wine_rater::config::{self, Config};
use wine_rater::output::{self, DelimitedFormat};
use wine_rater::rating::{ItemId, ItemSet, SetId};
use wine_rater::scoring;
use wine_rater::stderr_buffer::BufferedStderr;
use wine_rater::storage::{self, FileStore, Session, StateStore};
use wine_rater::tui;

const EXIT_SUCCESS: i32 = 0;
const EXIT_USAGE: i32 = 1;
const EXIT_IO: i32 = 2;
const EXIT_CONFIG: i32 = 4;

/// How long `copy` keeps serving the clipboard on Linux before exiting
const CLIPBOARD_HOLD: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive rating form (default if no subcommand)
    Tui,
    /// Print sets with their scores, totals, and status
    Show {
        /// Only show this set
        #[arg(long)]
        set: Option<String>,
    },
    /// Export every set as CSV (or TSV on stdout)
    Export {
        /// CSV file to write (defaults to wine_ratings_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print tab-separated text to stdout instead of writing a CSV file
        #[arg(long)]
        tsv: bool,
    },
    /// Copy every set to the clipboard as tab-separated text
    Copy,
    /// Assign wine names, one per argument (or per stdin line if none given)
    Names {
        set: String,

        /// Row to start at (1-based)
        #[arg(long, default_value_t = 1)]
        start: usize,

        names: Vec<String>,
    },
    /// Change one score by a delta, switching the set to manual scoring
    Nudge {
        set: String,
        /// Row number (1-based, as shown by `show`)
        index: usize,
        #[arg(allow_negative_numbers = true)]
        delta: f64,
    },
    /// Append a blank wine to a set
    Add { set: String },
    /// Remove a wine from a set
    Remove {
        set: String,
        /// Row number (1-based, as shown by `show`)
        index: usize,
    },
    /// Share the target evenly again, leaving manual scoring
    Distribute { set: String },
    /// Copy wine names from one set into another
    CopyNames { target: String, source: String },
    /// Clear every set and the saved state
    Reset {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "wine-rater")]
#[command(about = "Wine tasting score form that always adds up", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/wine-rater/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the saved ratings (defaults to ~/.config/wine-rater/wine_ratings.json)
    #[arg(long, global = true)]
    state: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("wine_rater=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(BufferedStderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn exit_with(code: i32, message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(code);
}

/// Look up a set by id, exiting with the list of known ids when it does not exist.
fn find_set<'a>(session: &'a mut Session, id: &str) -> &'a mut ItemSet {
    let set_id = SetId::new(id);
    if session.collection.get(&set_id).is_none() {
        let known: Vec<&str> = session.collection.ids().map(SetId::as_str).collect();
        exit_with(
            EXIT_USAGE,
            format!("Unknown set '{}'. Known sets: {}", id, known.join(", ")),
        );
    }
    match session.collection.get_mut(&set_id) {
        Some(set) => set,
        None => exit_with(EXIT_USAGE, format!("Unknown set '{}'", id)),
    }
}

/// Resolve a 1-based row number to the item it currently shows.
fn item_at(set: &ItemSet, index: usize) -> ItemId {
    if index < 1 || index > set.len() {
        exit_with(
            EXIT_USAGE,
            format!(
                "Invalid index {}. Must be between 1 and {}.",
                index,
                set.len()
            ),
        );
    }
    set.items()[index - 1].id
}

fn save(store: &dyn StateStore, session: &Session) {
    if let Err(e) = storage::save_session(store, session) {
        exit_with(EXIT_IO, format!("Failed to save ratings: {}", e));
    }
}

fn print_set(session: &Session, id: &SetId) {
    if let Some(set) = session.collection.get(id) {
        let use_colors = output::should_use_colors();
        println!(
            "{}",
            output::format_set(set, session.titles.get(id), use_colors)
        );
    }
}

/// Names from the command line, or one per stdin line when none were given.
fn collect_names(args: Vec<String>) -> Vec<String> {
    let lines = if args.is_empty() {
        if std::io::stdin().is_terminal() {
            eprintln!("Enter one name per line, then Ctrl-D:");
        }
        match std::io::stdin().lock().lines().collect::<Result<Vec<_>, _>>() {
            Ok(lines) => lines,
            Err(e) => exit_with(EXIT_IO, format!("Failed to read names from stdin: {}", e)),
        }
    } else {
        args
    };

    lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Tui);
    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init = command {
        if let Err(e) = config::init::run_init_wizard(config_path) {
            exit_with(EXIT_CONFIG, format!("Init failed: {:#}", e));
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config: Config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => exit_with(EXIT_CONFIG, format!("Config error: {:#}", e)),
    };

    // Validate config at startup
    if let Err(errors) = config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let state_path = storage::resolve_state_path(&config, cli.state.map(PathBuf::from));
    tracing::debug!(path = %state_path.display(), "Using state file");
    let store = FileStore::new(state_path);
    let mut session = storage::load_session(&store, &config);

    match command {
        Commands::Tui => {
            // Theme detection queries the terminal, so it must happen before raw mode
            let theme = tui::resolve_theme(config.theme);
            let app = tui::App::new(
                session,
                config,
                Box::new(store),
                tui::ThemeColors::for_theme(theme),
            );
            if let Err(e) = tui::run_tui(app).await {
                exit_with(EXIT_IO, format!("Terminal error: {:#}", e));
            }
        }
        Commands::Show { set } => {
            let ids: Vec<SetId> = match set {
                Some(id) => vec![find_set(&mut session, &id).set_id().clone()],
                None => session.collection.ids().cloned().collect(),
            };
            for (i, id) in ids.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_set(&session, id);
            }
        }
        Commands::Export { output: path, tsv } => {
            if tsv {
                match output::to_delimited_text(
                    &session.collection,
                    &session.titles,
                    DelimitedFormat::Tsv,
                ) {
                    Ok(text) => println!("{}", text),
                    Err(e) => exit_with(EXIT_IO, format!("Failed to render TSV: {}", e)),
                }
            } else {
                let path = path.unwrap_or_else(|| {
                    output::default_export_path(&config, chrono::Local::now())
                });
                if let Err(e) =
                    output::write_csv_file(&path, &session.collection, &session.titles)
                {
                    exit_with(EXIT_IO, format!("{:#}", e));
                }
                println!("Exported to {}", path.display());
            }
        }
        Commands::Copy => {
            let text = match output::to_delimited_text(
                &session.collection,
                &session.titles,
                DelimitedFormat::Tsv,
            ) {
                Ok(text) => text,
                Err(e) => exit_with(EXIT_IO, format!("Failed to render TSV: {}", e)),
            };
            if cfg!(target_os = "linux") {
                eprintln!(
                    "Holding the clipboard for up to {}s until a clipboard manager takes it (Ctrl-C to stop)",
                    CLIPBOARD_HOLD.as_secs()
                );
            }
            let deadline = std::time::Instant::now() + CLIPBOARD_HOLD;
            match wine_rater::clipboard::copy_text_and_wait(&text, deadline) {
                Ok(wine_rater::clipboard::CopyMethod::System) => {
                    eprintln!("Copied to clipboard")
                }
                Ok(wine_rater::clipboard::CopyMethod::Terminal) => {
                    eprintln!("Sent to terminal clipboard (OSC 52)")
                }
                Err(e) => exit_with(EXIT_IO, format!("Failed to copy: {:#}", e)),
            }
        }
        Commands::Names { set, start, names } => {
            let names = collect_names(names);
            let target = find_set(&mut session, &set);
            let start_id = item_at(target, start);
            let applied = target.bulk_assign_names(start_id, &names);
            let id = target.set_id().clone();
            if applied < names.len() {
                eprintln!(
                    "Assigned {} of {} names (set is limited to {} wines)",
                    applied,
                    names.len(),
                    target.max_count()
                );
            }
            save(&store, &session);
            print_set(&session, &id);
        }
        Commands::Nudge { set, index, delta } => {
            let target = find_set(&mut session, &set);
            let item = item_at(target, index);
            if !scoring::is_whole_steps(delta, target.step()) {
                exit_with(
                    EXIT_USAGE,
                    format!(
                        "Invalid delta {}. Must be a whole number of {} steps.",
                        delta,
                        target.step()
                    ),
                );
            }
            target.nudge_score(item, delta);
            let id = target.set_id().clone();
            save(&store, &session);
            print_set(&session, &id);
        }
        Commands::Add { set } => {
            let target = find_set(&mut session, &set);
            if target.add_item().is_none() {
                exit_with(
                    EXIT_USAGE,
                    format!("Set already holds the maximum of {} wines", target.max_count()),
                );
            }
            let id = target.set_id().clone();
            save(&store, &session);
            print_set(&session, &id);
        }
        Commands::Remove { set, index } => {
            let target = find_set(&mut session, &set);
            let item = item_at(target, index);
            if !target.remove_item(item) {
                exit_with(
                    EXIT_USAGE,
                    format!("Set already holds the minimum of {} wines", target.min_count()),
                );
            }
            let id = target.set_id().clone();
            save(&store, &session);
            print_set(&session, &id);
        }
        Commands::Distribute { set } => {
            let target = find_set(&mut session, &set);
            target.force_distribute();
            let id = target.set_id().clone();
            save(&store, &session);
            print_set(&session, &id);
        }
        Commands::CopyNames { target, source } => {
            let source_id = find_set(&mut session, &source).set_id().clone();
            let target_id = find_set(&mut session, &target).set_id().clone();
            if !session.collection.copy_names(&target_id, &source_id) {
                exit_with(EXIT_USAGE, "Source and target must be different sets");
            }
            save(&store, &session);
            print_set(&session, &target_id);
        }
        Commands::Reset { yes } => {
            if !yes {
                match config::init::prompt_yes_no("Reset all sets and delete saved ratings?", false)
                {
                    Ok(true) => {}
                    Ok(false) => exit_with(EXIT_SUCCESS, "Aborted."),
                    Err(e) => exit_with(EXIT_IO, format!("{:#}", e)),
                }
            }
            storage::clear_session(&store, &config);
            println!("Reset {} sets ({})", config.sets.len(), store.describe());
        }
        // Handled before loading config
        Commands::Init => {}
    }

    std::process::exit(EXIT_SUCCESS);
}
