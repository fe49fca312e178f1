use std::fs::{self, File};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tracing_subscriber::EnvFilter;

use linemark::bookmark::BookmarkStore;
use linemark::config::{self, Settings};
use linemark::editor::Editor;
use linemark::render::Renderer;
use linemark::scripting::ScriptEngine;
use linemark::{Error, Result, input};

/// Bookmark lines in files and jump back to them
#[derive(Parser)]
#[command(name = "linemark", version)]
struct Cli {
    /// File to open in the editor
    file: Option<PathBuf>,

    /// Bookmark file to use instead of the configured one
    #[arg(long, global = true)]
    bookmarks: Option<PathBuf>,

    /// Init script to run instead of ~/.config/linemark/init.rhai
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print saved bookmarks in menu order
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Bookmark a line of a file
    Add {
        file: PathBuf,
        /// 1-based line number
        line: usize,
    },
    /// Remove a bookmark by its number in `list`
    Remove { index: usize },
    /// Drop blank and duplicate records and sort the bookmark file
    Tidy,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(ref command) => {
            init_logging(LogTarget::Stderr);
            load_settings(&cli).and_then(|settings| run_command(command, settings))
        }
        None => {
            init_logging(LogTarget::File);
            match load_settings(&cli) {
                Ok(settings) => run_editor(cli.file.clone(), settings).await,
                Err(e) => Err(e),
            }
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("linemark: {}", e);
            ExitCode::FAILURE
        }
    }
}

enum LogTarget {
    Stderr,
    File,
}

/// Controlled via RUST_LOG, defaulting to info for this crate
fn init_logging(target: LogTarget) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("linemark=info"));

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        LogTarget::File => {
            // The terminal UI owns the screen, so logs go to a file
            let path = config::log_file();
            let file = path
                .parent()
                .map(fs::create_dir_all)
                .transpose()
                .and_then(|_| File::options().create(true).append(true).open(&path));
            match file {
                Ok(file) => tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init(),
                Err(_) => tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::sink)
                    .init(),
            }
        }
    }
}

/// Defaults, then the init script, then command line overrides
fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut engine = ScriptEngine::new();
    match &cli.config {
        Some(path) => engine.load_file(path)?,
        None => engine.load_default()?,
    }

    let mut settings = engine.settings();
    if let Some(path) = &cli.bookmarks {
        settings.bookmark_file = path.clone();
    }
    Ok(settings)
}

fn run_command(command: &Command, settings: Settings) -> Result<()> {
    let mut store = BookmarkStore::open(settings.store_config())?;

    match command {
        Command::List { json } => {
            let bookmarks = store.bookmarks();
            if *json {
                let out = serde_json::to_string_pretty(&bookmarks)?;
                println!("{}", out);
            } else {
                for (i, bookmark) in bookmarks.iter().enumerate() {
                    println!(
                        "{:>3}. {}\t{}:{}",
                        i + 1,
                        bookmark.label,
                        bookmark.target.path.display(),
                        bookmark.target.line
                    );
                }
            }
        }
        Command::Add { file, line } => {
            let path = std::path::absolute(file)?;
            let content = fs::read_to_string(&path)?;
            let count = content.lines().count();
            let text = match line.checked_sub(1).and_then(|idx| content.lines().nth(idx)) {
                Some(text) => text,
                None => return Err(Error::LineOutOfRange { line: *line, count }),
            };
            let menu = store.add_line(&path, *line, text)?;
            println!("Added; {} bookmarks", menu.len());
        }
        Command::Remove { index } => {
            let removed = match index.checked_sub(1) {
                Some(idx) => store.remove(idx)?,
                None => return Err(Error::NoSuchBookmark(0)),
            };
            store.rebuild()?;
            println!("Removed {}", removed);
        }
        Command::Tidy => {
            let before = store.len();
            let menu = store.rebuild()?;
            println!(
                "{} records, {} removed",
                menu.len(),
                before - store.len()
            );
        }
    }

    Ok(())
}

async fn run_editor(file: Option<PathBuf>, settings: Settings) -> Result<()> {
    let store = BookmarkStore::open(settings.store_config())?;
    let mut editor = Editor::new(settings, store);
    if let Some(path) = file {
        editor.open(path)?;
    }

    // Set up terminal
    Renderer::setup()?;
    let result = event_loop(&mut editor).await;

    // Cleanup, even when the loop failed
    Renderer::teardown()?;
    result
}

async fn event_loop(editor: &mut Editor) -> Result<()> {
    let mut renderer = Renderer::new()?;

    // Initial render
    editor.adjust_scroll(renderer.text_height());
    renderer.render(editor)?;

    // Event stream for async key reading
    let mut event_stream = EventStream::new();

    while editor.running {
        tokio::select! {
            Some(event) = event_stream.next() => {
                let event = event?;
                if let Event::Resize(width, height) = event {
                    renderer.resize(width, height);
                }
                input::handle_event(editor, event);
                editor.adjust_scroll(renderer.text_height());
                renderer.render(editor)?;
            }
            else => break,
        }
    }

    tracing::info!("Editor closed");
    Ok(())
}
