use anyhow::Result;
use clap::Parser;
use code_copier::app::clipboard::{ClipboardSink, StdoutClipboard, SystemClipboard};
use code_copier::app::commands;
use code_copier::app::events::{Status, UserEvent};
use code_copier::app::file_dialog::NativeDialogService;
use code_copier::app::git::ShellGit;
use code_copier::app::state::{lock_state, AppState, SelectedItem};
use code_copier::app::view_model::count_selected;
use code_copier::app::watcher::RootWatcher;
use code_copier::config::settings;
use code_copier::core::{display_name, BuiltinExclusions, EntryKind, TreeGenerator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Copy project files, structure diagrams or staged diffs as pasteable text.",
    long_about = "code-copier opens a project folder, applies the built-in exclusions and the \nfolder's .codecopierignore rules, and places the requested text on the system \nclipboard, or on standard output with --stdout. Status messages go to standard error.",
    after_help = "EXAMPLES:\n  code-copier . src Cargo.toml\n  code-copier ~/project --structure\n  code-copier . --git-diff --stdout > staged.diff"
)]
struct Cli {
    /// Project folder to open. Shows a folder picker when omitted.
    root: Option<PathBuf>,

    /// Files or folders to copy, relative to the root or absolute.
    paths: Vec<PathBuf>,

    #[arg(short, long, help = "Copy the directory structure diagram.")]
    structure: bool,

    #[arg(long, help = "Add the files staged in git to the selection.")]
    git_staged: bool,

    #[arg(long, help = "Copy the staged git diff.")]
    git_diff: bool,

    #[arg(long, help = "Write copied text to standard output instead of the system clipboard.")]
    stdout: bool,

    #[arg(short, long, help = "Keep watching the root and refresh on changes until Ctrl-C.")]
    watch: bool,

    #[arg(long, value_name = "FILE", help = "Use this config file instead of the default.")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = settings::load_config(cli.config.as_deref())?;
    let state = Arc::new(Mutex::new(AppState::new(config.clone())));

    let tree = match &cli.root {
        Some(root) => commands::open_root_at(std::path::absolute(root)?, state.clone()).await,
        None => commands::open_root(&NativeDialogService, state.clone()).await,
    };
    let Some(tree) = tree else {
        eprintln!(
            "{}",
            Status::Error("No folder selected, or the folder is not accessible.".to_string())
        );
        return Ok(ExitCode::FAILURE);
    };
    let root = tree.path.clone();
    persist_last_directory(&state, cli.config.as_deref());

    let clipboard = clipboard_sink(cli.stdout);
    let git = ShellGit::new(config.max_git_diff_bytes);
    let mut statuses = Vec::new();

    if cli.git_staged {
        statuses.push(commands::stage_git_staged(&git, state.clone()).await);
    }
    for path in &cli.paths {
        let path = if path.is_absolute() {
            path.clone()
        } else {
            root.join(path)
        };
        let kind = if path.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let item = SelectedItem {
            name: display_name(&path),
            kind,
        };
        commands::stage_item(path, item, &state);
    }

    let selection = lock_state(&state).selection.paths();
    if !selection.is_empty() {
        statuses.push(commands::copy_selection(selection, &root, state.clone(), clipboard.as_ref()).await);
    }
    if cli.structure {
        statuses.push(commands::copy_structure(&root, state.clone(), clipboard.as_ref()).await);
    }
    if cli.git_diff {
        statuses.push(commands::copy_git_diff(&git, &root, clipboard.as_ref()).await);
    }
    if statuses.is_empty() && !cli.watch {
        // Nothing requested: show the filtered tree.
        print!("{}", TreeGenerator::render(&tree));
    }

    for status in &statuses {
        eprintln!("{status}");
    }

    if cli.watch {
        watch(&root, state.clone(), Duration::from_millis(config.watch_debounce_ms)).await?;
    }

    if statuses.iter().any(Status::is_error) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn clipboard_sink(stdout: bool) -> Box<dyn ClipboardSink> {
    if stdout {
        Box::new(StdoutClipboard)
    } else {
        Box::new(SystemClipboard)
    }
}

fn persist_last_directory(state: &Mutex<AppState>, config_path: Option<&Path>) {
    let config = lock_state(state).config.clone();
    if let Err(e) = settings::save_config(&config, config_path) {
        tracing::warn!("Failed to save config: {}", e);
    }
}

async fn watch(root: &Path, state: Arc<Mutex<AppState>>, delay: Duration) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _watcher = RootWatcher::start(root, &BuiltinExclusions::default(), delay, Handle::current(), tx)?;
    eprintln!("Watching {} (Ctrl-C to stop)", root.display());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watch.");
                break;
            }
            event = rx.recv() => match event {
                Some(UserEvent::FileSystemChanged { root }) => {
                    match commands::refresh_tree(&root, state.clone()).await {
                        Some(tree) => {
                            let view = commands::tree_view(&tree, &state);
                            tracing::info!(
                                "Tree refreshed: {} entries, {} staged",
                                tree.descendants().count(),
                                count_selected(&view)
                            );
                        }
                        None => tracing::warn!("Root {:?} is no longer accessible", root),
                    }
                }
                None => break,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clipboard_is_the_default_sink() {
        let cli = Cli::try_parse_from(["code-copier", ".", "src"]).unwrap();
        assert!(!cli.stdout);
        assert_eq!(cli.paths, vec![PathBuf::from("src")]);
    }

    #[test]
    fn test_stdout_flag_selects_stdout_sink() {
        let cli = Cli::try_parse_from(["code-copier", ".", "--structure", "--stdout"]).unwrap();
        assert!(cli.stdout);
        assert!(cli.structure);
    }
}
