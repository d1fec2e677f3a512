use clap::{Parser, Subcommand};
use std::path::PathBuf;
use winject::bootstrap::{self, ShowOutcome};
use winject::config::ConfigLoader;
use winject::infrastructure::container::CapabilityKind;
use winject::windows::OpenWindowList;
use winject::{logging, AppError, WindowFactory};

#[derive(Parser, Debug)]
#[command(name = "winject", version, about = "Headless window factory backed by a dependency container")]
struct Cli {
    /// Directory holding config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create and display a window by name
    Show {
        /// Registered window key, e.g. customer-window
        window: String,
        /// Block until the window is dismissed
        #[arg(long)]
        modal: bool,
    },
    /// List registered capabilities
    List,
    /// Resolve every registered capability and print container statistics
    Stats,
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let loader = match cli.config_dir {
        Some(dir) => ConfigLoader::with_base_path(dir),
        None => ConfigLoader::new(),
    };
    let config = loader.load_config()?;
    logging::init_logging(config.logging_config()).map_err(|e| AppError::Logging(e.to_string()))?;

    let container = winject::global();
    bootstrap::configure(container, &config);
    let factory = WindowFactory::new(container);

    match cli.command {
        Command::Show { window, modal } => show(&factory, &window, modal),
        Command::List => list(&factory),
        Command::Stats => stats(&factory),
    }
    Ok(())
}

/// Failures are reported to the user; the process still exits normally
fn show(factory: &WindowFactory<'_>, window: &str, modal: bool) {
    let open_windows = OpenWindowList::new();
    match bootstrap::show_window(factory, window, modal, &open_windows) {
        Ok(ShowOutcome::Dismissed(choice)) => println!("{} was {}", window, choice),
        Ok(ShowOutcome::Opened { name, id }) => println!("{} is open ({})", name, id),
        Err(e) => eprintln!("Cannot open '{}': {}", window, e),
    }
    open_windows.close_all();
}

fn list(factory: &WindowFactory<'_>) {
    let container = factory.container();
    for key in container.registered_keys() {
        if let Ok(binding) = container.lookup(&key) {
            let kind = match binding.kind() {
                CapabilityKind::UiObject => "window",
                CapabilityKind::Service => "service",
            };
            println!("{:<20} {:<8} {:<12} {}", key, kind, binding.lifetime(), binding.type_name());
        }
    }
}

fn stats(factory: &WindowFactory<'_>) {
    let container = factory.container();
    for key in container.registered_keys() {
        if let Err(e) = container.resolve_instance(&key) {
            eprintln!("{}: {}", key, e);
        }
    }
    println!("{}", container.stats().performance_summary());
}
