//! portscope - Inspect processes and the network ports they hold
//!
//! Launches an interactive dashboard by default; `list`, `kill` and
//! `config` work without a terminal UI.

mod commands;
mod format;
mod logging;
mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use portscope_core::{
    adapters::current_username, Classification, Config, ConfigStore, SortKey, SystemEngine,
    ViewParameters,
};

#[derive(Parser)]
#[command(name = "portscope")]
#[command(author, version, about = "Inspect processes and the network ports they hold")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Disable interactive TUI mode
    #[arg(long, global = true)]
    no_tui: bool,

    /// Seconds between refreshes
    #[arg(short, long, global = true, value_name = "SECS")]
    interval: Option<u64>,

    /// Include processes without network connections
    #[arg(short, long, global = true)]
    all: bool,

    /// Start on system processes instead of your own
    #[arg(long, global = true)]
    system: bool,

    /// Use a different config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one snapshot of processes and their ports
    #[command(alias = "ls")]
    List {
        /// Column to sort by
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,

        /// Filter by process name or port number
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Kill processes by PID
    Kill {
        /// PIDs to kill
        #[arg(required = true)]
        pids: Vec<u32>,

        /// Force kill (SIGKILL) without graceful shutdown
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Pid,
    Name,
    Ports,
    Cpu,
    Mem,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Pid => SortKey::Pid,
            SortArg::Name => SortKey::Name,
            SortArg::Ports => SortKey::PortCount,
            SortArg::Cpu => SortKey::Cpu,
            SortArg::Mem => SortKey::Memory,
        }
    }
}

impl Cli {
    fn config_store(&self) -> anyhow::Result<ConfigStore> {
        match &self.config {
            Some(path) => Ok(ConfigStore::with_path(path.clone())),
            None => Ok(ConfigStore::new()?),
        }
    }

    /// Apply command-line overrides on top of the file configuration.
    fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(interval) = self.interval {
            config.refresh_interval = interval;
        }
        if self.all {
            config.ports_only = false;
        }
        config
    }

    fn initial_view(&self, config: &Config) -> ViewParameters {
        let group = if self.system {
            Classification::SystemOwned
        } else {
            Classification::OwnedByCurrentUser
        };
        config.initial_view().with_group(group)
    }

    fn is_interactive(&self) -> bool {
        self.command.is_none() && !self.no_tui && atty::is(atty::Stream::Stdout)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let store = cli.config_store()?;
    let interactive = cli.is_interactive();

    // The dashboard owns the terminal, so its logs go to a file
    if interactive {
        logging::init_file(&store.config_dir().join(logging::LOG_FILE_NAME))?;
    } else {
        logging::init_stderr();
    }

    let config = cli.apply_overrides(store.load().await?);
    let view = cli.initial_view(&config);

    match cli.command {
        Some(Commands::List { sort, asc, search }) => {
            let mut view = view;
            if let Some(sort) = sort {
                view.sort_key = sort.into();
            }
            if asc {
                view.sort_descending = false;
            }
            if let Some(search) = search {
                view.search_text = search;
            }
            commands::list::run(view, cli.json).await?;
        }
        Some(Commands::Kill { pids, force }) => {
            commands::kill::run(pids, force, &config).await?;
        }
        Some(Commands::Config { init }) => {
            commands::config::run(&store, &config, init, cli.json).await?;
        }
        None => {
            if interactive {
                let engine = SystemEngine::system(&config, view, current_username()?);
                tui::run(engine).await?;
            } else {
                commands::list::run(view, cli.json).await?;
            }
        }
    }

    Ok(())
}
