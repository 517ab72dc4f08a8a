use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::session::SplitMode;

#[derive(Debug, Clone, Parser)]
#[command(name = "class-browser")]
#[command(about = "Resolve Java classes over a classpath and manage class browser workspaces")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding preferences and the default workspace
    #[arg(long, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Workspace file to operate on
    #[arg(short = 'w', long, value_name = "FILE")]
    pub workspace: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Open a class file, a class inside an archive, or a workspace file
    Open {
        file: PathBuf,

        /// Class to open when FILE is an archive
        #[arg(long, value_name = "NAME")]
        class: Option<String>,
    },
    /// Resolve a class on the workspace classpath without opening it
    Find {
        class_name: String,

        #[arg(long)]
        module_path: bool,
    },
    /// Resolve a class and navigate the active tab to it
    Browse {
        class_name: String,

        #[arg(long)]
        module_path: bool,

        /// Open the class in a new tab instead
        #[arg(long)]
        new_tab: bool,
    },
    Classpath {
        #[command(subcommand)]
        action: ClasspathAction,
    },
    Tab {
        #[command(subcommand)]
        action: TabAction,
    },
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// List recently used workspace files
    Recent,
    /// Start a new, empty workspace
    New,
    /// Print the workspace document
    Show,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ClasspathAction {
    AddDir { path: PathBuf },
    AddJar { path: PathBuf },
    AddModule { name: String },
    SetModuleRoot { path: Option<PathBuf> },
    List,
    /// List the classes reachable through each entry
    Classes,
}

#[derive(Debug, Clone, Subcommand)]
pub enum TabAction {
    List,
    Select { index: usize },
    Close { index: usize },
    Split {
        #[arg(value_enum)]
        mode: SplitArg,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum HistoryAction {
    Back,
    Forward,
    Show,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum SplitArg {
    None,
    Horizontal,
    Vertical,
}

impl From<SplitArg> for SplitMode {
    fn from(arg: SplitArg) -> Self {
        match arg {
            SplitArg::None => SplitMode::None,
            SplitArg::Horizontal => SplitMode::Horizontal,
            SplitArg::Vertical => SplitMode::Vertical,
        }
    }
}
