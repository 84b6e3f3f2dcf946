use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "xante-plugin")]
#[command(about = "Inspect libxante plugins without running the toolkit", long_about = None)]
pub struct Cli {
    /// Config file (default: $XANTE_PLUGIN_CONFIG or ~/.config/xante/plugin.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a plugin's name, version, author and description
    Info {
        /// Path to the plugin shared object
        library: PathBuf,
    },
    /// Verify that a plugin exports everything the toolkit will call
    Check {
        /// Path to the plugin shared object
        library: PathBuf,

        /// JTF file whose event bindings must resolve to plugin functions
        #[arg(long)]
        jtf: Option<PathBuf>,

        /// Additional symbol the plugin must export (repeatable)
        #[arg(short, long = "symbol")]
        symbols: Vec<String>,

        /// Call xapl_init after loading. Only runs when the toolkit's
        /// symbols resolve in this process; a panicking init aborts it
        #[arg(long)]
        call_init: bool,

        /// Report format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Shorthand for --format json
        #[arg(long, conflicts_with = "format")]
        json: bool,
    },
    /// Write a config file holding the defaults
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}
