mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, Format};
use std::path::Path;
use std::process::ExitCode;
use xante::config::{Config, default_config_path};
use xante::inspect::{self, CheckOptions, PluginLibrary};

/// Log to stderr so reports on stdout stay machine-readable.
///
/// `RUST_LOG` wins over the config's `[log] filter`.
fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    let Cli { config, command } = Cli::parse();
    let config_path = config.as_deref();

    match command {
        Commands::InitConfig { force } => {
            init_logging(&Config::default());
            handle_init_config(config_path, force)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Info { library } => {
            load_config(config_path)?;
            handle_info(&library)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            library,
            jtf,
            symbols,
            call_init,
            format,
            json,
        } => {
            let config = load_config(config_path)?;
            let format = if json { Format::Json } else { format };
            let mut extra_symbols = config.check.extra_symbols.clone();
            extra_symbols.extend(symbols);

            let passed = handle_check(
                &library,
                jtf.as_deref(),
                &extra_symbols,
                config.check.require_lifecycle,
                call_init || config.check.call_init,
                format,
            )?;
            Ok(if passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = Config::load(path)?;
    init_logging(&config);
    Ok(config)
}

fn handle_init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    Config::init_at(&path, force)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn handle_info(path: &Path) -> Result<()> {
    let library = PluginLibrary::open(path)?;
    let metadata = library
        .metadata()
        .with_context(|| format!("Failed to read metadata from {}", path.display()))?;

    println!("{}", path.display());
    print!("{}", inspect::render_metadata(&metadata));
    Ok(())
}

fn handle_check(
    path: &Path,
    jtf: Option<&Path>,
    extra_symbols: &[String],
    require_lifecycle: bool,
    call_init: bool,
    format: Format,
) -> Result<bool> {
    let bindings = match jtf {
        Some(jtf) => inspect::load_bindings(jtf)?,
        None => Vec::new(),
    };
    tracing::debug!(count = bindings.len(), "loaded event bindings");

    let library = PluginLibrary::open(path)?;
    let report = inspect::check(
        &library,
        &CheckOptions {
            require_lifecycle,
            extra_symbols,
            bindings: &bindings,
            call_init,
        },
    );

    match format {
        Format::Text => print!("{}", report.render_text()),
        Format::Json => println!("{}", report.render_json()?),
    }

    if !report.passed() {
        tracing::warn!(path = %path.display(), "plugin check failed");
    }
    Ok(report.passed())
}
