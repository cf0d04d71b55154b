use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use netjson_openwrt::profile::load_profile;
use netjson_openwrt::{BackendError, OpenWrt};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command, JsonArgs, RenderArgs, ValidateArgs};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "dispatching command");

    match cli.command {
        Command::Render(args) => run_render(args),
        Command::Json(args) => run_json(args),
        Command::Validate(args) => run_validate(args),
        Command::Packages => {
            for package in OpenWrt::packages() {
                println!("{package}");
            }
            Ok(())
        }
    }
}

fn load_backend(path: &Path) -> Result<OpenWrt> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    OpenWrt::from_json_str(&raw).with_context(|| format!("failed to load {}", path.display()))
}

fn run_render(args: RenderArgs) -> Result<()> {
    let backend = load_backend(&args.file)?;
    let uci = backend
        .render()
        .with_context(|| format!("failed to render {}", args.file.display()))?;

    match args.output {
        Some(out_path) => {
            if out_path == args.file {
                bail!(
                    "output path {} is the same as the input",
                    out_path.display()
                );
            }
            fs::write(&out_path, uci)
                .with_context(|| format!("failed to write {}", out_path.display()))?;
        }
        None => print!("{uci}"),
    }
    Ok(())
}

fn run_json(args: JsonArgs) -> Result<()> {
    let (profile, source) = load_profile(args.profile.as_deref())?;
    if args.verbose {
        eprintln!("Using profile: {source}");
    }

    let mut options = profile.json.options();
    if let Some(width) = args.indent {
        options.indent = (width > 0).then_some(width);
    }
    if args.sort_keys {
        options.sort_keys = true;
    }

    let backend = load_backend(&args.file)?;
    let json = backend
        .json(&options)
        .with_context(|| format!("failed to serialize {}", args.file.display()))?;
    println!("{json}");
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    let backend = load_backend(&args.file)?;
    match backend.validate() {
        Ok(()) => {
            println!("{} {}", "valid".green(), args.file.display());
            Ok(())
        }
        Err(BackendError::Validation { message, path }) => {
            println!("{} {} at '{path}': {message}", "invalid".red(), args.file.display());
            bail!("validation failed for {}", args.file.display());
        }
        Err(err) => Err(err.into()),
    }
}
