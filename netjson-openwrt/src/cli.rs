use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "netjson-openwrt")]
#[command(about = "Render NetJSON device configurations as OpenWrt UCI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Validate a NetJSON file and print its UCI configuration.
    Render(RenderArgs),
    /// Validate a NetJSON file and print the normalized document.
    Json(JsonArgs),
    /// Validate a NetJSON file against the backend schema.
    Validate(ValidateArgs),
    /// List the firmware packages the generated configuration relies on.
    Packages,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// NetJSON DeviceConfiguration file.
    pub file: PathBuf,
    /// Write the UCI text here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct JsonArgs {
    /// NetJSON DeviceConfiguration file.
    pub file: PathBuf,
    /// Spaces per indentation level (0 for compact output). Overrides the profile.
    #[arg(long)]
    pub indent: Option<usize>,
    /// Sort object keys. Overrides the profile.
    #[arg(long)]
    pub sort_keys: bool,
    /// Optional output profile TOML file.
    #[arg(long)]
    pub profile: Option<PathBuf>,
    /// Show which profile was used.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// NetJSON DeviceConfiguration file.
    pub file: PathBuf,
}
