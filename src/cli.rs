// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wiimote-bridge")]
#[command(author, version, about = "Relay a real Wii Remote to an emulated console")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/wiimote-bridge/bridge.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List paired Wii Remotes
    #[command(visible_aliases = ["ls", "l"])]
    List,

    /// Run the bridge, logging every delivered input frame
    #[command(visible_alias = "r")]
    Run {
        /// Reply channel to open (hex with 0x prefix or decimal)
        #[arg(long, value_parser = parse_u16)]
        channel: Option<u16>,

        /// Data reporting mode to request once the channel is open
        #[arg(long, value_parser = parse_u8, default_value = "0x30")]
        mode: u8,

        /// Stop after this many ticks (default: until Ctrl-C)
        #[arg(long)]
        ticks: Option<u64>,

        /// Override the number of controllers to open
        #[arg(long)]
        max_devices: Option<usize>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Write the effective configuration back to the config file
        #[arg(long)]
        save: bool,
    },
}

fn parse_number(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{s}': {e}"))
}

fn parse_u16(s: &str) -> Result<u16, String> {
    let value = parse_number(s)?;
    u16::try_from(value).map_err(|_| format!("{s} does not fit in 16 bits"))
}

fn parse_u8(s: &str) -> Result<u8, String> {
    let value = parse_number(s)?;
    u8::try_from(value).map_err(|_| format!("{s} does not fit in 8 bits"))
}
