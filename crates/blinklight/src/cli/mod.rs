//! CLI subcommands — device listing, light state and control.

mod config_cmd;
mod devices;
mod off;
mod on;
mod status;
mod watch;

use clap::Subcommand;
use serde::Serialize;

pub(super) use crate::RUNNING;
pub(super) use blinklight_lib::color::{self, HsColor};
pub(super) use blinklight_lib::config::{Config, LightConfig};
pub(super) use blinklight_lib::device::{self, DiscoveredDevice};
pub(super) use blinklight_lib::error::Result;
pub(super) use blinklight_lib::light::{BlinkStickLight, LightEntity, TurnOnOptions};
pub(super) use blinklight_lib::platform;

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key.
pub(super) fn kv_width(keys: &[&str]) -> usize {
    keys.iter().map(|k| k.len()).max().unwrap_or(0) + PADDING
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{key:<width$}{value}", width = w);
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct DevicesOutput {
    pub count: usize,
    pub devices: Vec<DiscoveredDevice>,
}

#[derive(Serialize)]
pub(super) struct StatusOutput {
    pub name: String,
    pub serial: String,
    pub index: u16,
    pub on: bool,
    pub brightness: Option<u8>,
    pub hs_color: Option<HsColor>,
    pub color: Option<String>,
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
}

// ── Target selection ──

/// Which light a command operates on: an explicit `--serial`, or the
/// first `[[lights]]` entry of the config file.
#[derive(clap::Args)]
pub struct TargetArgs {
    /// Device serial (default: first configured light)
    #[arg(long)]
    pub serial: Option<String>,

    /// Zero-based LED index
    #[arg(long)]
    pub index: Option<u16>,
}

pub(super) fn resolve_target(target: &TargetArgs) -> Result<LightConfig> {
    if let Some(ref serial) = target.serial {
        let mut light = LightConfig::new(serial.clone());
        if let Some(index) = target.index {
            light.index = index;
        }
        return Ok(light);
    }

    let config = Config::load();
    let Some(first) = config.lights.first() else {
        return Err(blinklight_lib::BlinklightError::Config(
            "no light configured; pass --serial or add a [[lights]] entry to the config file"
                .into(),
        ));
    };
    let mut light = first.clone();
    if let Some(index) = target.index {
        light.index = index;
    }
    Ok(light)
}

#[derive(Subcommand)]
pub enum Command {
    /// List connected BlinkStick devices
    Devices,

    /// Show a light's current state (reads the device)
    Status(TargetArgs),

    /// Turn a light on
    On {
        #[command(flatten)]
        target: TargetArgs,

        /// Color name or #RRGGBB hex (default: last commanded color)
        #[arg(long)]
        color: Option<String>,

        /// Brightness 0-255 (default: 255)
        #[arg(long)]
        brightness: Option<u8>,
    },

    /// Turn a light off
    Off(TargetArgs),

    /// Poll a light and print state changes until Ctrl+C
    Watch {
        #[command(flatten)]
        target: TargetArgs,

        /// Poll interval in seconds
        #[arg(long, default_value_t = 2)]
        interval: u64,
    },

    /// Show configuration and file paths
    Config,
}

pub fn run(command: Command, json: bool) -> Result<()> {
    match command {
        Command::Devices => devices::cmd_devices(json),
        Command::Status(target) => status::cmd_status(&target, json),
        Command::On {
            target,
            color,
            brightness,
        } => on::cmd_on(&target, color.as_deref(), brightness),
        Command::Off(target) => off::cmd_off(&target),
        Command::Watch { target, interval } => watch::cmd_watch(&target, interval),
        Command::Config => config_cmd::cmd_config(json),
    }
}
