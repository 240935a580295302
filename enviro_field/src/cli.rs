//! Command line of the field binary.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use enviro_ipc::{ChannelConfig, ChannelKind};
use tracing::warn;

use crate::environment::EnvironmentDescription;
use crate::settings::FieldSettings;

/// ENVIRO soil field process
#[derive(Parser, Debug)]
#[command(name = "soil_field")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Environmental field process exchanging per-step data with cpfg/lpfg")]
#[command(long_about = None)]
pub struct Args {
    /// Environment-description file
    #[arg(short = 'e', value_name = "PATH")]
    pub environment: Option<PathBuf>,

    /// Suffix appended to the exchange file names (files transport)
    #[arg(long = "ext", value_name = "SUFFIX")]
    pub extension: Option<String>,

    /// Semaphore key; 0 selects the pipes transport
    #[arg(short = 'k', value_name = "KEY", default_value_t = 0, allow_negative_numbers = true)]
    pub key: i32,

    /// TOML settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Parse the process arguments, accepting the single-dash `-ext`.
    pub fn parse_env() -> Self {
        Self::parse_from(normalize_legacy_args(std::env::args_os()))
    }
}

/// Rewrite `-ext` to `--ext`; drivers pass the single-dash spelling.
pub fn normalize_legacy_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| if arg == "-ext" { OsString::from("--ext") } else { arg })
        .collect()
}

/// Decide the transport.
///
/// The environment file picks memory or files, but only with a non-zero
/// semaphore key; everything else runs over pipes.
pub fn channel_config(
    args: &Args,
    environment: &EnvironmentDescription,
    settings: &FieldSettings,
) -> ChannelConfig {
    let requested = environment.communication.unwrap_or_default();
    let kind = if requested.uses_semaphores() && args.key == 0 {
        warn!(%requested, "no semaphore key given, falling back to pipes");
        ChannelKind::Pipes
    } else {
        requested
    };

    ChannelConfig {
        kind,
        semaphore_key: args.key,
        extension: args.extension.clone(),
        directory: settings.files.directory.clone(),
    }
}
