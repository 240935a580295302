//! # soil_field
//!
//! Soil field process started by cpfg/lpfg.
//!
//! # Usage
//!
//! ```bash
//! # Pipes (no key)
//! soil_field -e soil.e
//!
//! # Shared memory or files, as chosen by the environment file
//! soil_field -e soil.e -k 4242 -ext .1
//!
//! # Verbose JSON logs on stderr
//! soil_field -e soil.e -v --json
//! ```

#![deny(warnings)]

use enviro::config::LogLevel;
use enviro_field::cli::{Args, channel_config};
use enviro_field::settings::FieldSettings;
use enviro_field::{EchoField, EnvironmentDescription, FieldResult, FieldSession, run};
use enviro_ipc::open_channel;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run_field() {
        if e.is_setup() {
            error!("field setup failed: {}", e);
        } else {
            error!("field process stopped: {}", e);
        }
        // The driver treats any exit as the field going away.
        std::process::exit(0);
    }
}

fn run_field() -> FieldResult<()> {
    let args = Args::parse_env();

    let settings = match FieldSettings::load_or_default(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            setup_tracing(&args, LogLevel::default());
            return Err(e.into());
        }
    };
    setup_tracing(&args, settings.shared.log_level);

    info!(
        service = %settings.shared.service_name,
        "soil field v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let environment = match args.environment.as_deref() {
        Some(path) => EnvironmentDescription::load(path).unwrap_or_else(|e| {
            warn!("{}; using defaults", e);
            EnvironmentDescription::default()
        }),
        None => {
            warn!("no environment file given; using defaults");
            EnvironmentDescription::default()
        }
    };

    let config = channel_config(&args, &environment, &settings);
    info!(
        transport = %config.kind,
        key = config.semaphore_key,
        "opening transport"
    );
    let channel = open_channel(&config)?;

    let mut session = FieldSession::new(channel, environment.turtle);
    let mut field = EchoField::default();
    let steps = run(&mut session, &mut field)?;

    info!(steps, answered = field.answered(), "soil field finished");
    Ok(())
}

fn setup_tracing(args: &Args, level: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::from(level)
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout may carry the pipe transport
    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
