//! Command line front end for the indicator light.

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use clap::{Parser, Subcommand};
use handheld_led::{Channel, Duration, EffectId, EffectScheduler, Instant, LedConfig, LedError};
use log::{LevelFilter, error, info};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

const WAIT_POLL: core::time::Duration = core::time::Duration::from_millis(20);

#[derive(Parser)]
#[command(name = "ledctl", version, about = "Drive the handheld RGB indicator light")]
struct Opts {
    /// TOML file with channel paths and timings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in effects
    List,
    /// Run an effect until it completes
    Effect {
        name: String,
        /// Stop the effect after this many milliseconds
        #[arg(long)]
        for_ms: Option<u64>,
    },
    /// Show a solid color; components are clamped to 0..=255
    Color { r: i32, g: i32, b: i32 },
    /// Set a single channel
    Channel {
        #[arg(value_parser = parse_channel)]
        channel: Channel,
        value: i32,
    },
    /// Turn the light off
    Off,
}

fn parse_channel(s: &str) -> Result<Channel, String> {
    Channel::parse_from_str(s).ok_or_else(|| format!("expected red, green or blue, got {s:?}"))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let config = ConfigBuilder::new().set_thread_level(LevelFilter::Debug).build();
    // A second logger is the only failure mode; keep the first one.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn load_config(path: Option<&PathBuf>) -> Result<LedConfig, LedError> {
    match path {
        Some(path) => LedConfig::load(path),
        None => Ok(LedConfig::default()),
    }
}

/// Block until the current effect ends, or stop it at `limit`
fn wait_for_effect(scheduler: &EffectScheduler, limit: Option<Duration>) {
    let deadline = limit.map(|limit| Instant::now() + limit);
    while scheduler.is_effect_active() {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            info!("time limit reached, stopping effect");
            scheduler.stop_current_effect();
            return;
        }
        thread::sleep(WAIT_POLL);
    }
}

#[allow(clippy::print_stdout)]
fn list() {
    for id in EffectId::ALL {
        println!("{:>2} {}", id.raw(), id);
    }
}

fn run(opts: &Opts) -> Result<ExitCode, LedError> {
    if let Command::List = opts.command {
        list();
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(opts.config.as_ref())?;
    let scheduler = EffectScheduler::sysfs(&config);
    match &opts.command {
        Command::Effect { name, for_ms } => {
            if !scheduler.start_effect_named(name) {
                error!("could not start effect {:?}", name);
                return Ok(ExitCode::FAILURE);
            }
            wait_for_effect(&scheduler, for_ms.map(Duration::from_millis));
        }
        Command::Color { r, g, b } => scheduler.set_color(*r, *g, *b)?,
        Command::Channel { channel, value } => scheduler.set_channel(*channel, *value)?,
        Command::Off => scheduler.turn_off()?,
        Command::List => {}
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    init_logging(opts.verbose);
    run(&opts).unwrap_or_else(|err| {
        error!("{}", err);
        ExitCode::FAILURE
    })
}
