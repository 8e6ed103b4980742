use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

use work_end_alert::{
    activity::{server_url, system_hostname, Tracker},
    alert::WindowPresenter,
    config::{Config, ConfigStore, FileConfigStore},
    monitors::NativeMonitors,
    runtime::{Runner, Settings},
    snooze::SnoozeStore,
    util::snooze_options_or_default,
};

/// full-screen reminder to stop once today's active time passes your target
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Check today's active work time from ActivityWatch and, once it reaches the daily target, show an always-on-top alert on every display. The alert can be dismissed or snoozed; a snooze suppresses further alerts until it runs out."
)]
pub struct Cli {
    /// target work time in minutes (default: 480 = 8h, or the config file value)
    #[clap(long)]
    target: Option<u32>,

    /// ignore snooze timer and force check
    #[clap(long)]
    force: bool,

    /// comma separated list of snooze minutes (default: 15,30,60)
    #[clap(long)]
    snooze_options: Option<String>,

    /// host of the ActivityWatch server (default: 127.0.0.1)
    #[clap(long)]
    host: Option<String>,

    /// port of the ActivityWatch server (default: 5600)
    #[clap(long)]
    port: Option<u16>,

    /// talk to a testing ActivityWatch server (port 5666)
    #[clap(long)]
    testing: bool,

    /// path to a JSON config file
    #[clap(long)]
    config: Option<PathBuf>,

    /// verbose logging
    #[clap(short, long)]
    verbose: bool,
}

impl Cli {
    /// Command line values win over the config file
    fn to_settings(&self, config: &Config) -> Settings {
        let snooze_options = match &self.snooze_options {
            Some(raw) => snooze_options_or_default(raw),
            None => config.snooze_options(),
        };

        Settings {
            target_minutes: self.target.unwrap_or(config.target_minutes),
            snooze_options,
            force: self.force,
            hostname: config.hostname.clone().unwrap_or_else(system_hostname),
        }
    }

    fn server_url(&self, config: &Config) -> String {
        server_url(
            config.server_url.as_deref(),
            self.host.as_deref(),
            self.port,
            self.testing,
        )
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    // RUST_LOG still wins over the flag
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .init();
}

// Always exits 0: a run that hits trouble just doesn't alert.
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = config_store.load();
    log::debug!("Loaded config from {}: {:?}", config_store.path().display(), config);

    let settings = cli.to_settings(&config);
    let snooze = SnoozeStore::with_path(config.snooze_path());

    // An unusable address still runs the check, it just reads zero
    let tracker = Tracker::connect(&cli.server_url(&config));

    let presenter = WindowPresenter::new(NativeMonitors::default());
    Runner::new(tracker, presenter, snooze, settings).run();
}
