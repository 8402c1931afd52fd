use anyhow::Result;
use clap::Parser;
use osm_geocoding::cli::{self, Cli, LogLevelArg};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Routes all log::info!() etc. to the temp-dir log file, mirrored to stderr
    // when RUST_LOG is set. --log-level wins, then RUST_LOG, then config (below).
    osm_geocoding::debug::init_log_bridge(cli.log_level.map(LogLevelArg::to_level_filter));

    let result = cli.resolve_config().and_then(|config| {
        osm_geocoding::debug::apply_config_level(config.log_level.to_level_filter());
        log::info!("Starting osm-geocoding {}", osm_geocoding::VERSION);
        cli::commands::run(&cli, config)
    });

    if let Err(e) = result {
        eprintln!("osm-geocoding: error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
