//! Subcommand implementations for the osm-geocoding binary.

use super::{Cli, Commands};
use crate::events::{Bounds, HostEvent, HostEvents, Key};
use crate::lifecycle::{GeocodingController, LifecycleState};
use anyhow::{Context, bail};
use osm_geocoding_client::{GeocodeQuery, GeocodeResult, NominatimClient};
use osm_geocoding_config::GeocoderConfig;
use std::io::{self, BufRead};
use std::path::Path;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Width of the pretend input line that `:click` coordinates are tested against.
const INPUT_WIDTH: f64 = 80.0;

/// Run the subcommand selected on the command line.
pub fn run(cli: &Cli, config: GeocoderConfig) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Search { address, json } => search(&config, address, *json),
        Commands::Interactive => interactive(config),
        Commands::Config { init, force } => show_config(&config, &cli.config_file(), *init, *force),
    }
}

/// One-shot query, bypassing the debouncer.
fn search(config: &GeocoderConfig, address: &str, json: bool) -> anyhow::Result<()> {
    let address = address.trim();
    if address.is_empty() {
        bail!("Address must not be empty");
    }

    let client = NominatimClient::from_config(config).context("Failed to create client")?;
    let query = GeocodeQuery::from_config(address, config);
    let results = client
        .search(&query)
        .with_context(|| format!("Search for {address:?} failed"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("No results for {address:?}");
    }
    for (index, result) in results.iter().enumerate() {
        println!("{}", format_result(index, result));
    }
    Ok(())
}

/// Print the effective config, or write it with `--init`.
fn show_config(config: &GeocoderConfig, path: &Path, init: bool, force: bool) -> anyhow::Result<()> {
    if !init {
        print!("{}", serde_yaml_ng::to_string(config)?);
        return Ok(());
    }
    if path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    config
        .save_to(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// A parsed line of `interactive` input.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractiveCommand {
    /// New contents of the input field.
    Text(String),
    Focus,
    Escape,
    Click { x: f64, y: f64 },
    /// One-based index as printed in the result list.
    Select(usize),
    Quit,
}

/// Parse one line of interactive input. Lines not starting with `:` are text.
pub fn parse_line(line: &str) -> Result<InteractiveCommand, String> {
    let Some(command) = line.trim_end().strip_prefix(':') else {
        return Ok(InteractiveCommand::Text(line.trim_end_matches(['\r', '\n']).to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match (name, args.as_slice()) {
        ("focus", []) => Ok(InteractiveCommand::Focus),
        ("esc", []) => Ok(InteractiveCommand::Escape),
        ("quit" | "q", []) => Ok(InteractiveCommand::Quit),
        ("click", [x, y]) => {
            let x = x.parse().map_err(|_| format!("invalid x coordinate: {x}"))?;
            let y = y.parse().map_err(|_| format!("invalid y coordinate: {y}"))?;
            Ok(InteractiveCommand::Click { x, y })
        }
        ("select", [n]) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(InteractiveCommand::Select(n)),
            _ => Err(format!("invalid result number: {n}")),
        },
        _ => Err(format!(
            "unknown command ':{command}' (try :focus, :esc, :click X Y, :select N, :quit)"
        )),
    }
}

/// `N. display name (lat, lon)` with a one-based `N`.
pub fn format_result(index: usize, result: &GeocodeResult) -> String {
    format!(
        "{:>2}. {} ({}, {})",
        index + 1,
        result.display_name,
        result.lat,
        result.lon
    )
}

/// Text block describing `state` for the terminal.
pub fn render_state(state: &LifecycleState) -> String {
    if state.is_loading {
        return format!("[loading] {:?}", state.query.trim());
    }
    if !state.is_visible {
        return if state.results.is_empty() {
            "[idle]".to_string()
        } else {
            format!("[closed] {} result(s) held, :focus to reopen", state.results.len())
        };
    }
    if state.results.is_empty() {
        return "[open] no results".to_string();
    }

    let mut out = format!("[open] {} result(s)", state.results.len());
    for (index, result) in state.results.iter().enumerate() {
        out.push('\n');
        out.push_str(&format_result(index, result));
    }
    out
}

/// Start-up text for `interactive`; the placeholder stands in for the empty input.
pub fn banner(config: &GeocoderConfig) -> String {
    format!(
        "{}: type and press Enter. The query is sent after {} ms without input.\n\
         Commands: :focus, :esc, :click X Y, :select N, :quit",
        config.placeholder, config.debounce_ms
    )
}

/// The parts of the state worth reprinting; query edits alone are not echoed.
fn rendered_fields(state: &LifecycleState) -> (bool, bool, &[GeocodeResult]) {
    (state.is_loading, state.is_visible, &state.results)
}

fn interactive(config: GeocoderConfig) -> anyhow::Result<()> {
    let runtime = Runtime::new().context("Failed to start tokio runtime")?;

    let controller = GeocodingController::builder(config)
        .runtime(runtime.handle().clone())
        .on_select(|result| {
            println!("Selected: {} ({}, {})", result.display_name, result.lat, result.lon);
        })
        .build()?;

    let events = HostEvents::new();
    let mount = controller.mount(&events);
    controller.set_root_bounds(Some(Bounds::new(0.0, 0.0, INPUT_WIDTH, 1.0)));

    let mut rx = controller.subscribe();
    let watcher = runtime.spawn(async move {
        let mut last = rx.borrow_and_update().clone();
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if rendered_fields(&state) != rendered_fields(&last) {
                println!("{}", render_state(&state));
            }
            last = state;
        }
    });

    eprintln!("{}", banner(controller.config()));

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match command {
            InteractiveCommand::Text(text) => controller.on_text_changed(&text),
            InteractiveCommand::Focus => controller.on_focus(),
            InteractiveCommand::Escape => events.dispatch(&HostEvent::KeyUp(Key::Escape)),
            InteractiveCommand::Click { x, y } => events.dispatch(&HostEvent::PointerDown { x, y }),
            InteractiveCommand::Select(n) => {
                if controller.select_index(n - 1).is_none() {
                    eprintln!("No result {n}");
                }
            }
            InteractiveCommand::Quit => break,
        }
    }

    drop(mount);
    drop(controller);
    watcher.abort();
    log::info!("Interactive session ended, shutting down runtime");
    runtime.shutdown_timeout(Duration::from_secs(2));
    Ok(())
}
