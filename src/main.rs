//! Wii Remote bridge CLI
//!
//! Opens paired controllers and relays their reports the way an emulator
//! host would, logging every delivered frame.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, warn};

use wiimote_bridge::{output_frame, BridgeConfig, InputSink, SessionRegistry};
use wiimote_transport::protocol::{build_report_mode, input, is_continuous_report};
use wiimote_transport::{DeviceDiscovery, HidDiscovery};

mod cli;
use cli::{Cli, Commands};

/// Logs frames; periodic reports at debug level, everything else at info
struct LogSink;

impl InputSink for LogSink {
    fn on_input_report(&self, channel_id: u16, frame: &[u8]) {
        let report_id = frame.get(1).copied().unwrap_or(0);
        if is_continuous_report(report_id) {
            debug!(
                "ch 0x{:04X} {}: {:02X?}",
                channel_id,
                input::name(report_id),
                &frame[..frame.len().min(8)]
            );
        } else {
            info!(
                "ch 0x{:04X} {}: {:02X?}",
                channel_id,
                input::name(report_id),
                frame
            );
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = cli.config.unwrap_or_else(BridgeConfig::default_path);
    let config = BridgeConfig::load(&config_path)?;
    debug!("Loaded config from {:?}", config_path);

    match cli.command {
        Some(Commands::List) | None => list(&config),
        Some(Commands::Run {
            channel,
            mode,
            ticks,
            max_devices,
        }) => {
            let mut config = config;
            if let Some(max) = max_devices {
                config.max_devices = max;
            }
            run(config, channel, mode, ticks)
        }
        Some(Commands::Config { save }) => show_config(&config, &config_path, save),
    }
}

fn discovery_for(config: &BridgeConfig) -> HidDiscovery {
    HidDiscovery::new()
        .with_search_timeout(config.discovery_timeout())
        .with_read_timeout(config.read_timeout())
}

fn list(config: &BridgeConfig) -> Result<()> {
    let devices = discovery_for(config).list_devices()?;
    if devices.is_empty() {
        println!("No Wii Remote found. Pair one with the system Bluetooth stack first.");
        return Ok(());
    }

    for (i, device) in devices.iter().enumerate() {
        println!(
            "{}: {} [{:04X}:{:04X}] {}{}",
            i + 1,
            device.display_name(),
            device.vid,
            device.pid,
            device.device_path,
            device
                .serial
                .as_deref()
                .map(|s| format!(" ({s})"))
                .unwrap_or_default()
        );
    }
    Ok(())
}

fn run(config: BridgeConfig, channel: Option<u16>, mode: u8, ticks: Option<u64>) -> Result<()> {
    let tick = config.tick();
    let discovery = discovery_for(&config);
    let mut bridge = SessionRegistry::new(config, Arc::new(LogSink));

    let count = bridge.initialize(&discovery)?;
    if count == 0 {
        warn!("No Wii Remote found, nothing to do");
        return Ok(());
    }

    if let Some(channel) = channel {
        let request = output_frame(&build_report_mode(mode, false));
        bridge.control_channel(channel, &request)?;
        info!(
            "Opened channel 0x{:04X}, requested mode {}",
            channel,
            input::name(mode)
        );
    } else {
        info!("No channel given, input is read but not delivered");
    }

    let running = setup_interrupt_handler();
    let started = Instant::now();
    let mut tick_count: u64 = 0;
    let mut delivered: usize = 0;

    while running.load(Ordering::SeqCst) && ticks.is_none_or(|limit| tick_count < limit) {
        delivered += bridge.update();
        tick_count += 1;
        std::thread::sleep(tick);
    }

    for (session, stats) in bridge.sessions().iter().zip(bridge.stats()) {
        info!("Wiimote {}: {:?}", session.index(), stats);
    }
    bridge.shutdown();
    info!(
        "Delivered {} frames in {} ticks ({:.1}s)",
        delivered,
        tick_count,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

fn show_config(config: &BridgeConfig, path: &Path, save: bool) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    if save {
        config.save(path)?;
        println!("# saved to {}", path.display());
    }
    Ok(())
}

/// Set up a Ctrl-C handler that clears the returned flag when triggered
fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .ok();

    running
}
