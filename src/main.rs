//! SmartSync Firmware — Main Entry Point
//!
//! Hexagonal architecture with a run-to-completion command loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  BleAdapter       HardwareAdapter   NvsAdapter           │
//! │  (channel+sink)   (ActuatorPort)    (ConfigPort)         │
//! │  Esp32ClockAdapter (ClockPort)                           │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ────────────────   │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │            Controller (pure logic)                 │  │
//! │  │  parse · dispatch · usage learner                  │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
mod adaptive;
mod app;
pub mod config;
mod pins;
mod proto;

mod adapters;
mod drivers;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use adapters::ble::BleAdapter;
use adapters::hardware::HardwareAdapter;
use adapters::nvs::NvsAdapter;
use adapters::time::Esp32ClockAdapter;
use adaptive::UsageLearner;
use app::ports::ConfigPort;
use app::service::Controller;
use config::SystemConfig;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SmartSync v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new() {
        Ok(nvs) => match nvs.load() {
            Ok(cfg) => {
                info!("Config loaded from NVS");
                cfg
            }
            Err(e) => {
                warn!("NVS config load failed ({}), rewriting defaults", e);
                let cfg = SystemConfig::default();
                if let Err(e) = nvs.save(&cfg) {
                    warn!("NVS config rewrite failed ({})", e);
                }
                cfg
            }
        },
        Err(e) => {
            warn!("NVS init failed ({}), running with default config", e);
            SystemConfig::default()
        }
    };

    // ── 3. Initialise hardware peripherals ────────────────────
    // After config load: the fan LEDC timer frequency is configurable.
    if let Err(e) = drivers::hw_init::init_peripherals(&config) {
        // Peripheral init failure is critical — log and halt.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 4. Construct adapters ─────────────────────────────────
    let clock = Esp32ClockAdapter::new();
    let mut hw = HardwareAdapter::new();

    let mut ble = BleAdapter::new(config.device_name.clone());
    ble.start();

    // ── 5. Construct controller ───────────────────────────────
    let mut controller = Controller::new(UsageLearner::new());

    info!("System ready. Entering command loop.");

    // ── 6. Command loop ───────────────────────────────────────
    //
    // Strictly run-to-completion: each queued line is fully dispatched
    // (actuation, learner ingest, notify) before the next is popped.
    let mut heartbeat_marker: u64 = 0;

    loop {
        #[cfg(target_os = "espidf")]
        {
            ble.sync_connection_state();
            // Drain raw GATT writes buffered by the Bluedroid callback.
            while let Some(raw) = adapters::ble::take_command_data() {
                if let Err(e) = ble.on_command_write(&raw) {
                    warn!("channel: rejected write — {}", e);
                }
            }
        }

        while let Some(line) = ble.pop_line() {
            controller.handle_line(&line, &mut hw, &clock, &mut ble);
        }

        // Status heartbeat every ~5 minutes.
        let period = clock.uptime_secs() / 300;
        if period != heartbeat_marker {
            heartbeat_marker = period;
            info!(
                "up {}s, {} commands handled, ble={:?}",
                clock.uptime_secs(),
                controller.commands_handled(),
                ble.state()
            );
        }

        // The Bluedroid task keeps buffering writes while we sleep; on
        // ESP-IDF std sleep maps to vTaskDelay.
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
}
