//! Gas Meter Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   WifiLink     MqttBroker    HttpInspection   │
//! │  (SensorPort)      (LinkPort)   (BrokerPort)  (InspectionPort) │
//! │  SystemClock       LogEventSink BuildEnvConfig                 │
//! │  (ClockPort)       (EventSink)  (ConfigPort)                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  AppService: EdgeCounter · TelemetryScheduler · Router │    │
//! │  │  ConnectivitySupervisor: link + broker health, retry   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, bail};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{error, info, warn};

use gasmeter::adapters::credentials::BuildEnvConfig;
use gasmeter::adapters::device_id;
use gasmeter::adapters::hardware::HardwareAdapter;
use gasmeter::adapters::http::HttpInspectionServer;
use gasmeter::adapters::log_sink::LogEventSink;
use gasmeter::adapters::mqtt::{BrokerSettings, MqttBroker};
use gasmeter::adapters::time::{SystemClock, start_sntp};
use gasmeter::adapters::wifi::WifiLink;
use gasmeter::app::ports::{ClockPort, ConfigPort};
use gasmeter::app::service::AppService;
use gasmeter::connectivity::{ConnectivitySupervisor, RetryPolicy};
use gasmeter::drivers::hw_init::{self, SensorPins};
use gasmeter::error::Error;
use gasmeter::sensors::SensorHub;
use gasmeter::sensors::analog::MeterVoltageSensor;
use gasmeter::sensors::pulse::PulseInput;
use gasmeter::sensors::temperature::TemperatureSensor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  GasMeter v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (fatal if missing or invalid) ────────
    let mac = device_id::read_mac();
    let dev_id = device_id::device_id(&mac);
    let config = match BuildEnvConfig::from_build_env().load() {
        Ok(cfg) => cfg.with_device_id_fallback(&dev_id),
        Err(e) => {
            error!("Config: {} — halting", e);
            bail!(Error::from(e));
        }
    };
    if let Err(e) = config.validate() {
        error!("Config: {} — halting", e);
        bail!(Error::from(e));
    }
    info!("Device ID: {} (factory {})", config.device_id, dev_id);

    // ── 3. Sensors ────────────────────────────────────────────
    let pins = match SensorPins::resolve(
        config.analog_gpio,
        config.pulse_gpio,
        config.temperature_gpio,
    ) {
        Ok(p) => p,
        Err(e) => bail!("pin assignment: {}", e),
    };
    if let Err(e) = hw_init::init_peripherals(&pins) {
        bail!("HAL init failed: {}", e);
    }
    let hub = SensorHub::new(
        MeterVoltageSensor::new(pins.analog_channel, config.analog_full_scale_volts),
        PulseInput::new(pins.pulse_gpio),
        pins.temperature_channel.map(TemperatureSensor::new),
    );
    let mut hw = HardwareAdapter::new(hub);

    // ── 4. Network stack ──────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;

    let link = WifiLink::new(wifi, &config.ssid, &config.password);
    let broker = MqttBroker::new(BrokerSettings::from_config(&config));
    let mut net = ConnectivitySupervisor::new(
        link,
        broker,
        FreeRtos,
        RetryPolicy::unbounded(config.link_retry_delay_ms),
        RetryPolicy::unbounded(config.broker_retry_delay_ms),
    );

    // ── 5. Bring both sessions up before entering the loop ────
    if let Err(e) = net.ensure_ready() {
        warn!("Startup: sessions not ready ({}), continuing", e);
    }
    let _sntp = match start_sntp() {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("SNTP: start failed ({}), timestamps use the RTC", e);
            None
        }
    };
    info!(
        "Network: '{}' ip={:?}",
        net.link().ssid(),
        net.link().ip_addr()
    );

    // ── 6. Inspection server ──────────────────────────────────
    let mut http = HttpInspectionServer::bind(config.http_port)?;

    // ── 7. Control loop ───────────────────────────────────────
    let clock = SystemClock::new();
    let mut sink = LogEventSink::new();
    let sample_interval_ms = config.sample_interval_ms;
    let mut app = AppService::new(config, clock.monotonic_ms());
    app.start(&mut sink);

    info!("System ready. Entering control loop.");
    loop {
        app.tick(&clock, &mut hw, &mut http, &mut net, &mut sink);
        FreeRtos::delay_ms(sample_interval_ms);
    }
}
