//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements      | Connects to                  |
//! |----------------|-----------------|------------------------------|
//! | `hardware`     | SensorPort      | ESP32 ADC, GPIO              |
//! | `wifi`         | LinkPort        | ESP-IDF WiFi STA             |
//! | `mqtt`         | BrokerPort      | ESP-IDF MQTT client          |
//! | `http`         | InspectionPort  | ESP-IDF httpd / tiny_http    |
//! | `time`         | ClockPort       | ESP32 system timer + SNTP    |
//! | `log_sink`     | EventSink       | Serial log output            |
//! | `credentials`  | ConfigPort      | Build-time environment       |
//! | `device_id`    |:               | Factory MAC (eFuse)          |

pub mod credentials;
pub mod device_id;
pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
