//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to              |
//! |------------|---------------------|--------------------------|
//! | `hardware` | ButtonLine          | button pad GPIO          |
//! |            | DockSensor          | dock status ADC / GPIO   |
//! |            | StatusIndicator     | status LED (LEDC PWM)    |
//! | `log_sink` | EventSink           | Serial log output        |
//! | `mdns`     | -                   | ESP-IDF mDNS responder   |
//! | `ota_tcp`  | UpdateTransport     | TCP listener (lwIP)      |
//! | `time`     | Clock               | ESP32 system timer       |
//! | `wifi`     | ConnectivityPort    | ESP-IDF WiFi STA         |

pub mod hardware;
pub mod log_sink;
pub mod mdns;
pub mod ota_tcp;
pub mod time;
pub mod wifi;
