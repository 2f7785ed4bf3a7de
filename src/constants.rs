//! Sensor Node Protocol Constants
//!
//! Byte values of the downlink command protocol and the physical limits the
//! built-in schemas validate against.

/// Downlink message class: configuration change
pub const DOWNLINK_CLASS_CONFIG: u8 = 0x01;

/// Downlink message class: one-shot command
pub const DOWNLINK_CLASS_COMMAND: u8 = 0x02;

/// Command opcode: reboot the node
pub const COMMAND_RESET: u8 = 0x01;

/// Command opcode: take and transmit a reading immediately
pub const COMMAND_FORCE_READ: u8 = 0x02;

/// Config sub-type: reporting interval
pub const CONFIG_SET_INTERVAL: u8 = 0x01;

/// Length of a COMMAND frame
pub const COMMAND_FRAME_LEN: usize = 2;

/// Length of a CONFIG set-interval frame
pub const CONFIG_FRAME_LEN: usize = 5;

/// Largest reporting interval the 24-bit field can carry
pub const MAX_INTERVAL_SECS: u32 = 0x00FF_FFFF;

/// LoRaWAN port downlinks are sent on
pub const DOWNLINK_PORT: u8 = 1;

/// Operating range of the temperature sensor (°C)
pub const TEMPERATURE_MIN: f64 = -40.0;
pub const TEMPERATURE_MAX: f64 = 85.0;

/// Relative humidity (%)
pub const HUMIDITY_MIN: f64 = 0.0;
pub const HUMIDITY_MAX: f64 = 100.0;

/// Barometric pressure (hPa)
pub const PRESSURE_MIN: f64 = 900.0;
pub const PRESSURE_MAX: f64 = 1100.0;

/// Received signal strength (dBm)
pub const RSSI_MIN: f64 = -120.0;
pub const RSSI_MAX: f64 = 0.0;
