//! Device configuration
//!
//! device.toml is embedded at compile time and parsed at boot by a
//! minimal TOML-subset parser. Only what the configuration needs is
//! supported:
//!
//! - `key = value` pairs (integers)
//! - `[section]` headers
//! - Comments (`# ...`)
//!
//! Unknown sections and keys are ignored so a newer config file keeps
//! booting older firmware; malformed values are a [`ParseError`].

use quadrant_core::frame::Rotation;
use quadrant_core::pump::DEFAULT_TICK_PERIOD_MS;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Section header is not `[name]`
    InvalidSection,
    /// Value is not an integer or is out of range
    InvalidValue,
}

/// Display geometry and buffering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Native panel width in pixels
    pub width: u16,
    /// Native panel height in pixels
    pub height: u16,
    /// Boot orientation
    pub rotation: Rotation,
    /// Each partial draw buffer holds `panel_area / buffer_divisor` pixels
    pub buffer_divisor: u32,
}

/// Complete device configuration with defaults for every field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub display: DisplayConfig,
    /// Render loop tick quantum in milliseconds
    pub tick_period_ms: u32,
    /// Touch poll interval in milliseconds
    pub input_poll_ms: u32,
    /// Sensor poll interval in milliseconds
    pub sensor_poll_ms: u32,
    /// Backlight level; 0 is off
    pub backlight_level: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig {
                width: 240,
                height: 320,
                rotation: Rotation::Deg0,
                buffer_divisor: 8,
            },
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            input_poll_ms: 10,
            sensor_poll_ms: 100,
            backlight_level: 100,
        }
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    Tick,
    Input,
    Sensors,
    Backlight,
    /// Recognized as a section but not consumed by this firmware
    Unknown,
}

/// Parse device.toml content into a [`DeviceConfig`]
pub fn parse_config(input: &str) -> Result<DeviceConfig, ParseError> {
    let mut config = DeviceConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = match &line[1..line.len() - 1] {
                "display" => Section::Display,
                "tick" => Section::Tick,
                "input" => Section::Input,
                "sensors" => Section::Sensors,
                "backlight" => Section::Backlight,
                _ => Section::Unknown,
            };
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(ParseError::InvalidValue);
        };
        let key = key.trim();
        // Strip trailing comments
        let value = match value.split_once('#') {
            Some((v, _)) => v.trim(),
            None => value.trim(),
        };

        apply_key(&mut config, section, key, value)?;
    }

    Ok(config)
}

fn apply_key(
    config: &mut DeviceConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Display, "width") => config.display.width = parse_u16_nonzero(value)?,
        (Section::Display, "height") => config.display.height = parse_u16_nonzero(value)?,
        (Section::Display, "rotation") => {
            config.display.rotation = match parse_u32(value)? {
                0 => Rotation::Deg0,
                90 => Rotation::Deg90,
                180 => Rotation::Deg180,
                270 => Rotation::Deg270,
                _ => return Err(ParseError::InvalidValue),
            };
        }
        (Section::Display, "buffer_divisor") => {
            let d = parse_u32(value)?;
            if !(1..=32).contains(&d) {
                return Err(ParseError::InvalidValue);
            }
            config.display.buffer_divisor = d;
        }
        (Section::Tick, "period_ms") => config.tick_period_ms = parse_period(value)?,
        (Section::Input, "poll_ms") => config.input_poll_ms = parse_period(value)?,
        (Section::Sensors, "poll_ms") => config.sensor_poll_ms = parse_period(value)?,
        (Section::Backlight, "level") => {
            let level = parse_u32(value)?;
            if level > 100 {
                return Err(ParseError::InvalidValue);
            }
            config.backlight_level = level as u8;
        }
        // Unknown keys and sections are ignored
        _ => {}
    }
    Ok(())
}

fn parse_u32(value: &str) -> Result<u32, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_u16_nonzero(value: &str) -> Result<u16, ParseError> {
    match value.parse() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_period(value: &str) -> Result<u32, ParseError> {
    match parse_u32(value)? {
        0 => Err(ParseError::InvalidValue),
        ms => Ok(ms),
    }
}
