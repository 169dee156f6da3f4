//! Simple TOML parser for the ranger configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `ranger.toml`. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - [section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings
//! - Arrays and tables
//! - Dotted keys

use ranger_hal::capture::ClockSelect;

use super::types::{ConfigError, DisplayConfig, RangerConfig, SensorConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Line is neither a header nor a key/value pair
    InvalidLine,
    /// Invalid value type or out of range
    InvalidValue,
    /// Values parsed but do not form a usable configuration
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Sensor,
    Display,
    Ranging,
}

/// Parse TOML configuration into a validated [`RangerConfig`]
///
/// Missing keys keep their defaults.
pub fn parse_config(input: &str) -> Result<RangerConfig, ParseError> {
    let mut config = RangerConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        match section {
            Section::Root => return Err(ParseError::UnknownKey),
            Section::Sensor => apply_sensor(&mut config.sensor, key, value)?,
            Section::Display => apply_display(&mut config.display, key, value)?,
            Section::Ranging => match key {
                "interval_ms" => config.interval_ms = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            },
        }
    }

    config.sensor.validate()?;
    Ok(config)
}

/// Parse a section header like "[sensor]"
fn parse_section_header(line: &str) -> Result<Section, ParseError> {
    let header = line
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or(ParseError::InvalidSection)?;

    match header.trim() {
        "sensor" => Ok(Section::Sensor),
        "display" => Ok(Section::Display),
        "ranging" => Ok(Section::Ranging),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_sensor(sensor: &mut SensorConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "source_clock_hz" => sensor.source_clock_hz = parse_int(value)?,
        "prescaler" => sensor.clock = parse_prescaler(value)?,
        "speed_of_sound_cm_s" => sensor.speed_of_sound_cm_s = parse_int(value)?,
        "max_range_cm" => sensor.max_range_cm = parse_int(value)?,
        "trigger_width_us" => sensor.trigger_width_us = parse_int(value)?,
        "poll_interval_us" => sensor.poll_interval_us = parse_int(value)?,
        "echo_timeout_us" => sensor.echo_timeout_us = Some(parse_int(value)?),
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_display(display: &mut DisplayConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "rows" => display.rows = parse_int(value)?,
        "columns" => display.columns = parse_int(value)?,
        "row" => display.row = parse_int(value)?,
        "value_col" => display.value_col = parse_int(value)?,
        "value_width" => display.value_width = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Parse a line like `key = value # comment`
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Parse an integer value, allowing quotes and `_` digit separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits = heapless::String::<24>::new();
    for c in parse_string(value).chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a prescaler: a divisor (`64`) or a name (`"div64"`, `"stopped"`)
fn parse_prescaler(value: &str) -> Result<ClockSelect, ParseError> {
    match parse_string(value) {
        "stopped" => Ok(ClockSelect::Stopped),
        "div1" => Ok(ClockSelect::Div1),
        "div8" => Ok(ClockSelect::Div8),
        "div64" => Ok(ClockSelect::Div64),
        "div256" => Ok(ClockSelect::Div256),
        "div1024" => Ok(ClockSelect::Div1024),
        other => ClockSelect::from_divisor(parse_int(other)?).ok_or(ParseError::InvalidValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Ranger configuration

[sensor]
source_clock_hz = 8_000_000
prescaler = 8            # 1 µs ticks
max_range_cm = 200
trigger_width_us = 12

[display]
columns = 20
value_col = "12"

[ranging]
interval_ms = 250
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();

        assert_eq!(config.sensor.source_clock_hz, 8_000_000);
        assert_eq!(config.sensor.clock, ClockSelect::Div8);
        assert_eq!(config.sensor.max_range_cm, 200);
        assert_eq!(config.sensor.trigger_width_us, 12);
        assert_eq!(config.sensor.speed_of_sound_cm_s, 34_000);
        assert_eq!(config.sensor.echo_timeout_us, None);
        assert_eq!(config.display.columns, 20);
        assert_eq!(config.display.value_col, 12);
        assert_eq!(config.display.rows, 2);
        assert_eq!(config.interval_ms, 250);
    }

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(parse_config(""), Ok(RangerConfig::default()));
    }

    #[test]
    fn test_named_prescaler() {
        let config = parse_config("[sensor]\nsource_clock_hz = 16000000\nprescaler = \"div64\"\n")
            .unwrap();
        assert_eq!(config.sensor.clock, ClockSelect::Div64);
        assert_eq!(config.sensor.calibration().map(|c| c.factor()), Ok(14));
    }

    #[test]
    fn test_explicit_timeout() {
        let config = parse_config("[sensor]\necho_timeout_us = 30000\n").unwrap();
        assert_eq!(config.sensor.echo_timeout_us, Some(30_000));
    }

    #[test]
    fn test_rejects_unknown_section() {
        assert_eq!(
            parse_config("[heater]\npower = 1\n"),
            Err(ParseError::InvalidSection)
        );
        assert_eq!(parse_config("[sensor\n"), Err(ParseError::InvalidSection));
    }

    #[test]
    fn test_rejects_unknown_key() {
        assert_eq!(
            parse_config("[sensor]\nspeed = 1\n"),
            Err(ParseError::UnknownKey)
        );
        assert_eq!(parse_config("interval_ms = 5\n"), Err(ParseError::UnknownKey));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            parse_config("[sensor]\nprescaler = 32\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[display]\nrows = 300\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[ranging]\ninterval_ms = soon\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(parse_config("[sensor]\njunk\n"), Err(ParseError::InvalidLine));
    }

    #[test]
    fn test_rejects_unusable_sensor() {
        assert_eq!(
            parse_config("[sensor]\nprescaler = \"stopped\"\n"),
            Err(ParseError::Invalid(ConfigError::ClockStopped))
        );
        assert_eq!(
            parse_config("[sensor]\npoll_interval_us = 0\n"),
            Err(ParseError::Invalid(ConfigError::ZeroPollInterval))
        );
        assert_eq!(
            parse_config("[sensor]\ntrigger_width_us = 0\n"),
            Err(ParseError::Invalid(ConfigError::ZeroTriggerWidth))
        );
        assert_eq!(
            parse_config("[sensor]\necho_timeout_us = 0\n"),
            Err(ParseError::Invalid(ConfigError::ZeroEchoTimeout))
        );
    }
}
