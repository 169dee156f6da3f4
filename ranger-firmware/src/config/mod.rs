//! Configuration loading
//!
//! The configuration is `ranger.toml`, embedded at compile time and parsed
//! with the `no_std` parser from `ranger-core`. `build.rs` has already
//! rejected an invalid file, so the fallback below only guards against the
//! two parsers disagreeing.

use defmt::*;

use ranger_core::config::{parse_config, RangerConfig};
use ranger_hal_rp2040::SOURCE_CLOCK_HZ;

/// Embedded configuration (compiled into firmware)
/// Edit ranger.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../ranger.toml");

/// Parse the embedded configuration, falling back to defaults
pub fn load() -> RangerConfig {
    let mut config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            RangerConfig::default()
        }
    };

    // The capture counter runs off the timebase, whatever the file says
    if config.sensor.source_clock_hz != SOURCE_CLOCK_HZ {
        warn!(
            "source_clock_hz = {} does not match the {} Hz timebase, overriding",
            config.sensor.source_clock_hz, SOURCE_CLOCK_HZ
        );
        config.sensor.source_clock_hz = SOURCE_CLOCK_HZ;
    }

    config
}
