//! Build script for ranger-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates ranger.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys accepted in each section
const SENSOR_KEYS: &[&str] = &[
    "source_clock_hz",
    "prescaler",
    "speed_of_sound_cm_s",
    "max_range_cm",
    "trigger_width_us",
    "poll_interval_us",
    "echo_timeout_us",
];
const DISPLAY_KEYS: &[&str] = &["rows", "columns", "row", "value_col", "value_width"];
const RANGING_KEYS: &[&str] = &["interval_ms"];

const PRESCALER_NAMES: &[&str] = &["stopped", "div1", "div8", "div64", "div256", "div1024"];
const PRESCALER_DIVISORS: &[i64] = &[1, 8, 64, 256, 1024];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate ranger.toml configuration at compile time
fn validate_config() {
    // Re-run if ranger.toml changes
    println!("cargo:rerun-if-changed=ranger.toml");

    let config_path = Path::new("ranger.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: ranger.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds ranger.toml as its configuration.           ║\n\
            ║  Please create one in the ranger-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read ranger.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in ranger.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_layout(&config, &mut errors);
    validate_sensor(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_ranging(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in ranger.toml                     ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=ranger.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only known sections, each a table holding only known keys
///
/// The firmware's parser supports neither top-level keys nor nested
/// tables, so both are rejected here as well.
fn validate_layout(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (name, section) in root {
        let known = match name.as_str() {
            "sensor" => SENSOR_KEYS,
            "display" => DISPLAY_KEYS,
            "ranging" => RANGING_KEYS,
            _ => {
                errors.push(format!("unknown section or key '{}'", name));
                continue;
            }
        };

        let Some(table) = section.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };

        for (key, value) in table {
            if !known.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
            if value.is_table() || value.is_array() {
                errors.push(format!("[{}] {} must be a plain value", name, key));
            }
        }
    }
}

/// Integer value of `section.key`, if present and an integer
fn int(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    match config.get(section)?.get(key)? {
        toml::Value::Integer(v) => Some(*v),
        _ => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
    }
}

/// Check `section.key` lies in `min..=max` and return it
fn ranged(
    config: &toml::Value,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) -> Option<i64> {
    let value = int(config, section, key, errors)?;
    if value < min || value > max {
        errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
    }
    Some(value)
}

fn validate_sensor(config: &toml::Value, errors: &mut Vec<String>) {
    let u32_max = u32::MAX as i64;

    ranged(config, "sensor", "source_clock_hz", 1, u32_max, errors);
    ranged(config, "sensor", "speed_of_sound_cm_s", 1, u32_max, errors);
    ranged(config, "sensor", "max_range_cm", 1, 10_000, errors);
    ranged(config, "sensor", "trigger_width_us", 1, 1_000, errors);
    ranged(config, "sensor", "poll_interval_us", 1, 100_000, errors);
    ranged(config, "sensor", "echo_timeout_us", 1, u32_max, errors);

    match config.get("sensor").and_then(|s| s.get("prescaler")) {
        None => {}
        Some(toml::Value::Integer(div)) => {
            if !PRESCALER_DIVISORS.contains(div) {
                errors.push("[sensor] prescaler must be 1, 8, 64, 256 or 1024".to_string());
            }
        }
        Some(toml::Value::String(name)) => {
            if name == "stopped" {
                errors.push("[sensor] prescaler 'stopped' never measures".to_string());
            } else if !PRESCALER_NAMES.contains(&name.as_str()) {
                errors.push(format!("[sensor] unknown prescaler '{}'", name));
            }
        }
        Some(_) => errors.push("[sensor] prescaler must be an integer or name".to_string()),
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    let rows = ranged(config, "display", "rows", 1, 4, errors).unwrap_or(2);
    let columns = ranged(config, "display", "columns", 1, 40, errors).unwrap_or(16);
    let row = ranged(config, "display", "row", 0, 3, errors).unwrap_or(0);
    let value_col = ranged(config, "display", "value_col", 0, 39, errors).unwrap_or(10);
    let value_width = ranged(config, "display", "value_width", 1, 8, errors).unwrap_or(3);

    if row >= rows {
        errors.push(format!("[display] row {} is off a {}-row display", row, rows));
    }
    if value_col + value_width > columns {
        errors.push(format!(
            "[display] value field ends past column {}",
            columns - 1
        ));
    }
}

fn validate_ranging(config: &toml::Value, errors: &mut Vec<String>) {
    ranged(config, "ranging", "interval_ms", 1, 60_000, errors);
}
