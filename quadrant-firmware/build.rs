//! Build script for quadrant-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

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

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate device.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");
    if !config_path.exists() {
        panic!("device.toml not found - the firmware requires a device configuration file");
    }

    let content = fs::read_to_string(config_path)
        .unwrap_or_else(|e| panic!("failed to read device.toml: {}", e));

    let config: toml::Value = toml::from_str(&content)
        .unwrap_or_else(|e| panic!("invalid TOML syntax in device.toml:\n{}", e));

    let mut errors = Vec::new();
    validate_display(&config, &mut errors);
    validate_periods(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "invalid device.toml:\n{}",
            errors
                .iter()
                .map(|e| format!("  - {}", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

fn get_int(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    if config.get("display").is_none() {
        errors.push("missing [display] section".into());
        return;
    }

    match get_int(config, "display", "width") {
        Some(w) if (1..=1024).contains(&w) => {}
        Some(_) => errors.push("[display] width must be 1-1024".into()),
        None => errors.push("[display] missing 'width'".into()),
    }
    match get_int(config, "display", "height") {
        Some(h) if (1..=1024).contains(&h) => {}
        Some(_) => errors.push("[display] height must be 1-1024".into()),
        None => errors.push("[display] missing 'height'".into()),
    }
    match get_int(config, "display", "rotation") {
        Some(0) | Some(90) | Some(180) | Some(270) | None => {}
        Some(_) => errors.push("[display] rotation must be 0, 90, 180 or 270".into()),
    }
    match get_int(config, "display", "buffer_divisor") {
        Some(d) if (1..=32).contains(&d) => {}
        Some(_) => errors.push("[display] buffer_divisor must be 1-32".into()),
        None => {}
    }
}

fn validate_periods(config: &toml::Value, errors: &mut Vec<String>) {
    for (section, key) in [("tick", "period_ms"), ("input", "poll_ms"), ("sensors", "poll_ms")] {
        match get_int(config, section, key) {
            Some(v) if (1..=60_000).contains(&v) => {}
            Some(_) => errors.push(format!("[{}] {} must be 1-60000", section, key)),
            None => {}
        }
    }
}
