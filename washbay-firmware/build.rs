//! Build script for washbay-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates stations.toml at compile time
//! - Generates the static station recipe table from it

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// H-bridge channels on the board (board::CHANNEL_COUNT)
const BOARD_CHANNELS: i64 = 6;

/// Stations the controller can hold (washbay_core::config::MAX_STATIONS)
const MAX_STATIONS: usize = 8;

/// Largest speed an actuator accepts (washbay_core::traits::MAX_INTENSITY)
const MAX_INTENSITY: i64 = 255;

/// Longest stage the sequencer can time (washbay_core::traits::MAX_ELAPSED_MS)
const MAX_STAGE_MS: i64 = i32::MAX as i64;

const STATION_KEYS: &[&str] = &[
    "id",
    "pump",
    "washer",
    "pump_speed",
    "pump_reverse_speed",
    "washer_speed",
    "pump_stage_ms",
    "wash_stage_ms",
];

const DEFAULT_KEYS: &[&str] = &[
    "pump_speed",
    "washer_speed",
    "pump_stage_ms",
    "wash_stage_ms",
];

/// One fully resolved station
struct Station {
    id: i64,
    pump: i64,
    washer: i64,
    pump_forward_speed: i64,
    pump_reverse_speed: i64,
    washer_speed: i64,
    pump_stage_ms: i64,
    wash_stage_ms: i64,
}

/// Values used when a station does not override them
struct Defaults {
    pump_speed: i64,
    washer_speed: i64,
    pump_stage_ms: i64,
    wash_stage_ms: i64,
}

fn main() {
    setup_linker();
    let stations = validate_config();
    generate_recipes(&stations);
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
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate stations.toml and resolve every station against the defaults
fn validate_config() -> Vec<Station> {
    println!("cargo:rerun-if-changed=stations.toml");

    let config_path = Path::new("stations.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: stations.toml not found!                                 ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a stations.toml configuration file.       ║\n\
            ║  Please create one in the washbay-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read stations.toml                             ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in stations.toml                     ║\n\
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
    let defaults = parse_defaults(&config, &mut errors);
    let stations = parse_stations(&config, &defaults, &mut errors);
    check_wiring(&stations, &mut errors);

    report("Invalid station configuration", &errors);

    println!(
        "cargo:warning=stations.toml validated successfully ({} stations)",
        stations.len()
    );
    stations
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

/// Abort the build if any errors were collected
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Read an optional integer and check its range
fn int_field(
    table: &toml::Table,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    context: &str,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match table.get(key) {
        None => None,
        Some(toml::Value::Integer(v)) if range.contains(v) => Some(*v),
        Some(toml::Value::Integer(_)) => {
            errors.push(format!(
                "{} '{}' must be {}-{}",
                context,
                key,
                range.start(),
                range.end()
            ));
            None
        }
        Some(_) => {
            errors.push(format!("{} '{}' must be an integer", context, key));
            None
        }
    }
}

fn check_keys(table: &toml::Table, allowed: &[&str], context: &str, errors: &mut Vec<String>) {
    for key in table.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(format!("{} unknown key '{}'", context, key));
        }
    }
}

/// Parse the optional [defaults] table
fn parse_defaults(config: &toml::Value, errors: &mut Vec<String>) -> Defaults {
    let mut defaults = Defaults {
        pump_speed: 170,
        washer_speed: 160,
        pump_stage_ms: 5_000,
        wash_stage_ms: 10_000,
    };

    let table = match config.get("defaults") {
        None => return defaults,
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[defaults] must be a table".to_string());
            return defaults;
        }
    };

    let ctx = "[defaults]";
    check_keys(table, DEFAULT_KEYS, ctx, errors);

    let speed = 1..=MAX_INTENSITY;
    let time = 1..=MAX_STAGE_MS;
    if let Some(v) = int_field(table, "pump_speed", speed.clone(), ctx, errors) {
        defaults.pump_speed = v;
    }
    if let Some(v) = int_field(table, "washer_speed", speed, ctx, errors) {
        defaults.washer_speed = v;
    }
    if let Some(v) = int_field(table, "pump_stage_ms", time.clone(), ctx, errors) {
        defaults.pump_stage_ms = v;
    }
    if let Some(v) = int_field(table, "wash_stage_ms", time, ctx, errors) {
        defaults.wash_stage_ms = v;
    }

    defaults
}

/// Parse every [[station]] entry
fn parse_stations(
    config: &toml::Value,
    defaults: &Defaults,
    errors: &mut Vec<String>,
) -> Vec<Station> {
    let entries = match config.get("station") {
        Some(toml::Value::Array(a)) if !a.is_empty() => a,
        Some(toml::Value::Array(_)) | None => {
            errors.push("Missing [[station]] - at least one station is required".to_string());
            return Vec::new();
        }
        Some(_) => {
            errors.push("[[station]] must be an array of tables".to_string());
            return Vec::new();
        }
    };

    if entries.len() > MAX_STATIONS {
        errors.push(format!("At most {} stations are supported", MAX_STATIONS));
    }

    let mut stations = Vec::new();

    for (i, entry) in entries.iter().enumerate() {
        let ctx = format!("[[station]] #{}", i + 1);
        let table = match entry.as_table() {
            Some(t) => t,
            None => {
                errors.push(format!("{} must be a table", ctx));
                continue;
            }
        };

        check_keys(table, STATION_KEYS, &ctx, errors);

        // Station ids are typed as single digits on the serial console
        let id = int_field(table, "id", 1..=9, &ctx, errors);
        let channels = 0..=BOARD_CHANNELS - 1;
        let pump = int_field(table, "pump", channels.clone(), &ctx, errors);
        let washer = int_field(table, "washer", channels, &ctx, errors);

        let (id, pump, washer) = match (id, pump, washer) {
            (Some(id), Some(pump), Some(washer)) => (id, pump, washer),
            _ => {
                for key in ["id", "pump", "washer"] {
                    if table.get(key).is_none() {
                        errors.push(format!("{} missing '{}'", ctx, key));
                    }
                }
                continue;
            }
        };

        let speed = 1..=MAX_INTENSITY;
        let time = 1..=MAX_STAGE_MS;
        let pump_forward_speed = int_field(table, "pump_speed", speed.clone(), &ctx, errors)
            .unwrap_or(defaults.pump_speed);
        let pump_reverse_speed = int_field(table, "pump_reverse_speed", speed.clone(), &ctx, errors)
            .unwrap_or(pump_forward_speed);
        let washer_speed =
            int_field(table, "washer_speed", speed, &ctx, errors).unwrap_or(defaults.washer_speed);
        let pump_stage_ms = int_field(table, "pump_stage_ms", time.clone(), &ctx, errors)
            .unwrap_or(defaults.pump_stage_ms);
        let wash_stage_ms =
            int_field(table, "wash_stage_ms", time, &ctx, errors).unwrap_or(defaults.wash_stage_ms);

        if pump_stage_ms + wash_stage_ms > MAX_STAGE_MS {
            errors.push(format!("{} drain time exceeds {} ms", ctx, MAX_STAGE_MS));
        }

        stations.push(Station {
            id,
            pump,
            washer,
            pump_forward_speed,
            pump_reverse_speed,
            washer_speed,
            pump_stage_ms,
            wash_stage_ms,
        });
    }

    stations
}

/// Check ids and channel ownership across stations
fn check_wiring(stations: &[Station], errors: &mut Vec<String>) {
    let mut owners: Vec<(i64, i64)> = Vec::new();

    for (i, station) in stations.iter().enumerate() {
        if stations[..i].iter().any(|s| s.id == station.id) {
            errors.push(format!("Station id {} is used twice", station.id));
        }

        if station.pump == station.washer {
            errors.push(format!(
                "Station {} uses channel {} for both pump and washer",
                station.id, station.pump
            ));
            continue;
        }

        for channel in [station.pump, station.washer] {
            if let Some((_, other)) = owners.iter().find(|(c, _)| *c == channel) {
                errors.push(format!(
                    "Channel {} is shared by stations {} and {}",
                    channel, other, station.id
                ));
            } else {
                owners.push((channel, station.id));
            }
        }
    }
}

/// Write the generated recipe table to OUT_DIR/stations.rs
fn generate_recipes(stations: &[Station]) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let mut output = String::new();
    output.push_str("// Generated by build.rs from stations.toml. Do not edit.\n\n");
    output.push_str("/// Station recipes, in configuration order\n");
    output.push_str("pub const STATION_RECIPES: &[(StationId, WashRecipe)] = &[\n");

    for s in stations {
        output.push_str(&format!(
            "    (\n        StationId({}),\n        WashRecipe {{\n            \
             pump: ActuatorId({}),\n            washer: ActuatorId({}),\n            \
             pump_forward_speed: {},\n            pump_reverse_speed: {},\n            \
             washer_speed: {},\n            pump_stage_ms: {},\n            \
             wash_stage_ms: {},\n        }},\n    ),\n",
            s.id,
            s.pump,
            s.washer,
            s.pump_forward_speed,
            s.pump_reverse_speed,
            s.washer_speed,
            s.pump_stage_ms,
            s.wash_stage_ms,
        ));
    }

    output.push_str("];\n");

    let mut f = File::create(out_dir.join("stations.rs")).unwrap();
    f.write_all(output.as_bytes()).unwrap();
}
