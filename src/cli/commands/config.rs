//! Config command handler

use crate::args::ConfigSubcommand;
use course_compass::Config;
use std::io::{self, Write};

/// Keys accepted by `config get/set/unset`
const KEYS: [&str; 13] = [
    "level",
    "file",
    "verbose",
    "catalog",
    "prerequisites",
    "transcripts",
    "artifact",
    "training_mode",
    "seed",
    "restarts",
    "capstone",
    "peer_count",
    "max_results",
];

/// Dispatch config subcommands
pub fn run(subcommand: Option<ConfigSubcommand>, config: &mut Config, defaults: &Config) {
    match subcommand {
        None => handle_config_get(config, None),
        Some(ConfigSubcommand::Get { key }) => handle_config_get(config, key),
        Some(ConfigSubcommand::Set { key, value }) => handle_config_set(config, &key, &value),
        Some(ConfigSubcommand::Unset { key }) => handle_config_unset(config, defaults, &key),
        Some(ConfigSubcommand::Reset) => handle_config_reset(),
    }
}

fn unknown_key(key: &str) {
    eprintln!("✗ Unknown config key: '{key}'");
    eprintln!("  Known keys: {}", KEYS.join(", "));
}

/// Handle the config get subcommand
pub fn handle_config_get(config: &Config, key: Option<String>) {
    let Some(k) = key else {
        println!("\n=== Configuration ({}) ===\n", Config::get_config_file_path().display());
        println!("{config}");
        return;
    };
    match config.get(&k) {
        Some(value) => println!("{value}"),
        None => unknown_key(&k),
    }
}

fn persist(config: &Config) {
    if let Err(e) = config.save() {
        eprintln!("✗ Failed to save config: {e}");
        std::process::exit(1);
    }
}

/// Handle the config set subcommand
pub fn handle_config_set(config: &mut Config, key: &str, value: &str) {
    if config.get(key).is_none() {
        unknown_key(key);
        std::process::exit(1);
    }
    if let Err(e) = config.set(key, value) {
        eprintln!("✗ {e}");
        std::process::exit(1);
    }
    persist(config);
    println!("✓ Set {key} = {value}");
}

/// Handle the config unset subcommand
pub fn handle_config_unset(config: &mut Config, defaults: &Config, key: &str) {
    if let Err(e) = config.unset(key, defaults) {
        eprintln!("✗ {e}");
        std::process::exit(1);
    }
    persist(config);
    let value = config.get(key).unwrap_or_default();
    println!("✓ Reset {key} to default ({value})");
}

/// Handle the config reset subcommand
pub fn handle_config_reset() {
    if !Config::get_config_file_path().exists() {
        println!("✓ Config is already at defaults");
        return;
    }

    print!("Reset configuration to defaults? (y/n): ");
    io::stdout().flush().ok();

    let mut response = String::new();
    io::stdin().read_line(&mut response).ok();
    let response = response.trim();

    if response.eq_ignore_ascii_case("y") || response.eq_ignore_ascii_case("yes") {
        if let Err(e) = Config::reset() {
            eprintln!("✗ Failed to remove config file: {e}");
            std::process::exit(1);
        }
        println!("✓ Config reset to defaults");
    } else {
        println!("✗ Reset cancelled");
    }
}
