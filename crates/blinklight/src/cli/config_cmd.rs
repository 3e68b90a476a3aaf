//! `config` subcommand — show configuration and file paths.

use super::{Config, ConfigOutput, Result, kv, kv_width};

pub(super) fn cmd_config(json: bool) -> Result<()> {
    let path = Config::path();
    let exists = path.as_ref().is_some_and(|p| p.exists());
    let (config, warnings) = Config::load_with_warnings();
    for w in &warnings {
        log::warn!("{w}");
    }

    if json {
        let output = ConfigOutput {
            config_file: path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: exists,
            settings: config,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    let w = kv_width(&["Config file:", "Lights:"]);
    match path {
        Some(ref p) => kv(
            "Config file:",
            format!("{}{}", p.display(), if exists { "" } else { " (not found)" }),
            w,
        ),
        None => kv("Config file:", "unavailable (no config directory)", w),
    }
    kv("Lights:", config.lights.len(), w);

    for light in &config.lights {
        println!(
            "  {} — serial {}, index {}",
            light.name, light.serial, light.index
        );
    }

    if let Err(errors) = config.validate() {
        println!();
        println!("Validation problems:");
        for e in &errors {
            println!("  - {e}");
        }
    }

    Ok(())
}
