//! Show or initialize the configuration file.

use std::path::Path;

use palmcap_capture_engine::AppConfig;
use palmcap_common::config::config_file_path;

pub fn run(config: &AppConfig, explicit: Option<&Path>, init: bool, force: bool) -> anyhow::Result<()> {
    let path = explicit.map_or_else(config_file_path, Path::to_path_buf);

    if !init {
        println!("# {}", path.display());
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    AppConfig::default().save_to(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
