//! `rednote config`: configuration management commands.

use std::path::Path;

use rednote_config::AppConfig;

pub fn show(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut config =
        AppConfig::load_at(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    // Never print the secret itself
    if config.api_key.is_some() {
        config.api_key = Some("[REDACTED]".into());
    }
    println!("# {}", config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

pub fn init(config_path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if config_path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }
    if let Some(dir) = config_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(config_path, AppConfig::default_toml())?;
    println!("✅ Wrote default config to {}", config_path.display());
    println!("   Set DEEPSEEK_API_KEY or add api_key to the file before running `rednote generate`.");
    Ok(())
}

pub fn path(config_path: &Path) {
    println!("{}", config_path.display());
}
