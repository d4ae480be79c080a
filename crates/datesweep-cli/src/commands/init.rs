use std::path::Path;

use anyhow::{bail, Result};

use datesweep_core::{config::generate_secret, AppConfig};

pub fn run(path: Option<&Path>, force: bool) -> Result<()> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(AppConfig::config_path);

    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    let mut config = AppConfig::default();
    config.security.secret = generate_secret();
    config.save(Some(&config_path))?;

    std::fs::create_dir_all(config.data_dir())?;
    std::fs::create_dir_all(config.uploads_dir())?;

    println!("Wrote configuration to {}", config_path.display());
    println!("  Data directory: {}", config.data_dir().display());
    println!("  Uploads: {}", config.uploads_dir().display());
    println!("\nNext, create an administrator:");
    println!("  datesweep user add -l admin -n \"Site Admin\" -e admin@example.com");

    Ok(())
}
