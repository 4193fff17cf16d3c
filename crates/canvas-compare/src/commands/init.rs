use anyhow::{Result, bail};

use crate::config;

/// `canvas-compare init` — create .canvas-compare/config.toml.
pub fn init(force: bool) -> Result<()> {
    if !force && config::config_file_exists() {
        bail!(".canvas-compare/config.toml already exists (use --force to overwrite)");
    }

    config::write_template()?;

    let verb = if force { "Regenerated" } else { "Created" };
    println!("{verb} .canvas-compare/config.toml");
    Ok(())
}
