use anyhow::{Context, Result};

use super::{CONFIG_DIR, config_path};

/// Hand-crafted config template with commented-out keys, so users can see
/// the available knobs and their defaults.
const CONFIG_TEMPLATE: &str = r#"# ─────────────────────────────────────────────────────────
# Comparison — all fields optional.
# ─────────────────────────────────────────────────────────
[compare]
# scale = 1.0                       # resample both images first (0.01-1.0)
# threshold = 0                     # per-channel delta to ignore (0-255), alias: rounding
# normalized = false                # paint every remaining delta at full intensity (any truthy value)
# engine = "channel"                # "channel" | "averaged"

# ─────────────────────────────────────────────────────────
# Frame watching — all fields optional.
# ─────────────────────────────────────────────────────────
[watch]
# interval_ms = 160
# movement_gate = 0.0               # % of changed pixels that counts as movement
"#;

pub fn config_file_exists() -> bool {
    config_path().exists()
}

pub fn write_template() -> Result<()> {
    std::fs::create_dir_all(CONFIG_DIR)
        .with_context(|| format!("Failed to create {CONFIG_DIR} directory"))?;
    let path = config_path();
    std::fs::write(&path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let config = crate::config::parse(CONFIG_TEMPLATE).unwrap();
        assert!(config.compare.params.scale.is_none());
        assert!(config.watch.movement_gate.is_none());
    }
}
