use std::time::Duration;

use anyhow::Result;
use canvas_compare::params::{Flag, sanitize_movement_gate};
use canvas_compare::{CompareParams, EngineKind, RawCompareParams};
use tracing::warn;

use super::{Config, load};

const DEFAULT_INTERVAL_MS: u64 = 160;

/// Values extracted from the CLI that participate in the merge.
#[derive(Default)]
pub struct CliOverrides {
    pub params: RawCompareParams,
    pub engine: Option<EngineKind>,
    pub interval_ms: Option<u64>,
    pub movement_gate: Option<f64>,
}

/// `CANVAS_COMPARE_*` variables. Unparseable values count as unset.
#[derive(Debug, Default)]
pub struct EnvLayer {
    pub params: RawCompareParams,
    pub movement_gate: Option<f64>,
}

impl EnvLayer {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str| -> Option<f64> {
            let raw = lookup(key)?;
            match raw.trim().parse::<f64>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(key, value = %raw, error = %e, "ignoring unparseable variable");
                    None
                }
            }
        };

        Self {
            params: RawCompareParams {
                scale: number("CANVAS_COMPARE_SCALE"),
                threshold: number("CANVAS_COMPARE_THRESHOLD"),
                normalized: lookup("CANVAS_COMPARE_NORMALIZED").map(Flag::Text),
            },
            movement_gate: number("CANVAS_COMPARE_MOVEMENT_GATE"),
        }
    }
}

/// Fully resolved config after CLI > env > file > defaults merge.
#[derive(Debug)]
pub struct ResolvedRunConfig {
    pub params: CompareParams,
    pub engine: EngineKind,
    pub interval: Duration,
    pub movement_gate: f64,
}

impl ResolvedRunConfig {
    pub fn new(cli: CliOverrides) -> Result<Self> {
        let file_config = load()?;
        Ok(Self::from_layers(file_config, EnvLayer::from_env(), cli))
    }

    pub fn from_layers(file: Config, env: EnvLayer, cli: CliOverrides) -> Self {
        // File base, then env, then CLI on top
        let mut raw = file.compare.params;
        raw.merge(&env.params);
        raw.merge(&cli.params);

        let engine = cli.engine.or(file.compare.engine).unwrap_or_default();

        let interval_ms = cli
            .interval_ms
            .or(file.watch.interval_ms)
            .unwrap_or(DEFAULT_INTERVAL_MS)
            .max(1);

        let movement_gate = sanitize_movement_gate(
            cli.movement_gate
                .or(env.movement_gate)
                .or(file.watch.movement_gate),
        );

        Self {
            params: raw.sanitize(),
            engine,
            interval: Duration::from_millis(interval_ms),
            movement_gate,
        }
    }
}
