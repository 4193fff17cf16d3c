use std::time::Instant;

use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::engine::{ChannelEngine, DiffEngine, EngineOutput};
use crate::error::{CoreError, Side};
use crate::params::CompareParams;
use crate::sampler::{ImageRasterizer, Rasterizer, Sampler};
use crate::score;

/// Outcome of one comparison. Owned by the caller, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult {
    diff_buffer: PixelBuffer,
    changed_pixel_count: u64,
    percentage: f64,
    execution_time_ms: Option<u64>,
}

impl DiffResult {
    /// Visual diff: per-channel deltas after threshold and normalization,
    /// always fully opaque.
    pub fn diff_buffer(&self) -> &PixelBuffer {
        &self.diff_buffer
    }

    pub fn into_diff_buffer(self) -> PixelBuffer {
        self.diff_buffer
    }

    pub fn changed_pixel_count(&self) -> u64 {
        self.changed_pixel_count
    }

    /// Pixel count of the compared (resampled) images.
    pub fn total_pixels(&self) -> u64 {
        self.diff_buffer.pixel_count()
    }

    /// 0.0 = identical, 100.0 = every pixel changed.
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn execution_time_ms(&self) -> Option<u64> {
        self.execution_time_ms
    }
}

/// Compare two buffers with the default engine and rasterizer.
///
/// This is the whole pipeline: resample both sides by `params.scale()`,
/// check their sizes agree, diff, then score. Any failure aborts with no
/// partial result.
pub fn compare(
    base: PixelBuffer,
    target: PixelBuffer,
    params: &CompareParams,
) -> Result<DiffResult, CoreError> {
    Comparison::new(*params).base(base).target(target).run()
}

/// A single comparison being assembled.
///
/// Sides may be supplied in any order; running without one of them fails
/// with [`CoreError::MissingImageSource`].
pub struct Comparison<E = ChannelEngine, R = ImageRasterizer> {
    params: CompareParams,
    engine: E,
    sampler: Sampler<R>,
    base: Option<PixelBuffer>,
    target: Option<PixelBuffer>,
}

impl Comparison {
    pub fn new(params: CompareParams) -> Self {
        Self {
            params,
            engine: ChannelEngine,
            sampler: Sampler::default(),
            base: None,
            target: None,
        }
    }
}

impl<E: DiffEngine, R: Rasterizer> Comparison<E, R> {
    pub fn with_engine<E2: DiffEngine>(self, engine: E2) -> Comparison<E2, R> {
        Comparison {
            params: self.params,
            engine,
            sampler: self.sampler,
            base: self.base,
            target: self.target,
        }
    }

    pub fn with_rasterizer<R2: Rasterizer>(self, rasterizer: R2) -> Comparison<E, R2> {
        Comparison {
            params: self.params,
            engine: self.engine,
            sampler: Sampler::new(rasterizer),
            base: self.base,
            target: self.target,
        }
    }

    pub fn base(mut self, buffer: PixelBuffer) -> Self {
        self.base = Some(buffer);
        self
    }

    pub fn target(mut self, buffer: PixelBuffer) -> Self {
        self.target = Some(buffer);
        self
    }

    pub fn run(self) -> Result<DiffResult, CoreError> {
        let base = self
            .base
            .as_ref()
            .ok_or(CoreError::MissingImageSource(Side::Base))?;
        let target = self
            .target
            .as_ref()
            .ok_or(CoreError::MissingImageSource(Side::Target))?;
        self.run_with(base, target)
    }

    /// Compare borrowed buffers with this comparison's settings.
    ///
    /// Sides set through [`Comparison::base`] and [`Comparison::target`]
    /// are not consulted.
    pub fn run_with(&self, base: &PixelBuffer, target: &PixelBuffer) -> Result<DiffResult, CoreError> {
        let start = Instant::now();
        let params = self.params;
        debug!(
            base_w = base.width(),
            base_h = base.height(),
            target_w = target.width(),
            target_h = target.height(),
            "images loaded"
        );

        let scaled_base = self.sampler.scaled(base, params.scale())?;
        let scaled_target = self.sampler.scaled(target, params.scale())?;
        let base = scaled_base.as_ref().unwrap_or(base);
        let target = scaled_target.as_ref().unwrap_or(target);
        debug!(
            scale = params.scale(),
            width = base.width(),
            height = base.height(),
            "resampled"
        );

        let EngineOutput {
            diff_buffer,
            changed_pixel_count,
        } = self.engine.diff(base, target, &params)?;
        debug!(engine = self.engine.name(), changed_pixel_count, "diffed");

        let percentage = score::percentage(changed_pixel_count, diff_buffer.pixel_count())?;
        let execution_time_ms = Some(start.elapsed().as_millis() as u64);
        debug!(percentage, execution_time_ms = ?execution_time_ms, "scored");

        Ok(DiffResult {
            diff_buffer,
            changed_pixel_count,
            percentage,
            execution_time_ms,
        })
    }
}
