use serde::{Deserialize, Serialize};

use crate::buffer::{CHANNEL_A, CHANNEL_B, CHANNEL_G, CHANNEL_R, CHANNELS, PixelBuffer};
use crate::error::CoreError;
use crate::params::CompareParams;

const OPAQUE: u8 = 255;

/// Diff buffer plus the number of pixels with any nonzero channel in it.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    pub diff_buffer: PixelBuffer,
    pub changed_pixel_count: u64,
}

pub trait DiffEngine {
    fn name(&self) -> &str;
    fn diff(
        &self,
        base: &PixelBuffer,
        target: &PixelBuffer,
        params: &CompareParams,
    ) -> Result<EngineOutput, CoreError>;
}

/// Per-channel absolute difference of R, G and B.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelEngine;

impl DiffEngine for ChannelEngine {
    fn name(&self) -> &str {
        "channel"
    }

    fn diff(
        &self,
        base: &PixelBuffer,
        target: &PixelBuffer,
        params: &CompareParams,
    ) -> Result<EngineOutput, CoreError> {
        map_pixels(base, target, |b, t| {
            [CHANNEL_R, CHANNEL_G, CHANNEL_B].map(|c| filter_delta(b[c].abs_diff(t[c]), params))
        })
    }
}

/// Single grey delta: the mean of the R, G and B absolute differences,
/// written to all three output channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct AveragedEngine;

impl DiffEngine for AveragedEngine {
    fn name(&self) -> &str {
        "averaged"
    }

    fn diff(
        &self,
        base: &PixelBuffer,
        target: &PixelBuffer,
        params: &CompareParams,
    ) -> Result<EngineOutput, CoreError> {
        map_pixels(base, target, |b, t| {
            let sum: u16 = [CHANNEL_R, CHANNEL_G, CHANNEL_B]
                .into_iter()
                .map(|c| b[c].abs_diff(t[c]) as u16)
                .sum();
            // Rounded mean; at most 255 since each term is.
            let mean = ((sum + 1) / 3) as u8;
            [filter_delta(mean, params); 3]
        })
    }
}

/// Engine selection for configuration surfaces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    #[default]
    Channel,
    Averaged,
}

impl DiffEngine for EngineKind {
    fn name(&self) -> &str {
        match self {
            Self::Channel => ChannelEngine.name(),
            Self::Averaged => AveragedEngine.name(),
        }
    }

    fn diff(
        &self,
        base: &PixelBuffer,
        target: &PixelBuffer,
        params: &CompareParams,
    ) -> Result<EngineOutput, CoreError> {
        match self {
            Self::Channel => ChannelEngine.diff(base, target, params),
            Self::Averaged => AveragedEngine.diff(base, target, params),
        }
    }
}

/// Zero deltas at or below the threshold, then binarize if normalizing.
pub fn filter_delta(delta: u8, params: &CompareParams) -> u8 {
    let delta = if delta > params.threshold() { delta } else { 0 };
    if params.is_normalized() && delta > 0 {
        OPAQUE
    } else {
        delta
    }
}

fn check_sizes(base: &PixelBuffer, target: &PixelBuffer) -> Result<(), CoreError> {
    if base.dimensions() != target.dimensions() {
        return Err(CoreError::SizeMismatch {
            base_w: base.width(),
            base_h: base.height(),
            target_w: target.width(),
            target_h: target.height(),
        });
    }
    Ok(())
}

/// Walk both buffers pixel by pixel, writing `rgb(base, target)` plus an
/// opaque alpha into a fresh diff buffer.
fn map_pixels<F>(base: &PixelBuffer, target: &PixelBuffer, rgb: F) -> Result<EngineOutput, CoreError>
where
    F: Fn(&[u8], &[u8]) -> [u8; 3],
{
    check_sizes(base, target)?;

    let mut samples = vec![0u8; base.samples().len()];
    let mut changed_pixel_count: u64 = 0;

    for (out, (b, t)) in samples
        .chunks_exact_mut(CHANNELS)
        .zip(base.pixels().zip(target.pixels()))
    {
        let [r, g, bl] = rgb(b, t);
        out[CHANNEL_R] = r;
        out[CHANNEL_G] = g;
        out[CHANNEL_B] = bl;
        out[CHANNEL_A] = OPAQUE;
        if r != 0 || g != 0 || bl != 0 {
            changed_pixel_count += 1;
        }
    }

    let diff_buffer = PixelBuffer::new(base.width(), base.height(), samples)?;
    Ok(EngineOutput {
        diff_buffer,
        changed_pixel_count,
    })
}
