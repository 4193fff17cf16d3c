//! Pixel-by-pixel comparison of RGBA raster images.
//!
//! Two [`PixelBuffer`]s go in, one [`DiffResult`] comes out: a fully opaque
//! diff buffer holding per-channel absolute deltas (after threshold and
//! normalization), the number of changed pixels, and that number as a
//! percentage of the image. Decoding, capture and display are left to the
//! caller.

pub mod buffer;
pub mod engine;
pub mod error;
pub mod motion;
pub mod params;
pub mod pipeline;
pub mod sampler;
pub mod score;

pub use self::buffer::PixelBuffer;
pub use self::engine::{AveragedEngine, ChannelEngine, DiffEngine, EngineKind, EngineOutput};
pub use self::error::{CoreError, Side};
pub use self::motion::{MotionDetector, MotionReport};
pub use self::params::{CompareParams, Flag, RawCompareParams};
pub use self::pipeline::{Comparison, DiffResult, compare};
pub use self::sampler::{ImageRasterizer, Raster, Rasterizer, Sampler};
