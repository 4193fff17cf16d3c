use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::engine::EngineKind;
use crate::error::CoreError;
use crate::params::{CompareParams, sanitize_movement_gate};
use crate::pipeline::{Comparison, DiffResult};

/// Comparison of the latest frame against the one before it.
#[derive(Debug, Clone)]
pub struct MotionReport {
    pub result: DiffResult,
    /// `result.percentage()` exceeded the movement gate.
    pub moved: bool,
}

/// Keeps the previous frame of a stream and diffs each new frame against it.
///
/// The newest frame is the base side, the previous one the target.
pub struct MotionDetector {
    params: CompareParams,
    engine: EngineKind,
    movement_gate: f64,
    previous: Option<PixelBuffer>,
}

impl MotionDetector {
    pub fn new(params: CompareParams, movement_gate: f64) -> Self {
        Self {
            params,
            engine: EngineKind::default(),
            movement_gate: sanitize_movement_gate(Some(movement_gate)),
            previous: None,
        }
    }

    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    pub fn movement_gate(&self) -> f64 {
        self.movement_gate
    }

    /// Feed the next frame.
    ///
    /// Returns `None` for the first frame (nothing to compare against yet).
    /// The frame becomes the new reference even when the comparison fails,
    /// so a resolution change costs one error rather than all later frames.
    pub fn observe(&mut self, frame: PixelBuffer) -> Result<Option<MotionReport>, CoreError> {
        let Some(previous) = self.previous.take() else {
            debug!("first frame stored");
            self.previous = Some(frame);
            return Ok(None);
        };

        let outcome = Comparison::new(self.params)
            .with_engine(self.engine)
            .run_with(&frame, &previous);
        self.previous = Some(frame);
        let result = outcome?;
        let moved = result.percentage() > self.movement_gate;
        debug!(
            percentage = result.percentage(),
            gate = self.movement_gate,
            moved,
            "frame compared"
        );
        Ok(Some(MotionReport { result, moved }))
    }

    /// Forget the previous frame.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
