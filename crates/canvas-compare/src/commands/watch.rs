use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use canvas_compare::{MotionDetector, MotionReport};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::config::ResolvedRunConfig;
use crate::load;
use crate::report::terminal;

/// Running totals for one watch session.
#[derive(Debug, Default, PartialEq)]
pub struct WatchStats {
    pub compared: u64,
    pub moved: u64,
    pub errored: u64,
}

/// `canvas-compare watch` — poll a frame file and report movement between
/// consecutive frames until Ctrl-C or `max_frames` comparisons.
pub async fn watch(config: ResolvedRunConfig, frame: &Path, max_frames: Option<u64>) -> Result<()> {
    let start = Instant::now();
    info!(
        path = %frame.display(),
        interval_ms = config.interval.as_millis() as u64,
        gate = config.movement_gate,
        "watching frame file"
    );

    let mut stats = WatchStats::default();
    tokio::select! {
        res = poll(&config, frame, max_frames, &mut stats) => res?,
        _ = tokio::signal::ctrl_c() => debug!("interrupted"),
    }

    terminal::print_watch_summary(stats.compared, stats.moved, stats.errored, start.elapsed());
    Ok(())
}

async fn poll(
    config: &ResolvedRunConfig,
    frame: &Path,
    max_frames: Option<u64>,
    stats: &mut WatchStats,
) -> Result<()> {
    let mut detector =
        MotionDetector::new(config.params, config.movement_gate).with_engine(config.engine);
    let mut frame_no: u64 = 0;
    let name = frame.display().to_string();

    let mut ticker = tokio::time::interval(config.interval);
    // A slow comparison swallows the ticks it overlaps instead of queueing them.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if max_frames.is_some_and(|max| stats.compared + stats.errored >= max) {
            return Ok(());
        }
        terminal::show_waiting(&name);
        ticker.tick().await;

        let bytes = match tokio::fs::read(frame).await {
            Ok(b) => b,
            Err(e) => {
                debug!(error = %e, "frame not readable yet");
                continue;
            }
        };
        // Unchanged bytes are still compared: a still scene is a 0% frame.
        frame_no += 1;

        let (d, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = observe(&mut detector, &bytes);
            (detector, outcome)
        })
        .await
        .context("Diff task panicked")?;
        detector = d;
        record(outcome, frame_no, stats);
    }
}

fn record(outcome: Result<Option<MotionReport>>, frame_no: u64, stats: &mut WatchStats) {
    match outcome {
        Ok(None) => {}
        Ok(Some(report)) => {
            stats.compared += 1;
            if report.moved {
                stats.moved += 1;
            }
            terminal::print_frame_line(frame_no, &report);
        }
        Err(e) => {
            stats.errored += 1;
            terminal::print_error_line(&format!("frame {frame_no}"), &format!("{e:#}"));
        }
    }
}

fn observe(detector: &mut MotionDetector, bytes: &[u8]) -> Result<Option<MotionReport>> {
    let frame = load::decode(bytes).context("Failed to decode frame")?;
    Ok(detector.observe(frame)?)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use canvas_compare::{CompareParams, EngineKind};
    use image::{Rgba, RgbaImage};

    fn png(w: u32, h: u32, color: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, color);
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn config(gate: f64) -> ResolvedRunConfig {
        ResolvedRunConfig {
            params: CompareParams::default(),
            engine: EngineKind::Channel,
            interval: Duration::from_millis(5),
            movement_gate: gate,
        }
    }

    #[test]
    fn observe_reports_after_second_frame() {
        let mut d = MotionDetector::new(CompareParams::default(), 10.0);
        let black = png(2, 2, Rgba([0, 0, 0, 255]));
        let white = png(2, 2, Rgba([255, 255, 255, 255]));
        assert!(observe(&mut d, &black).unwrap().is_none());
        let report = observe(&mut d, &white).unwrap().unwrap();
        assert!(report.moved);
    }

    #[test]
    fn observe_rejects_garbage() {
        let mut d = MotionDetector::new(CompareParams::default(), 0.0);
        assert!(observe(&mut d, b"garbage").is_err());
    }

    // -- stats --

    #[test]
    fn record_counts_each_outcome() {
        let mut d = MotionDetector::new(CompareParams::default(), 50.0);
        let black = png(2, 2, Rgba([0, 0, 0, 255]));
        let white = png(2, 2, Rgba([255, 255, 255, 255]));

        let mut stats = WatchStats::default();
        let frames: [&[u8]; 5] = [&black, &white, &white, b"garbage", &black];
        for (i, bytes) in frames.into_iter().enumerate() {
            record(observe(&mut d, bytes), i as u64 + 1, &mut stats);
        }

        assert_eq!(
            stats,
            WatchStats {
                compared: 3,
                moved: 2,
                errored: 1,
            }
        );
    }

    // -- polling --

    #[tokio::test]
    async fn still_frame_reaches_max_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        std::fs::write(&path, png(2, 2, Rgba([0, 0, 0, 255]))).unwrap();

        let mut stats = WatchStats::default();
        tokio::time::timeout(
            Duration::from_secs(10),
            poll(&config(0.0), &path, Some(2), &mut stats),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(
            stats,
            WatchStats {
                compared: 2,
                moved: 0,
                errored: 0,
            }
        );
    }
}
