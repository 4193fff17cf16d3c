use std::io::Write;
use std::time::Duration;

use canvas_compare::{DiffResult, MotionReport};

/// Clear the current terminal line (wipes the waiting indicator).
pub fn clear_line() {
    print!("\r\x1b[2K");
}

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

fn time_suffix(result: &DiffResult) -> String {
    match result.execution_time_ms() {
        Some(ms) => format!(
            "  \x1b[2m{}\x1b[0m",
            format_duration(Duration::from_millis(ms))
        ),
        None => String::new(),
    }
}

pub fn format_counts(result: &DiffResult) -> String {
    format!(
        "{} of {} pixels, {:.2}%",
        result.changed_pixel_count(),
        result.total_pixels(),
        result.percentage()
    )
}

/// Print the outcome of a one-off comparison.
pub fn print_result(name: &str, result: &DiffResult) {
    clear_line();
    let counts = format_counts(result);
    let suffix = time_suffix(result);
    if result.changed_pixel_count() == 0 {
        println!("  \x1b[32mSAME\x1b[0m  {name}  ({counts}){suffix}");
    } else {
        println!("  \x1b[31mDIFF\x1b[0m  {name}  ({counts}){suffix}");
    }
}

/// Print one watched frame. Still frames are dimmed.
pub fn print_frame_line(frame: u64, report: &MotionReport) {
    clear_line();
    let pct = report.result.percentage();
    let suffix = time_suffix(&report.result);
    if report.moved {
        println!("  \x1b[33mMOVE\x1b[0m  frame {frame}  (movement detected, {pct:.2}%){suffix}");
    } else {
        println!("  \x1b[2mSTILL  frame {frame}  ({pct:.2}%)\x1b[0m{suffix}");
    }
}

/// Print an error line (no timing available).
pub fn print_error_line(name: &str, msg: &str) {
    clear_line();
    println!("  \x1b[31m ERR\x1b[0m  {name}  ({msg})");
}

/// Show the waiting indicator between frames.
pub fn show_waiting(path: &str) {
    clear_line();
    print!("  Watching  {path}");
    let _ = std::io::stdout().flush();
}

pub fn print_watch_summary(frames: u64, moved: u64, errored: u64, elapsed: Duration) {
    clear_line();
    println!();
    let mut parts = vec![format!("{frames} compared")];
    if moved > 0 {
        parts.push(format!("\x1b[33m{moved} with movement\x1b[0m"));
    }
    if errored > 0 {
        parts.push(format!("\x1b[31m{errored} errored\x1b[0m"));
    }
    println!(
        "Frames: {}  ({})",
        parts.join(", "),
        format_duration(elapsed)
    );
}
