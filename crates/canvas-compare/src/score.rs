use crate::error::CoreError;

/// Share of changed pixels, in percent.
///
/// Fails on a zero-area image rather than reporting 0% or NaN.
pub fn percentage(changed_pixel_count: u64, total_pixels: u64) -> Result<f64, CoreError> {
    if total_pixels == 0 {
        return Err(CoreError::DivisionByZero);
    }
    let pct = 100.0 * changed_pixel_count as f64 / total_pixels as f64;
    Ok(pct.clamp(0.0, 100.0))
}
