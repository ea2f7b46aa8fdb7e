//! Subtitle timestamp formatting.
//!
//! Both formats round to the nearest millisecond *before* splitting into fields, so a value
//! like `1.9995` carries into the seconds field instead of producing a fourth fraction digit.
//! Hours are not wrapped at 24; long inputs keep counting (`25:00:00,000`).

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`).
pub fn format_srt_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = split_millis(seconds);
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// Format seconds as a WebVTT timestamp (`HH:MM:SS.mmm`).
pub fn format_vtt_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = split_millis(seconds);
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Split seconds into `(hours, minutes, seconds, millis)`.
///
/// Negative and NaN inputs clamp to zero.
fn split_millis(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    (h, m, s, ms)
}
