use rimlight_core::{FrameGeometry, Rgb};

/// Mean color of the `size`×`size` pixel box anchored at `(x, y)`.
///
/// The anchor may be negative or extend past the frame; out-of-bounds pixels
/// are skipped and only in-bounds pixels contribute to the mean. A box with
/// no in-bounds pixel averages to black — a defined degenerate case, not an
/// error.
///
/// Channel means use truncating integer division, so a uniform box averages
/// to exactly its color.
///
/// `frame` must be RGB24, row-major, top-left origin, of exactly
/// `geometry.byte_len()` bytes — callers validate length before invoking.
pub fn box_average(frame: &[u8], geometry: FrameGeometry, x: i64, y: i64, size: u32) -> Rgb {
    let mut total_r: u64 = 0;
    let mut total_g: u64 = 0;
    let mut total_b: u64 = 0;
    let mut count: u64 = 0;

    for dy in 0..size as i64 {
        for dx in 0..size as i64 {
            let px = x + dx;
            let py = y + dy;

            if geometry.contains(px, py) {
                let offset = (py as usize * geometry.width as usize + px as usize) * 3;
                total_r += frame[offset] as u64;
                total_g += frame[offset + 1] as u64;
                total_b += frame[offset + 2] as u64;
                count += 1;
            }
        }
    }

    if count == 0 {
        return Rgb::BLACK;
    }
    Rgb {
        r: (total_r / count) as u8,
        g: (total_g / count) as u8,
        b: (total_b / count) as u8,
    }
}
