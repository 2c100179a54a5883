use image::{Rgba, RgbaImage};

/// Channel value below which a pixel no longer counts as background.
pub const INK_THRESHOLD: u8 = 250;

/// A pixel is inked when any colour channel is darker than near-white. Alpha
/// is ignored.
pub fn is_inked(pixel: &Rgba<u8>) -> bool {
    let [r, g, b, _] = pixel.0;
    r < INK_THRESHOLD || g < INK_THRESHOLD || b < INK_THRESHOLD
}

/// Percentage (0..=100) of pixels that differ from the blank background.
pub fn coverage_pct(raster: &RgbaImage) -> f64 {
    let total = raster.width() as u64 * raster.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let inked = raster.pixels().filter(|p| is_inked(p)).count() as u64;
    inked as f64 / total as f64 * 100.0
}
