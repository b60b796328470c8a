use anyhow::{ensure, Result};
use tickboy_common::Color;

use super::lcd::LcdImage;

/// DMG shades for colour indices 0 to 3.
const SHADES: [Color; 4] = [
    Color::WHITE,
    Color::LIGHT_GRAY,
    Color::DARK_GRAY,
    Color::BLACK,
];

/// Converts `image` into packed RGB24 pixels, row by row.
pub fn write_rgb24(image: &LcdImage, buffer: &mut [u8]) -> Result<()> {
    let needed = image.width() * image.height() * 3;
    ensure!(
        buffer.len() >= needed,
        "RGB24 buffer of {} bytes, need {needed}",
        buffer.len()
    );
    let mut pixels = buffer.chunks_exact_mut(3);
    for y in 0..image.height() {
        for x in 0..image.width() {
            let (r, g, b) = SHADES[usize::from(image.get(x, y)?)].rgb();
            if let Some(pixel) = pixels.next() {
                pixel.copy_from_slice(&[r, g, b]);
            }
        }
    }
    Ok(())
}
