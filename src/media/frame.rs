use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::ScreenCapError;

/// Arrow polygon drawn at the pointer position (closed path)
const CURSOR_X: [i32; 8] = [0, 8, 6, 14, 12, 4, 2, 0];
const CURSOR_Y: [i32; 8] = [0, 2, 4, 12, 14, 6, 8, 0];
const CURSOR_COLOR: Rgba<u8> = Rgba([255, 255, 0, 255]);

/// Rectangle in capture coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            left: 0,
            top: 0,
            width: 700,
            height: 300,
        }
    }
}

pub fn validate_size_percentage(pct: f64) -> Result<f64, ScreenCapError> {
    if pct.is_finite() && pct > 0.0 && pct <= 1.0 {
        Ok(pct)
    } else {
        Err(ScreenCapError::invalid(format!(
            "Size percentage must be greater than 0 and at most 1, got {}.",
            pct
        )))
    }
}

pub fn scaled_size((width, height): (u32, u32), pct: f64) -> (u32, u32) {
    let w = ((width as f64) * pct).floor() as u32;
    let h = ((height as f64) * pct).floor() as u32;
    (w.max(1), h.max(1))
}

pub fn resize(frame: RgbaImage, pct: f64) -> RgbaImage {
    if pct == 1.0 {
        return frame;
    }
    let (w, h) = scaled_size(frame.dimensions(), pct);
    imageops::resize(&frame, w, h, FilterType::Triangle)
}

/// Scale to exact dimensions; a no-op when the frame already has them
pub fn resize_to(frame: RgbaImage, (width, height): (u32, u32)) -> RgbaImage {
    if frame.dimensions() == (width, height) {
        return frame;
    }
    imageops::resize(&frame, width, height, FilterType::Triangle)
}

pub fn crop(frame: &RgbaImage, region: Region) -> Result<RgbaImage, ScreenCapError> {
    let (width, height) = frame.dimensions();
    if region.left >= width || region.top >= height {
        return Err(ScreenCapError::RegionOutOfBounds);
    }
    if region.width == 0 || region.height == 0 {
        return Err(ScreenCapError::invalid(
            "Width and height of the region must be greater than 0.",
        ));
    }
    let w = region.width.min(width - region.left);
    let h = region.height.min(height - region.top);
    Ok(imageops::crop_imm(frame, region.left, region.top, w, h).to_image())
}

fn inside_cursor(px: f64, py: f64) -> bool {
    // even-odd rule over the closed polygon
    let mut inside = false;
    let n = CURSOR_X.len();
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (CURSOR_X[i] as f64, CURSOR_Y[i] as f64);
        let (xj, yj) = (CURSOR_X[j] as f64, CURSOR_Y[j] as f64);
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Paints the arrow with its tip at (x, y); parts outside the frame are dropped
pub fn draw_cursor(frame: &mut RgbaImage, x: i32, y: i32) {
    let (width, height) = frame.dimensions();
    let max_x = CURSOR_X.iter().copied().max().unwrap_or(0);
    let max_y = CURSOR_Y.iter().copied().max().unwrap_or(0);
    for dy in 0..=max_y {
        for dx in 0..=max_x {
            if !inside_cursor(dx as f64 + 0.5, dy as f64 + 0.5) {
                continue;
            }
            let (px, py) = (x + dx, y + dy);
            if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                continue;
            }
            frame.put_pixel(px as u32, py as u32, CURSOR_COLOR);
        }
    }
}
