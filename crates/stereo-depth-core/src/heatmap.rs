//! False-color rendering of depth maps.
//!
//! The heatmap is a lossy, 8-bit inspection artifact; it never feeds back
//! into numeric processing. Depth values are clamped to a fixed display
//! range and mapped through a reversed inferno colormap, so near surfaces
//! render bright and far/invalid ones dark.

use crate::map::DepthMap;
use image::{Rgb, RgbImage};

/// Display range for heatmap rendering, in calibration units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatmapOptions {
    pub vmin: f32,
    pub vmax: f32,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            vmin: 0.0,
            vmax: 3.0,
        }
    }
}

/// Inferno colormap sampled at 11 evenly spaced anchors, interpolated
/// linearly in between.
const INFERNO: [[u8; 3]; 11] = [
    [0, 0, 4],
    [22, 11, 57],
    [66, 10, 104],
    [106, 23, 110],
    [147, 38, 103],
    [188, 55, 84],
    [221, 81, 58],
    [243, 120, 25],
    [252, 165, 10],
    [246, 215, 70],
    [252, 255, 164],
];

fn inferno(t: f32) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0) * (INFERNO.len() - 1) as f32;
    let i = (t.floor() as usize).min(INFERNO.len() - 2);
    let f = t - i as f32;
    let a = INFERNO[i];
    let b = INFERNO[i + 1];
    Rgb([
        (a[0] as f32 + f * (b[0] as f32 - a[0] as f32)).round() as u8,
        (a[1] as f32 + f * (b[1] as f32 - a[1] as f32)).round() as u8,
        (a[2] as f32 + f * (b[2] as f32 - a[2] as f32)).round() as u8,
    ])
}

/// Render a depth map as an RGB heatmap.
///
/// Values at or below `vmin` take the bright end of the scale, values at or
/// above `vmax` the dark end. A degenerate range (`vmin >= vmax`) renders a
/// constant image instead of dividing by zero.
pub fn render_heatmap(depth: &DepthMap, opts: &HeatmapOptions) -> RgbImage {
    let span = opts.vmax - opts.vmin;
    RgbImage::from_fn(depth.width as u32, depth.height as u32, |x, y| {
        let v = depth.get(x as usize, y as usize);
        let t = if span > 0.0 {
            ((v - opts.vmin) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        inferno(1.0 - t)
    })
}
