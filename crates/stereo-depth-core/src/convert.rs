//! The disparity-to-depth conversions.
//!
//! Two equivalent formulations are supported: the explicit projection-matrix
//! form and the reprojection-matrix (Q) form. Both return a fresh
//! [`DepthMap`] of the input's shape and never produce infinities for
//! zero/invalid disparities.

use crate::calibration::RectifiedPair;
use crate::map::{DepthMap, DisparityMap};
use nalgebra::{Matrix4, Vector4};

/// Substituted for a zero adjusted disparity so the division stays finite.
/// Zero disparity therefore maps to a very large depth, not an error.
pub const DISPARITY_EPSILON: f32 = 1e-6;

/// Smallest homogeneous scale accepted when dehomogenizing Q reprojections.
const MIN_HOMOGENEOUS_W: f64 = 1e-12;

/// How a conversion derives depth from disparity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DepthMethod {
    /// `fx * baseline / |d + (cx_right - cx_left)|` from the projection pair.
    #[default]
    Projection,
    /// Reproject `[x, y, d, 1]` through the 4x4 Q matrix and take Z/W.
    QMatrix,
}

/// Convert a disparity map to depth using the rectified projection pair.
///
/// `depth = fx * baseline / |d + (cx_right - cx_left)|`, elementwise. An
/// adjusted disparity of exactly zero is replaced by
/// [`DISPARITY_EPSILON`].
pub fn depth_from_projections(disparity: &DisparityMap, pair: &RectifiedPair) -> DepthMap {
    let offset = (pair.cx_right() - pair.cx_left()) as f32;
    let scale = (pair.fx() * pair.baseline()) as f32;

    let data = disparity
        .data
        .iter()
        .map(|&d| {
            let mut adjusted = (d + offset).abs();
            if adjusted == 0.0 {
                adjusted = DISPARITY_EPSILON;
            }
            scale / adjusted
        })
        .collect();

    DepthMap {
        width: disparity.width,
        height: disparity.height,
        data,
    }
}

/// Convert a disparity map to depth through a 4x4 reprojection matrix.
///
/// Each pixel is lifted to the homogeneous vector `[x, y, d, 1]`,
/// multiplied by `q` and dehomogenized; the Z component is the depth. A
/// homogeneous scale below [`MIN_HOMOGENEOUS_W`] in magnitude is clamped so
/// degenerate disparities yield a large finite depth, matching the
/// projection form's epsilon policy.
pub fn depth_from_q(disparity: &DisparityMap, q: &Matrix4<f64>) -> DepthMap {
    let mut data = Vec::with_capacity(disparity.data.len());

    for y in 0..disparity.height {
        for x in 0..disparity.width {
            let d = disparity.get(x, y) as f64;
            let v = q * Vector4::new(x as f64, y as f64, d, 1.0);
            let mut w = v[3];
            if w.abs() < MIN_HOMOGENEOUS_W {
                w = if w < 0.0 {
                    -MIN_HOMOGENEOUS_W
                } else {
                    MIN_HOMOGENEOUS_W
                };
            }
            data.push((v[2] / w) as f32);
        }
    }

    DepthMap {
        width: disparity.width,
        height: disparity.height,
        data,
    }
}
