//! Disparity-to-depth conversion for rectified stereo rigs.
//!
//! Takes the rectification artifact an upstream stereo-calibration step
//! persists (projection matrices `P_l`/`P_r` and reprojection matrix `Q`)
//! and converts per-pixel disparity maps into metric depth maps, with an
//! optional false-color heatmap for inspection.
//!
//! Two equivalent conversion paths are exposed:
//! - [`depth_from_projections`]: `fx * baseline / |d + (cx_r - cx_l)|`
//! - [`depth_from_q`]: reproject `[x, y, d, 1]` through `Q` and take Z/W
//!
//! Zero or invalid disparities map to a very large finite depth rather than
//! infinity; that substitution is policy, not an error.

mod batch;
mod calibration;
mod convert;
mod error;
mod heatmap;
pub mod io;
mod logger;
mod map;

pub use batch::{convert_file, run_batch, BatchOptions};
pub use calibration::{ChessboardConfig, RectifiedPair, StereoRigCalibration};
pub use convert::{depth_from_projections, depth_from_q, DepthMethod, DISPARITY_EPSILON};
pub use error::{CalibrationError, DepthError};
pub use heatmap::{render_heatmap, HeatmapOptions};
pub use map::{DepthMap, DisparityMap};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_logger;
