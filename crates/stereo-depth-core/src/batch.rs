//! Single-file and sequence conversion drivers.
//!
//! Two distinct contracts: [`convert_file`] fails when its input is
//! missing, while [`run_batch`] walks `"{prefix}{index}.npy"` from index 0
//! and treats the first missing file as the normal end of the sequence.

use crate::calibration::StereoRigCalibration;
use crate::convert::{depth_from_projections, depth_from_q, DepthMethod};
use crate::error::DepthError;
use crate::heatmap::{render_heatmap, HeatmapOptions};
use crate::io::{load_disparity_npy, save_depth_tiff};
use crate::map::DepthMap;
use log::{debug, info};
use std::{fs, path::Path};

/// Settings for a batch run.
#[derive(Clone, Debug)]
pub struct BatchOptions {
    pub method: DepthMethod,
    /// Disparity files are `"{prefix}{index}.npy"` in the input directory.
    pub prefix: String,
    pub write_heatmap: bool,
    pub heatmap: HeatmapOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            method: DepthMethod::default(),
            prefix: "rectified_left_".to_string(),
            write_heatmap: true,
            heatmap: HeatmapOptions::default(),
        }
    }
}

/// Convert one disparity file, writing the requested artifacts.
///
/// The computed depth map is returned so callers can inspect it without
/// re-reading the TIFF. A missing input file is an error under this
/// contract.
pub fn convert_file(
    calib: &StereoRigCalibration,
    method: DepthMethod,
    input: &Path,
    depth_path: Option<&Path>,
    heatmap_path: Option<&Path>,
    heatmap_opts: &HeatmapOptions,
) -> Result<DepthMap, DepthError> {
    let disparity = load_disparity_npy(input)?;
    debug!(
        "loaded {} ({}x{})",
        input.display(),
        disparity.width,
        disparity.height
    );

    let depth = match method {
        DepthMethod::Projection => depth_from_projections(&disparity, &calib.rectified),
        DepthMethod::QMatrix => depth_from_q(&disparity, &calib.q),
    };

    if let Some(path) = depth_path {
        save_depth_tiff(path, &depth)?;
    }
    if let Some(path) = heatmap_path {
        render_heatmap(&depth, heatmap_opts).save(path)?;
    }
    Ok(depth)
}

/// Convert a contiguous numbered sequence of disparity files.
///
/// Outputs land in `output_dir` (created if absent) as
/// `"{index}_depth.tif"` and `"{index}_heatmap.png"`. Returns the number of
/// files processed; an empty sequence is a successful run of zero items.
pub fn run_batch(
    calib: &StereoRigCalibration,
    input_dir: &Path,
    output_dir: &Path,
    opts: &BatchOptions,
) -> Result<usize, DepthError> {
    fs::create_dir_all(output_dir)?;

    let mut index = 0usize;
    loop {
        let input = input_dir.join(format!("{}{}.npy", opts.prefix, index));
        if !input.exists() {
            break;
        }

        let depth_path = output_dir.join(format!("{index}_depth.tif"));
        let heatmap_path = opts
            .write_heatmap
            .then(|| output_dir.join(format!("{index}_heatmap.png")));

        convert_file(
            calib,
            opts.method,
            &input,
            Some(&depth_path),
            heatmap_path.as_deref(),
            &opts.heatmap,
        )?;

        index += 1;
        if index % 10 == 0 {
            info!("processed {index} disparity maps");
        }
    }

    info!("converted {index} disparity maps");
    Ok(index)
}
