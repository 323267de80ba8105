use std::path::PathBuf;

/// Errors raised while loading or validating a stereo calibration artifact.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    #[error("calibration file not found: {0}")]
    NotFound(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("matrix {name} has shape {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    BadShape {
        name: &'static str,
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },
    #[error("matrix {name} has a degenerate focal length (fx = {fx})")]
    DegenerateFocal { name: &'static str, fx: f64 },
}

/// Errors raised by a single disparity-to-depth conversion.
#[derive(thiserror::Error, Debug)]
pub enum DepthError {
    #[error("input not found: {0}")]
    InputNotFound(PathBuf),
    #[error("disparity map is empty")]
    EmptyDisparity,
    #[error("buffer of length {len} does not match a {width}x{height} map")]
    ShapeMismatch {
        width: usize,
        height: usize,
        len: usize,
    },
    #[error("disparity array has {dims} dimensions, expected 2")]
    NotTwoDimensional { dims: usize },
    #[error("unsupported disparity element type {dtype}")]
    UnsupportedDtype { dtype: String },
    #[error("Fortran-order disparity arrays are not supported")]
    FortranOrder,
    #[error("depth image is not single-channel 32-bit float")]
    NotFloatDepth,
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Tiff(#[from] tiff::TiffError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}
