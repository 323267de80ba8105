//! Stereo rectification artifact: the matrix store produced by the upstream
//! rectification step.
//!
//! The artifact is a JSON key-value store holding the rectified projection
//! matrices `P_l` and `P_r` (3x4) and the reprojection matrix `Q` (4x4).
//! Matrix shapes are validated at load time; a wrong-shaped entry fails with
//! [`CalibrationError::BadShape`] instead of corrupting downstream math.

use crate::error::CalibrationError;
use nalgebra::{Matrix3x4, Matrix4};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Chessboard geometry used during calibration.
///
/// `square_size` fixes the physical unit of every depth value produced from
/// this rig. Carried explicitly instead of as process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChessboardConfig {
    pub rows: u32,
    pub cols: u32,
    pub square_size: f64,
}

/// Rectified projection matrices of a stereo pair.
///
/// After rectification both cameras share the focal length stored in
/// `P_l[0,0]`; that property is guaranteed upstream and assumed here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectifiedPair {
    pub p_left: Matrix3x4<f64>,
    pub p_right: Matrix3x4<f64>,
}

impl RectifiedPair {
    /// Shared horizontal focal length in pixels.
    #[inline]
    pub fn fx(&self) -> f64 {
        self.p_left[(0, 0)]
    }

    #[inline]
    pub fn cx_left(&self) -> f64 {
        self.p_left[(0, 2)]
    }

    #[inline]
    pub fn cx_right(&self) -> f64 {
        self.p_right[(0, 2)]
    }

    #[inline]
    pub fn cy(&self) -> f64 {
        self.p_left[(1, 2)]
    }

    /// Signed horizontal translation of the right camera, in calibration
    /// units. Negative when the right camera sits to the right of the left
    /// one (the usual rectified convention).
    #[inline]
    pub fn tx(&self) -> f64 {
        self.p_right[(0, 3)] / self.fx()
    }

    /// Physical distance between the camera centers.
    #[inline]
    pub fn baseline(&self) -> f64 {
        self.tx().abs()
    }

    /// Derive the 4x4 disparity-to-3D reprojection matrix for this pair.
    ///
    /// Follows the `stereoRectify` convention: a homogeneous pixel
    /// `[x, y, d, 1]` maps to `[X, Y, Z, W]` with `Z/W` the metric depth.
    /// Feeding the result to [`crate::depth_from_q`] reproduces
    /// [`crate::depth_from_projections`] up to rounding.
    pub fn reprojection_matrix(&self) -> Matrix4<f64> {
        let tx = self.tx();
        Matrix4::new(
            1.0,
            0.0,
            0.0,
            -self.cx_left(),
            0.0,
            1.0,
            0.0,
            -self.cy(),
            0.0,
            0.0,
            0.0,
            self.fx(),
            0.0,
            0.0,
            -1.0 / tx,
            (self.cx_left() - self.cx_right()) / tx,
        )
    }
}

/// Validated calibration artifact for one rectified stereo rig.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoRigCalibration {
    pub rectified: RectifiedPair,
    pub q: Matrix4<f64>,
    pub chessboard: Option<ChessboardConfig>,
}

/// On-disk form. Matrix entries keep the names the rectification step writes.
#[derive(Serialize, Deserialize)]
struct RawCalibration {
    #[serde(rename = "P_l")]
    p_l: Vec<Vec<f64>>,
    #[serde(rename = "P_r")]
    p_r: Vec<Vec<f64>>,
    #[serde(rename = "Q")]
    q: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chessboard: Option<ChessboardConfig>,
}

fn check_shape(
    name: &'static str,
    rows: &[Vec<f64>],
    expected_rows: usize,
    expected_cols: usize,
) -> Result<(), CalibrationError> {
    let nrows = rows.len();
    let ncols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let ragged = rows.iter().any(|r| r.len() != expected_cols);
    if nrows != expected_rows || ragged {
        return Err(CalibrationError::BadShape {
            name,
            rows: nrows,
            cols: ncols,
            expected_rows,
            expected_cols,
        });
    }
    Ok(())
}

fn matrix3x4(name: &'static str, rows: &[Vec<f64>]) -> Result<Matrix3x4<f64>, CalibrationError> {
    check_shape(name, rows, 3, 4)?;
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(Matrix3x4::from_row_slice(&flat))
}

fn matrix4(name: &'static str, rows: &[Vec<f64>]) -> Result<Matrix4<f64>, CalibrationError> {
    check_shape(name, rows, 4, 4)?;
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(Matrix4::from_row_slice(&flat))
}

fn rows_of<const R: usize, const C: usize>(m: &nalgebra::SMatrix<f64, R, C>) -> Vec<Vec<f64>> {
    (0..R).map(|i| (0..C).map(|j| m[(i, j)]).collect()).collect()
}

impl StereoRigCalibration {
    /// Build a calibration from already-parsed matrices, validating the
    /// focal length.
    pub fn new(
        p_left: Matrix3x4<f64>,
        p_right: Matrix3x4<f64>,
        q: Matrix4<f64>,
        chessboard: Option<ChessboardConfig>,
    ) -> Result<Self, CalibrationError> {
        let fx = p_left[(0, 0)];
        if fx == 0.0 || !fx.is_finite() {
            return Err(CalibrationError::DegenerateFocal { name: "P_l", fx });
        }
        Ok(Self {
            rectified: RectifiedPair { p_left, p_right },
            q,
            chessboard,
        })
    }

    /// Load and validate a JSON calibration artifact from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CalibrationError::NotFound(path.to_path_buf()));
        }
        let raw: RawCalibration = serde_json::from_str(&fs::read_to_string(path)?)?;
        let p_left = matrix3x4("P_l", &raw.p_l)?;
        let p_right = matrix3x4("P_r", &raw.p_r)?;
        let q = matrix4("Q", &raw.q)?;
        Self::new(p_left, p_right, q, raw.chessboard)
    }

    /// Write this calibration to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), CalibrationError> {
        let raw = RawCalibration {
            p_l: rows_of(&self.rectified.p_left),
            p_r: rows_of(&self.rectified.p_right),
            q: rows_of(&self.q),
            chessboard: self.chessboard,
        };
        fs::write(path, serde_json::to_string_pretty(&raw)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_pair() -> RectifiedPair {
        let fx = 800.0;
        let cy = 240.0;
        let baseline = 0.12;
        RectifiedPair {
            p_left: Matrix3x4::new(
                fx, 0.0, 320.0, 0.0, //
                0.0, fx, cy, 0.0, //
                0.0, 0.0, 1.0, 0.0,
            ),
            p_right: Matrix3x4::new(
                fx, 0.0, 330.0, -fx * baseline, //
                0.0, fx, cy, 0.0, //
                0.0, 0.0, 1.0, 0.0,
            ),
        }
    }

    #[test]
    fn extracts_rig_parameters() {
        let pair = sample_pair();
        assert_eq!(pair.fx(), 800.0);
        assert_eq!(pair.cx_left(), 320.0);
        assert_eq!(pair.cx_right(), 330.0);
        assert_relative_eq!(pair.baseline(), 0.12, max_relative = 1e-12);
        assert!(pair.tx() < 0.0);
    }

    #[test]
    fn derived_q_reprojects_to_expected_depth() {
        let pair = sample_pair();
        let q = pair.reprojection_matrix();

        let d = 40.0_f64;
        let v = q * nalgebra::Vector4::new(100.0, 50.0, d, 1.0);
        let depth = v[2] / v[3];

        // f*B / (d + cx_r - cx_l)
        let expected = 800.0 * 0.12 / (d + 10.0);
        assert_relative_eq!(depth, expected, max_relative = 1e-12);
    }

    #[test]
    fn json_round_trip_preserves_matrices() {
        let pair = sample_pair();
        let calib = StereoRigCalibration::new(
            pair.p_left,
            pair.p_right,
            pair.reprojection_matrix(),
            Some(ChessboardConfig {
                rows: 6,
                cols: 9,
                square_size: 0.025,
            }),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo_map_test.json");
        calib.write_json(&path).unwrap();
        let loaded = StereoRigCalibration::load_json(&path).unwrap();
        assert_eq!(loaded, calib);
    }

    #[test]
    fn wrong_shape_is_a_malformed_calibration() {
        let json = r#"{
            "P_l": [[800.0, 0.0, 320.0], [0.0, 800.0, 240.0], [0.0, 0.0, 1.0]],
            "P_r": [[800.0, 0.0, 330.0, -96.0], [0.0, 800.0, 240.0, 0.0], [0.0, 0.0, 1.0, 0.0]],
            "Q": [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]]
        }"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, json).unwrap();

        match StereoRigCalibration::load_json(&path) {
            Err(CalibrationError::BadShape { name, cols, .. }) => {
                assert_eq!(name, "P_l");
                assert_eq!(cols, 3);
            }
            other => panic!("expected BadShape, got {other:?}"),
        }
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let err = StereoRigCalibration::load_json("no/such/file.json").unwrap_err();
        assert!(matches!(err, CalibrationError::NotFound(_)));
    }

    #[test]
    fn zero_focal_is_rejected() {
        let mut pair = sample_pair();
        pair.p_left[(0, 0)] = 0.0;
        let err = StereoRigCalibration::new(
            pair.p_left,
            pair.p_right,
            Matrix4::identity(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CalibrationError::DegenerateFocal { .. }));
    }
}
