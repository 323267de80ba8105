//! End-to-end coverage of file I/O, single-file conversion and the batch
//! driver, using real on-disk artifacts in a temp directory.

use nalgebra::Matrix3x4;
use npyz::WriterBuilder;
use std::path::Path;
use stereo_depth_core::{
    convert_file, io, run_batch, BatchOptions, ChessboardConfig, DepthError, DepthMethod,
    HeatmapOptions, StereoRigCalibration,
};

fn sample_calib() -> StereoRigCalibration {
    let fx = 800.0;
    let baseline = 0.12;
    let p_left = Matrix3x4::new(
        fx, 0.0, 320.0, 0.0, //
        0.0, fx, 240.0, 0.0, //
        0.0, 0.0, 1.0, 0.0,
    );
    let p_right = Matrix3x4::new(
        fx, 0.0, 330.0, -fx * baseline, //
        0.0, fx, 240.0, 0.0, //
        0.0, 0.0, 1.0, 0.0,
    );
    let q = stereo_depth_core::RectifiedPair { p_left, p_right }.reprojection_matrix();
    StereoRigCalibration::new(
        p_left,
        p_right,
        q,
        Some(ChessboardConfig {
            rows: 6,
            cols: 9,
            square_size: 0.025,
        }),
    )
    .unwrap()
}

fn write_npy_f32(path: &Path, width: usize, height: usize, data: &[f32]) {
    let file = std::io::BufWriter::new(std::fs::File::create(path).unwrap());
    let mut writer = npyz::WriteOptions::new()
        .default_dtype()
        .shape(&[height as u64, width as u64])
        .writer(file)
        .begin_nd()
        .unwrap();
    writer.extend(data.iter().copied()).unwrap();
    writer.finish().unwrap();
}

fn write_npy_f64(path: &Path, width: usize, height: usize, data: &[f64]) {
    let file = std::io::BufWriter::new(std::fs::File::create(path).unwrap());
    let mut writer = npyz::WriteOptions::new()
        .default_dtype()
        .shape(&[height as u64, width as u64])
        .writer(file)
        .begin_nd()
        .unwrap();
    writer.extend(data.iter().copied()).unwrap();
    writer.finish().unwrap();
}

fn ramp(n: usize) -> Vec<f32> {
    (0..n).map(|i| 8.0 + (i % 31) as f32 * 0.75).collect()
}

#[test]
fn loads_f4_and_f8_disparity_arrays() {
    let dir = tempfile::tempdir().unwrap();

    let f4 = dir.path().join("disp_f4.npy");
    write_npy_f32(&f4, 5, 3, &ramp(15));
    let m = io::load_disparity_npy(&f4).unwrap();
    assert_eq!((m.width, m.height), (5, 3));
    assert_eq!(m.data, ramp(15));

    let f8 = dir.path().join("disp_f8.npy");
    let doubles: Vec<f64> = ramp(15).iter().map(|&v| v as f64).collect();
    write_npy_f64(&f8, 5, 3, &doubles);
    let m8 = io::load_disparity_npy(&f8).unwrap();
    assert_eq!(m8.data, m.data);
}

#[test]
fn integer_disparity_arrays_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disp_i4.npy");
    let file = std::io::BufWriter::new(std::fs::File::create(&path).unwrap());
    let mut writer = npyz::WriteOptions::new()
        .default_dtype()
        .shape(&[2, 2])
        .writer(file)
        .begin_nd()
        .unwrap();
    writer.extend([1i32, 2, 3, 4]).unwrap();
    writer.finish().unwrap();

    let err = io::load_disparity_npy(&path).unwrap_err();
    assert!(matches!(err, DepthError::UnsupportedDtype { .. }));
}

#[test]
fn missing_disparity_file_is_an_error() {
    let err = io::load_disparity_npy("no/such/disparity.npy").unwrap_err();
    assert!(matches!(err, DepthError::InputNotFound(_)));
}

#[test]
fn depth_tiff_round_trips_bit_for_bit() {
    let calib = sample_calib();
    let dir = tempfile::tempdir().unwrap();

    let input = dir.path().join("rectified_left_0.npy");
    write_npy_f32(&input, 12, 9, &ramp(108));

    // Once with a heatmap, once without: the raw artifact must be identical.
    let with_heat = dir.path().join("with_heat.tif");
    let without_heat = dir.path().join("without_heat.tif");
    let heat = dir.path().join("heat.png");

    let depth_a = convert_file(
        &calib,
        DepthMethod::Projection,
        &input,
        Some(&with_heat),
        Some(&heat),
        &HeatmapOptions::default(),
    )
    .unwrap();
    let depth_b = convert_file(
        &calib,
        DepthMethod::Projection,
        &input,
        Some(&without_heat),
        None,
        &HeatmapOptions::default(),
    )
    .unwrap();

    assert_eq!(depth_a, depth_b);
    assert_eq!(io::load_depth_tiff(&with_heat).unwrap(), depth_a);
    assert_eq!(io::load_depth_tiff(&without_heat).unwrap(), depth_a);
    assert!(heat.exists());
}

#[test]
fn convert_file_fails_on_missing_input() {
    let calib = sample_calib();
    let err = convert_file(
        &calib,
        DepthMethod::Projection,
        Path::new("missing_0.npy"),
        None,
        None,
        &HeatmapOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, DepthError::InputNotFound(_)));
}

#[test]
fn batch_stops_at_first_gap() {
    let calib = sample_calib();
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("disp");
    let output_dir = dir.path().join("depth");
    std::fs::create_dir_all(&input_dir).unwrap();

    for i in 0..5 {
        let path = input_dir.join(format!("rectified_left_{i}.npy"));
        write_npy_f32(&path, 6, 4, &ramp(24));
    }
    // A file beyond the gap must not be picked up.
    write_npy_f32(&input_dir.join("rectified_left_6.npy"), 6, 4, &ramp(24));

    let count = run_batch(&calib, &input_dir, &output_dir, &BatchOptions::default()).unwrap();
    assert_eq!(count, 5);

    for i in 0..5 {
        assert!(output_dir.join(format!("{i}_depth.tif")).exists());
        assert!(output_dir.join(format!("{i}_heatmap.png")).exists());
    }
    assert!(!output_dir.join("5_depth.tif").exists());
    assert!(!output_dir.join("6_depth.tif").exists());
}

#[test]
fn batch_without_heatmaps_writes_only_depth() {
    let calib = sample_calib();
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("disp");
    let output_dir = dir.path().join("depth");
    std::fs::create_dir_all(&input_dir).unwrap();
    write_npy_f32(&input_dir.join("rectified_left_0.npy"), 4, 4, &ramp(16));

    let opts = BatchOptions {
        write_heatmap: false,
        method: DepthMethod::QMatrix,
        ..BatchOptions::default()
    };
    let count = run_batch(&calib, &input_dir, &output_dir, &opts).unwrap();
    assert_eq!(count, 1);
    assert!(output_dir.join("0_depth.tif").exists());
    assert!(!output_dir.join("0_heatmap.png").exists());
}

#[test]
fn empty_sequence_is_a_successful_zero_run() {
    let calib = sample_calib();
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("depth");
    let count = run_batch(&calib, dir.path(), &output_dir, &BatchOptions::default()).unwrap();
    assert_eq!(count, 0);
}
