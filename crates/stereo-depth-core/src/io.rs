//! File formats at the pipeline seams.
//!
//! Disparity maps arrive as NumPy `.npy` arrays from the stereo matcher.
//! Depth maps leave as single-channel 32-bit float TIFF, the lossless
//! numeric artifact downstream consumers read; heatmaps are plain PNG and
//! are written by the caller via `image`.

use crate::error::DepthError;
use crate::map::{DepthMap, DisparityMap};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};

/// Load a 2-D `.npy` disparity array.
///
/// Accepts `f4` directly and `f8` with a cast to f32, matching the float32
/// working precision of the conversion. A missing file is an error here;
/// the batch driver checks for existence first and treats absence as the
/// end of the sequence.
pub fn load_disparity_npy(path: impl AsRef<Path>) -> Result<DisparityMap, DepthError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DepthError::InputNotFound(path.to_path_buf()));
    }

    let npy = npyz::NpyFile::new(BufReader::new(File::open(path)?))?;
    let shape = npy.shape().to_vec();
    if shape.len() != 2 {
        return Err(DepthError::NotTwoDimensional { dims: shape.len() });
    }
    if npy.order() == npyz::Order::Fortran {
        return Err(DepthError::FortranOrder);
    }
    let (height, width) = (shape[0] as usize, shape[1] as usize);

    let dtype = npy.dtype();
    let data: Vec<f32> = match &dtype {
        npyz::DType::Plain(ts)
            if ts.type_char() == npyz::TypeChar::Float && ts.size_field() == 4 =>
        {
            npy.into_vec::<f32>()?
        }
        npyz::DType::Plain(ts)
            if ts.type_char() == npyz::TypeChar::Float && ts.size_field() == 8 =>
        {
            npy.into_vec::<f64>()?.into_iter().map(|v| v as f32).collect()
        }
        other => {
            return Err(DepthError::UnsupportedDtype {
                dtype: other.descr(),
            })
        }
    };

    DisparityMap::from_vec(width, height, data)
}

/// Persist a depth map as a single-channel 32-bit float TIFF.
///
/// No normalization or quantization; [`load_depth_tiff`] round-trips the
/// exact f32 values.
pub fn save_depth_tiff(path: impl AsRef<Path>, depth: &DepthMap) -> Result<(), DepthError> {
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = TiffEncoder::new(file)?;
    encoder.write_image::<colortype::Gray32Float>(
        depth.width as u32,
        depth.height as u32,
        &depth.data,
    )?;
    Ok(())
}

/// Read back a depth map written by [`save_depth_tiff`].
pub fn load_depth_tiff(path: impl AsRef<Path>) -> Result<DepthMap, DepthError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DepthError::InputNotFound(path.to_path_buf()));
    }

    let mut decoder = Decoder::new(BufReader::new(File::open(path)?))?;
    let (width, height) = decoder.dimensions()?;
    match decoder.read_image()? {
        DecodingResult::F32(data) => DepthMap::from_vec(width as usize, height as usize, data),
        _ => Err(DepthError::NotFloatDepth),
    }
}
