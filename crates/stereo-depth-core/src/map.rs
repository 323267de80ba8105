use crate::error::DepthError;

/// Per-pixel horizontal displacement between a rectified stereo pair.
///
/// Row-major, `data.len() == width * height`. Sentinel/invalid disparities
/// are carried as ordinary floats; the conversion routines decide how to
/// treat them.
#[derive(Clone, Debug, PartialEq)]
pub struct DisparityMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

/// Per-pixel depth in the units of the calibration's square size.
///
/// Same layout as [`DisparityMap`]; every conversion produces a fresh map.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

fn check_dims(width: usize, height: usize, len: usize) -> Result<(), DepthError> {
    if width == 0 || height == 0 {
        return Err(DepthError::EmptyDisparity);
    }
    if len != width * height {
        return Err(DepthError::ShapeMismatch { width, height, len });
    }
    Ok(())
}

impl DisparityMap {
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self, DepthError> {
        check_dims(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }
}

impl DepthMap {
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self, DepthError> {
        check_dims(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }
}
