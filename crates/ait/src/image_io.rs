//! PNG read/write wrappers over `ndarray` pixel arrays.
//!
//! - `read_png`: decode any image file into `[h, w]` (gray) or `[h, w, c]`
//!   (`c` in 2..=4) `u8` pixels.
//! - `save_png`: clip to `[0, 255]`, truncate to `u8`, encode as PNG.
//!
//! Layout follows ndarray indexing: axis 0 is the row (y), axis 1 the column (x).

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageReader};
use ndarray::{ArrayBase, ArrayD, Data, Dimension, IxDyn, ShapeError};
use num_traits::AsPrimitive;

use crate::cfg::{PIXEL_MAX, PIXEL_MIN};

/// Errors surfaced by the PNG wrappers.
#[derive(Debug)]
pub enum ImageIoError {
    /// Path missing, unreadable, or not a decodable image.
    Read { path: PathBuf, source: ImageError },
    /// File could not be created or the encoder failed.
    Write { path: PathBuf, source: ImageError },
    /// Array shape is not `[h, w]` or `[h, w, 1..=4]`.
    UnsupportedLayout { shape: Vec<usize> },
    /// Decoded buffer did not match the reported image dimensions.
    Shape(ShapeError),
}

impl fmt::Display for ImageIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageIoError::Read { path, source } => {
                write!(f, "failed to read image {}: {}", path.display(), source)
            }
            ImageIoError::Write { path, source } => {
                write!(f, "failed to write png {}: {}", path.display(), source)
            }
            ImageIoError::UnsupportedLayout { shape } => write!(
                f,
                "pixel array of shape {:?} is not [h, w] or [h, w, 1..=4]",
                shape
            ),
            ImageIoError::Shape(err) => write!(f, "decoded buffer has wrong size: {}", err),
        }
    }
}

impl std::error::Error for ImageIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageIoError::Read { source, .. } | ImageIoError::Write { source, .. } => Some(source),
            ImageIoError::Shape(err) => Some(err),
            ImageIoError::UnsupportedLayout { .. } => None,
        }
    }
}

impl From<ShapeError> for ImageIoError {
    fn from(err: ShapeError) -> Self {
        ImageIoError::Shape(err)
    }
}

/// Read an image file into `u8` pixels.
///
/// The format is sniffed from the file contents, so the extension does not
/// matter. Deeper-than-8-bit images are narrowed to 8 bits per channel.
pub fn read_png<P: AsRef<Path>>(path: P) -> Result<ArrayD<u8>, ImageIoError> {
    let path = path.as_ref();
    let read_err = |source: ImageError| ImageIoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let img = ImageReader::open(path)
        .map_err(|e| read_err(ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| read_err(ImageError::IoError(e)))?
        .decode()
        .map_err(read_err)?;

    let (h, w) = (img.height() as usize, img.width() as usize);
    let (shape, raw) = match img.color().channel_count() {
        1 => (vec![h, w], img.into_luma8().into_raw()),
        2 => (vec![h, w, 2], img.into_luma_alpha8().into_raw()),
        3 => (vec![h, w, 3], img.into_rgb8().into_raw()),
        _ => (vec![h, w, 4], img.into_rgba8().into_raw()),
    };
    Ok(ArrayD::from_shape_vec(IxDyn(&shape), raw)?)
}

/// Save pixels as a PNG, creating or overwriting `path`.
///
/// Any primitive numeric element type is accepted, including the `usize`
/// maps returned by [`crate::labels::label`]. Values are clipped to `[0, 255]`
/// and truncated toward zero; NaN becomes 0. Out-of-range input is never an
/// error.
///
/// The PNG is encoded in memory first, so a failed encode leaves any file
/// already at `path` untouched.
pub fn save_png<A, S, D, P>(img: &ArrayBase<S, D>, path: P) -> Result<(), ImageIoError>
where
    A: AsPrimitive<f64>,
    S: Data<Elem = A>,
    D: Dimension,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let (h, w, color) = match *img.shape() {
        [h, w] | [h, w, 1] => (h, w, ExtendedColorType::L8),
        [h, w, 2] => (h, w, ExtendedColorType::La8),
        [h, w, 3] => (h, w, ExtendedColorType::Rgb8),
        [h, w, 4] => (h, w, ExtendedColorType::Rgba8),
        _ => {
            return Err(ImageIoError::UnsupportedLayout {
                shape: img.shape().to_vec(),
            })
        }
    };
    // Logical (row-major) order, independent of the array's memory layout.
    let bytes: Vec<u8> = img.iter().map(|&v| clip_to_u8(v.as_())).collect();

    let write_err = |source: ImageError| ImageIoError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut encoded = Vec::new();
    PngEncoder::new(&mut encoded)
        .write_image(&bytes, w as u32, h as u32, color)
        .map_err(write_err)?;
    fs::write(path, encoded).map_err(|e| write_err(ImageError::IoError(e)))
}

#[inline]
fn clip_to_u8(v: f64) -> u8 {
    // `as` saturates and maps NaN to 0.
    v.clamp(PIXEL_MIN, PIXEL_MAX) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{label, Connectivity};
    use ndarray::{array, Array2, Array3};
    use tempfile::tempdir;

    #[test]
    fn gray_round_trip_truncates_fractions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let img = array![[0.0, 12.7, 128.0], [254.9, 255.0, 1.0]];
        save_png(&img, &path).unwrap();
        let back = read_png(&path).unwrap();
        assert_eq!(back.shape(), &[2, 3]);
        assert_eq!(
            back.into_dimensionality::<ndarray::Ix2>().unwrap(),
            array![[0u8, 12, 128], [254, 255, 1]]
        );
    }

    #[test]
    fn out_of_range_values_are_clipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.png");
        let img = array![[-10.0, 300.0], [f64::NAN, 42.0]];
        save_png(&img, &path).unwrap();
        let back = read_png(&path).unwrap();
        assert_eq!(back[[0, 0]], 0);
        assert_eq!(back[[0, 1]], 255);
        assert_eq!(back[[1, 0]], 0);
        assert_eq!(back[[1, 1]], 42);
    }

    #[test]
    fn label_maps_save_with_wide_integers_clipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.png");
        // 300 distinct values along a row give labels 1..=300
        let row = Array2::from_shape_fn((1, 300), |(_, x)| x as u32 + 1);
        let (labels, count) = label(&row, Connectivity::Full).unwrap();
        assert_eq!(count, 300);
        save_png(&labels, &path).unwrap();
        let back = read_png(&path).unwrap();
        assert_eq!(back.shape(), &[1, 300]);
        assert_eq!(back[[0, 0]], 1);
        assert_eq!(back[[0, 254]], 255);
        assert_eq!(back[[0, 299]], 255);

        let wide = array![[-5i64, 70], [401, 255]];
        save_png(&wide, &path).unwrap();
        assert_eq!(
            read_png(&path).unwrap().into_dimensionality::<ndarray::Ix2>().unwrap(),
            array![[0u8, 70], [255, 255]]
        );
    }

    #[test]
    fn failed_encode_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keep.png");
        save_png(&array![[1u8, 2], [3, 4]], &path).unwrap();
        let before = fs::read(&path).unwrap();

        let empty = Array2::<u8>::zeros((0, 3));
        assert!(matches!(
            save_png(&empty, &path),
            Err(ImageIoError::Write { .. })
        ));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn rgb_and_rgba_keep_channel_axis() {
        let dir = tempdir().unwrap();
        for channels in [2usize, 3, 4] {
            let path = dir.path().join(format!("c{channels}.png"));
            let img = Array3::from_shape_fn((2, 3, channels), |(y, x, c)| {
                (y * 60 + x * 20 + c * 5) as u8
            });
            save_png(&img, &path).unwrap();
            let back = read_png(&path).unwrap();
            assert_eq!(back.shape(), &[2, 3, channels]);
            assert_eq!(back, img.into_dyn());
        }
    }

    #[test]
    fn single_channel_axis_is_saved_as_gray() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.png");
        let img = Array3::<i32>::from_elem((2, 2, 1), 77);
        save_png(&img, &path).unwrap();
        assert_eq!(read_png(&path).unwrap().shape(), &[2, 2]);
    }

    #[test]
    fn transposed_views_are_written_in_logical_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.png");
        let img = Array2::from_shape_fn((2, 3), |(y, x)| (y * 3 + x) as u8);
        save_png(&img.t(), &path).unwrap();
        let back = read_png(&path).unwrap();
        assert_eq!(back, img.t().to_owned().into_dyn());
    }

    #[test]
    fn missing_or_garbage_files_fail_to_read() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        assert!(matches!(
            read_png(&missing),
            Err(ImageIoError::Read { .. })
        ));

        let garbage = dir.path().join("garbage.png");
        fs::write(&garbage, b"definitely not an image").unwrap();
        let err = read_png(&garbage).unwrap_err();
        assert!(matches!(err, ImageIoError::Read { .. }));
        assert!(err.to_string().contains("garbage.png"));
    }

    #[test]
    fn unsupported_layouts_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.png");
        let line = ndarray::Array1::<f64>::zeros(5);
        assert!(matches!(
            save_png(&line, &path),
            Err(ImageIoError::UnsupportedLayout { .. })
        ));
        let five = Array3::<u8>::zeros((2, 2, 5));
        match save_png(&five, &path) {
            Err(ImageIoError::UnsupportedLayout { shape }) => assert_eq!(shape, vec![2, 2, 5]),
            other => panic!("expected layout error, got {:?}", other),
        }
        assert!(!path.exists());
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no/such/dir/x.png");
        let img = Array2::<u8>::zeros((2, 2));
        assert!(matches!(
            save_png(&img, &path),
            Err(ImageIoError::Write { .. })
        ));
    }
}
