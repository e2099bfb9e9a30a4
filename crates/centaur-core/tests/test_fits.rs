mod common;

use std::io::Write;

use approx::assert_relative_eq;
use centaur_core::error::CentaurError;
use centaur_core::io::fits::{FitsReader, HeaderValue};
use centaur_core::pipeline::{analyze_frame, AnalysisConfig, AnalysisInputs};
use ndarray::Array2;
use tempfile::NamedTempFile;

use common::{build_float_fits, f32_be, finish_fits, fits_header, i16_be, noisy};

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".fits").tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_read_unsigned_16bit_with_bzero() {
    // 3x2 image stored as signed 16-bit with BZERO = 32768.
    let physical: [i32; 6] = [0, 1000, 32768, 40000, 65535, 12345];
    let raw: Vec<i16> = physical.iter().map(|&p| (p - 32768) as i16).collect();
    let header = fits_header(16, &[3, 2], &[("BZERO", "32768"), ("BSCALE", "1")]);
    let file = write_temp(&finish_fits(header, &i16_be(&raw)));

    let reader = FitsReader::open(file.path()).unwrap();
    assert_eq!(reader.width(), 3);
    assert_eq!(reader.height(), 2);
    assert_eq!(reader.bitpix(), 16);

    let pixels = reader.read_pixels().unwrap();
    assert_eq!(pixels.dim(), (2, 3));
    assert_eq!(pixels[[0, 0]], 0.0);
    assert_eq!(pixels[[0, 1]], 1000.0);
    assert_eq!(pixels[[1, 0]], 40000.0);
    assert_eq!(pixels[[1, 1]], 65535.0);
    assert_eq!(pixels[[1, 2]], 12345.0);
}

#[test]
fn test_read_float_image_and_metadata() {
    let mut data = Array2::<f32>::zeros((4, 5));
    data[[2, 3]] = 123.5;
    let bytes = build_float_fits(
        &data,
        &[
            ("EXPTIME", "300.0"),
            ("GAIN", "1.5"),
            ("RDNOISE", "3.2"),
            ("SATURATE", "60000"),
            ("XPIXSZ", "3.76"),
            ("FOCALLEN", "540"),
            ("FILTER", "'Ha      '"),
            ("OBJECT", "'M 42'"),
        ],
    );
    let file = write_temp(&bytes);

    let reader = FitsReader::open(file.path()).unwrap();
    let frame = reader.read_frame().unwrap();
    assert_eq!(frame.data.dim(), (4, 5));
    assert_eq!(frame.data[[2, 3]], 123.5);
    assert!(frame.filename.ends_with(".fits"));

    let meta = &frame.metadata;
    assert_eq!(meta.exposure_time, Some(300.0));
    assert_eq!(meta.gain, Some(1.5));
    assert_eq!(meta.read_noise, Some(3.2));
    assert_eq!(meta.saturation_level, Some(60000.0));
    assert_eq!(meta.pixel_size_um, Some(3.76));
    assert_eq!(meta.focal_length_mm, Some(540.0));
    assert_eq!(meta.filter.as_deref(), Some("Ha"));
    assert_eq!(meta.target.as_deref(), Some("M 42"));
    assert_eq!(meta.pixel_scale, None);

    assert_eq!(
        reader.header.get("SIMPLE"),
        Some(&HeaderValue::Logical(true))
    );
}

#[test]
fn test_exposure_keyword_alias() {
    let data = Array2::<f32>::zeros((2, 2));
    let file = write_temp(&build_float_fits(&data, &[("EXPOSURE", "45")]));
    let reader = FitsReader::open(file.path()).unwrap();
    assert_eq!(reader.metadata().exposure_time, Some(45.0));
}

#[test]
fn test_cube_uses_first_plane() {
    let plane0 = [1.0f32, 2.0, 3.0, 4.0];
    let plane1 = [9.0f32; 4];
    let mut values = plane0.to_vec();
    values.extend_from_slice(&plane1);
    let header = fits_header(-32, &[2, 2, 2], &[]);
    let file = write_temp(&finish_fits(header, &f32_be(&values)));

    let pixels = FitsReader::open(file.path()).unwrap().read_pixels().unwrap();
    assert_eq!(pixels.dim(), (2, 2));
    assert_eq!(pixels[[1, 1]], 4.0);
}

#[test]
fn test_blank_values_become_nan() {
    let header = fits_header(16, &[2, 1], &[("BLANK", "-32768")]);
    let file = write_temp(&finish_fits(header, &i16_be(&[-32768, 7])));
    let pixels = FitsReader::open(file.path()).unwrap().read_pixels().unwrap();
    assert!(pixels[[0, 0]].is_nan());
    assert_eq!(pixels[[0, 1]], 7.0);
}

#[test]
fn test_truncated_data_is_rejected() {
    let header = fits_header(-32, &[100, 100], &[]);
    let mut bytes = header;
    bytes.extend_from_slice(&[0u8; 400]);
    let file = write_temp(&bytes);
    let err = FitsReader::open(file.path()).err().unwrap();
    assert!(matches!(err, CentaurError::InvalidFits(_)));
}

#[test]
fn test_non_fits_file_is_rejected() {
    let file = write_temp(&[b'x'; 4000]);
    let err = FitsReader::open(file.path()).err().unwrap();
    assert!(matches!(err, CentaurError::InvalidFits(_)));
}

#[test]
fn test_unsupported_bitpix_is_rejected() {
    let header = fits_header(64, &[2, 2], &[]);
    let file = write_temp(&finish_fits(header, &[0u8; 32]));
    let err = FitsReader::open(file.path()).err().unwrap();
    assert!(matches!(err, CentaurError::InvalidFits(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = FitsReader::open(std::path::Path::new("/nonexistent/frame.fits"))
        .err()
        .unwrap();
    assert!(matches!(err, CentaurError::Io(_)));
}

#[test]
fn test_decoded_frame_analyzes() {
    let data = noisy(120, 120, 800.0, 30.0);
    let bytes = build_float_fits(
        &data,
        &[("EXPTIME", "120"), ("GAIN", "1.0"), ("PIXSCALE", "1.2")],
    );
    let file = write_temp(&bytes);
    let frame = FitsReader::open(file.path()).unwrap().read_frame().unwrap();

    let report =
        analyze_frame(&frame, &AnalysisInputs::default(), &AnalysisConfig::default()).unwrap();
    assert_relative_eq!(report.background.median, 800.0, epsilon = 2.0);
    assert_relative_eq!(report.exposure.current_exposure, 120.0);
    assert!(report.sky.mag_per_arcsec2.is_some());
}
