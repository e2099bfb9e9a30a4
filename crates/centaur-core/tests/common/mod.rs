#![allow(dead_code)]

use centaur_core::frame::{Frame, FrameMetadata};
use ndarray::Array2;

pub const SATURATION: f64 = 65_535.0;

/// Constant-valued pixel array.
pub fn uniform(h: usize, w: usize, value: f32) -> Array2<f32> {
    Array2::from_elem((h, w), value)
}

/// Background `level` with deterministic pseudo-random noise in
/// [-amplitude, amplitude].
pub fn noisy(h: usize, w: usize, level: f32, amplitude: f32) -> Array2<f32> {
    let mut state: u32 = 0x2545_f491;
    Array2::from_shape_fn((h, w), |_| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let unit = (state as f64 / u32::MAX as f64) as f32;
        level + amplitude * (2.0 * unit - 1.0)
    })
}

/// Set a rectangular block to `value`.
pub fn fill_block(data: &mut Array2<f32>, row: usize, col: usize, h: usize, w: usize, value: f32) {
    for r in row..row + h {
        for c in col..col + w {
            data[[r, c]] = value;
        }
    }
}

pub fn metadata_with_exposure(exposure: f64) -> FrameMetadata {
    FrameMetadata {
        exposure_time: Some(exposure),
        gain: Some(1.0),
        read_noise: Some(10.0),
        ..Default::default()
    }
}

pub fn frame(data: Array2<f32>, metadata: FrameMetadata) -> Frame {
    Frame::new(data, "test_frame.fits", metadata)
}

// ---------------------------------------------------------------------------
// FITS synthesis
// ---------------------------------------------------------------------------

/// One 80-character header card.
pub fn card(keyword: &str, value: &str) -> String {
    let text = if keyword == "END" {
        "END".to_string()
    } else {
        format!("{:<8}= {:>20}", keyword, value)
    };
    format!("{:<80}", text)
}

/// Header block(s) for a primary image HDU, padded to 2880 bytes.
pub fn fits_header(bitpix: i32, axes: &[usize], extra: &[(&str, &str)]) -> Vec<u8> {
    let mut cards = vec![
        card("SIMPLE", "T"),
        card("BITPIX", &bitpix.to_string()),
        card("NAXIS", &axes.len().to_string()),
    ];
    for (i, n) in axes.iter().enumerate() {
        cards.push(card(&format!("NAXIS{}", i + 1), &n.to_string()));
    }
    for (k, v) in extra {
        cards.push(card(k, v));
    }
    cards.push(card("END", ""));

    let mut buf: Vec<u8> = cards.concat().into_bytes();
    let padded = buf.len().div_ceil(2880) * 2880;
    buf.resize(padded, b' ');
    buf
}

/// Append big-endian data and pad to the block size.
pub fn finish_fits(mut buf: Vec<u8>, data: &[u8]) -> Vec<u8> {
    buf.extend_from_slice(data);
    let padded = buf.len().div_ceil(2880) * 2880;
    buf.resize(padded, 0);
    buf
}

pub fn i16_be(values: &[i16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

pub fn f32_be(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Complete 32-bit float FITS file for `data` with extra header cards.
pub fn build_float_fits(data: &Array2<f32>, extra: &[(&str, &str)]) -> Vec<u8> {
    let (h, w) = data.dim();
    let header = fits_header(-32, &[w, h], extra);
    let values: Vec<f32> = data.iter().copied().collect();
    finish_fits(header, &f32_be(&values))
}
