mod common;

use approx::assert_relative_eq;
use centaur_core::background::{separate_background, BackgroundConfig, MaskStage};
use centaur_core::error::CentaurError;
use centaur_core::stats::SigmaClipParams;
use ndarray::Array2;

use common::{fill_block, noisy, uniform, SATURATION};

fn separate(
    data: &Array2<f32>,
    mask: Option<&Array2<bool>>,
) -> centaur_core::error::Result<centaur_core::background::BackgroundModel> {
    separate_background(
        data,
        SATURATION,
        mask,
        &BackgroundConfig::default(),
        &SigmaClipParams::default(),
    )
}

#[test]
fn test_uniform_background() {
    let data = uniform(100, 100, 30_000.0);
    let bg = separate(&data, None).unwrap();
    assert_relative_eq!(bg.mean, 30_000.0);
    assert_relative_eq!(bg.median, 30_000.0);
    assert_eq!(bg.std, 0.0);
    assert_eq!(bg.mask_stage, MaskStage::HotPixelsOnly);
    assert_eq!(bg.pixel_count, 10_000);
    assert_eq!(bg.hot_pixels, 0);
}

#[test]
fn test_hot_pixels_are_excluded() {
    let mut data = uniform(100, 100, 500.0);
    for i in 0..10 {
        data[[i * 9, i * 7]] = SATURATION as f32;
    }
    let bg = separate(&data, None).unwrap();
    assert_eq!(bg.hot_pixels, 10);
    assert_eq!(bg.pixel_count, 9990);
    assert_relative_eq!(bg.mean, 500.0);
}

#[test]
fn test_source_mask_excludes_sources() {
    let mut data = noisy(100, 100, 500.0, 10.0);
    fill_block(&mut data, 40, 40, 20, 20, 5000.0);
    let mut mask = Array2::from_elem((100, 100), false);
    for r in 40..60 {
        for c in 40..60 {
            mask[[r, c]] = true;
        }
    }
    let bg = separate(&data, Some(&mask)).unwrap();
    assert_eq!(bg.mask_stage, MaskStage::SourcesAndHotPixels);
    assert_eq!(bg.pixel_count, 9600);
    assert_eq!(bg.source_regions, 1);
    assert_relative_eq!(bg.median, 500.0, epsilon = 1.0);
}

#[test]
fn test_oversized_source_mask_falls_back_to_hot_pixels() {
    let data = uniform(100, 100, 250.0);
    let mut mask = Array2::from_elem((100, 100), false);
    for r in 0..95 {
        for c in 0..100 {
            mask[[r, c]] = true;
        }
    }
    let bg = separate(&data, Some(&mask)).unwrap();
    assert_eq!(bg.mask_stage, MaskStage::HotPixelsOnly);
    assert_eq!(bg.pixel_count, 10_000);
}

#[test]
fn test_blank_pixels_do_not_count_toward_minimum() {
    // Left half blank; the source mask leaves only 200 finite pixels.
    let mut data = uniform(100, 100, 400.0);
    for r in 0..100 {
        for c in 0..50 {
            data[[r, c]] = f32::NAN;
        }
    }
    let mut mask = Array2::from_elem((100, 100), false);
    for r in 0..96 {
        for c in 50..100 {
            mask[[r, c]] = true;
        }
    }
    let bg = separate(&data, Some(&mask)).unwrap();
    assert_eq!(bg.mask_stage, MaskStage::HotPixelsOnly);
    assert_eq!(bg.pixel_count, 5000);
    assert_relative_eq!(bg.median, 400.0);
}

#[test]
fn test_mostly_blank_frame_uses_every_finite_pixel() {
    let mut data = uniform(100, 100, f32::NAN);
    fill_block(&mut data, 0, 0, 20, 20, 150.0);
    let bg = separate(&data, None).unwrap();
    assert_eq!(bg.mask_stage, MaskStage::Unmasked);
    assert_eq!(bg.pixel_count, 400);
    assert_relative_eq!(bg.median, 150.0);
}

#[test]
fn test_small_frame_uses_every_pixel() {
    let mut data = uniform(20, 20, 100.0);
    data[[3, 3]] = SATURATION as f32;
    let bg = separate(&data, None).unwrap();
    assert_eq!(bg.mask_stage, MaskStage::Unmasked);
    assert_eq!(bg.pixel_count, 400);
    // Sigma clipping still drops the hot pixel.
    assert_relative_eq!(bg.median, 100.0);
}

#[test]
fn test_lower_minimum_keeps_masked_set() {
    let data = uniform(20, 20, 100.0);
    let config = BackgroundConfig {
        min_background_pixels: 100,
        ..Default::default()
    };
    let bg = separate_background(&data, SATURATION, None, &config, &SigmaClipParams::default())
        .unwrap();
    assert_eq!(bg.mask_stage, MaskStage::HotPixelsOnly);
}

#[test]
fn test_mask_shape_mismatch() {
    let data = uniform(10, 10, 1.0);
    let mask = Array2::from_elem((5, 5), false);
    let err = separate(&data, Some(&mask)).unwrap_err();
    assert!(matches!(err, CentaurError::ShapeMismatch { .. }));
}

#[test]
fn test_invalid_inputs() {
    let empty = Array2::<f32>::zeros((0, 3));
    assert!(matches!(
        separate(&empty, None).unwrap_err(),
        CentaurError::InsufficientData(_)
    ));

    let data = uniform(10, 10, 1.0);
    let err = separate_background(
        &data,
        0.0,
        None,
        &BackgroundConfig::default(),
        &SigmaClipParams::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CentaurError::InvalidConfiguration(_)));
}

#[test]
fn test_config_validation() {
    let bad = BackgroundConfig {
        hot_pixel_fraction: 1.5,
        ..Default::default()
    };
    assert!(bad.validate().is_err());
    assert!(BackgroundConfig::default().validate().is_ok());
}

#[test]
fn test_mask_stage_serializes_snake_case() {
    assert_eq!(
        serde_json::to_value(MaskStage::SourcesAndHotPixels).unwrap(),
        serde_json::json!("sources_and_hot_pixels")
    );
}
