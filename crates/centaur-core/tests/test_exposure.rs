mod common;

use approx::assert_relative_eq;
use centaur_core::error::CentaurError;
use centaur_core::exposure::{
    advise_exposure, is_narrowband, optimal_sub_length, ExposureConfig, ExposureReason,
};
use centaur_core::frame::FrameMetadata;
use centaur_core::saturation::{classify_saturation, SaturationReport, SaturationSeverity};
use centaur_core::sky::{sky_brightness, SkyBrightness};

use common::{fill_block, metadata_with_exposure, uniform, SATURATION};

fn quiet_saturation() -> SaturationReport {
    classify_saturation(&uniform(100, 100, 1000.0), SATURATION).unwrap()
}

fn high_saturation() -> SaturationReport {
    let mut data = uniform(200, 200, 1000.0);
    fill_block(&mut data, 50, 50, 40, 50, SATURATION as f32);
    classify_saturation(&data, SATURATION).unwrap()
}

fn moderate_saturation() -> SaturationReport {
    let mut data = uniform(100, 100, 1000.0);
    fill_block(&mut data, 40, 40, 4, 5, SATURATION as f32);
    classify_saturation(&data, SATURATION).unwrap()
}

fn sky_for(meta: &FrameMetadata, background_adu: f64) -> SkyBrightness {
    let exposure = meta.exposure_time(false).unwrap();
    sky_brightness(background_adu, meta, exposure, None)
}

fn advise(
    saturation: &SaturationReport,
    snr: f64,
    meta: &FrameMetadata,
) -> centaur_core::exposure::ExposureRecommendation {
    advise_exposure(
        saturation,
        snr,
        &sky_for(meta, 1000.0),
        meta,
        false,
        &ExposureConfig::default(),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// SNR branch
// ---------------------------------------------------------------------------

#[test]
fn test_snr_scaling_within_bounds() {
    let meta = metadata_with_exposure(60.0);
    let rec = advise(&quiet_saturation(), 5.0, &meta);
    assert_relative_eq!(rec.recommended_exposure, 240.0);
    assert_relative_eq!(rec.exposure_factor, 4.0);
    assert_eq!(rec.reason, ExposureReason::SnrOptimization);
    assert!(!rec.indeterminate);
    assert_eq!(rec.target_snr, 10.0);
}

#[test]
fn test_target_reached_keeps_exposure() {
    let meta = metadata_with_exposure(120.0);
    let rec = advise(&quiet_saturation(), 10.0, &meta);
    assert_relative_eq!(rec.recommended_exposure, 120.0);
    assert_relative_eq!(rec.exposure_factor, 1.0);
}

#[test]
fn test_recommendation_is_always_clamped() {
    let meta = metadata_with_exposure(60.0);
    for snr in [0.0, 1e-6, 1e6, f64::NAN, -3.0] {
        let rec = advise(&quiet_saturation(), snr, &meta);
        assert!(
            (30.0..=600.0).contains(&rec.recommended_exposure),
            "snr {snr} gave {}",
            rec.recommended_exposure
        );
    }
    assert_relative_eq!(advise(&quiet_saturation(), 1e-6, &meta).recommended_exposure, 600.0);
    assert_relative_eq!(advise(&quiet_saturation(), 1e6, &meta).recommended_exposure, 30.0);
}

#[test]
fn test_unmeasured_snr_quadruples() {
    let meta = metadata_with_exposure(60.0);
    let rec = advise(&quiet_saturation(), 0.0, &meta);
    assert_relative_eq!(rec.recommended_exposure, 240.0);
    assert_eq!(rec.reason, ExposureReason::SnrOptimization);
}

#[test]
fn test_custom_target_snr() {
    let meta = metadata_with_exposure(60.0);
    let config = ExposureConfig {
        target_snr: 20.0,
        ..Default::default()
    };
    let rec = advise_exposure(
        &quiet_saturation(),
        10.0,
        &sky_for(&meta, 1000.0),
        &meta,
        false,
        &config,
    )
    .unwrap();
    assert_relative_eq!(rec.recommended_exposure, 240.0);
}

// ---------------------------------------------------------------------------
// Saturation branch
// ---------------------------------------------------------------------------

#[test]
fn test_high_saturation_halves_exposure() {
    let sat = high_saturation();
    assert_eq!(sat.severity, SaturationSeverity::High);
    let meta = metadata_with_exposure(300.0);
    let rec = advise(&sat, 50.0, &meta);
    assert_eq!(rec.reason, ExposureReason::Saturation);
    assert_relative_eq!(rec.recommended_exposure, 150.0);
    assert!(rec.saturation_warning);
}

#[test]
fn test_moderate_saturation_reduces_by_seventy_percent() {
    let sat = moderate_saturation();
    assert_eq!(sat.severity, SaturationSeverity::Moderate);
    let meta = metadata_with_exposure(300.0);
    let rec = advise(&sat, 5.0, &meta);
    assert_eq!(rec.reason, ExposureReason::Saturation);
    assert_relative_eq!(rec.recommended_exposure, 210.0, epsilon = 1e-9);
}

#[test]
fn test_saturation_reduction_is_clamped() {
    let meta = metadata_with_exposure(40.0);
    let rec = advise(&high_saturation(), 5.0, &meta);
    assert_relative_eq!(rec.recommended_exposure, 30.0);
}

#[test]
fn test_hot_pixel_minor_uses_snr_branch() {
    let mut data = uniform(100, 100, 1000.0);
    data[[10, 10]] = SATURATION as f32;
    let sat = classify_saturation(&data, SATURATION).unwrap();
    assert_eq!(sat.severity, SaturationSeverity::Minor);
    let rec = advise(&sat, 5.0, &metadata_with_exposure(60.0));
    assert_eq!(rec.reason, ExposureReason::SnrOptimization);
}

// ---------------------------------------------------------------------------
// Metadata edge cases
// ---------------------------------------------------------------------------

#[test]
fn test_zero_exposure_is_indeterminate() {
    let meta = metadata_with_exposure(0.0);
    let rec = advise(&quiet_saturation(), 5.0, &meta);
    assert!(rec.indeterminate);
    assert_relative_eq!(rec.exposure_factor, 1.0);
    assert_relative_eq!(rec.recommended_exposure, 30.0);
}

#[test]
fn test_missing_exposure_defaults_to_one_second() {
    let meta = FrameMetadata::default();
    let rec = advise(&quiet_saturation(), 5.0, &meta);
    assert_relative_eq!(rec.current_exposure, 1.0);
    assert_relative_eq!(rec.recommended_exposure, 30.0);
}

#[test]
fn test_strict_metadata_requires_exposure() {
    let meta = FrameMetadata::default();
    let err = advise_exposure(
        &quiet_saturation(),
        5.0,
        &sky_for(&meta, 100.0),
        &meta,
        true,
        &ExposureConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CentaurError::MissingMetadata("EXPTIME")));
}

// ---------------------------------------------------------------------------
// Narrowband, sub length and noise regime
// ---------------------------------------------------------------------------

#[test]
fn test_narrowband_filters() {
    assert!(is_narrowband("Ha"));
    assert!(is_narrowband("H-alpha 7nm Ha"));
    assert!(is_narrowband("sii"));
    assert!(is_narrowband("OIII"));
    assert!(!is_narrowband("Lum"));
    assert!(!is_narrowband("Red"));
}

#[test]
fn test_narrowband_adjustment() {
    let mut meta = metadata_with_exposure(60.0);
    meta.filter = Some("OIII".into());
    let rec = advise(&quiet_saturation(), 5.0, &meta);
    assert!(rec.narrowband.is_narrowband);
    assert_relative_eq!(rec.narrowband.factor, 0.6);
    assert_relative_eq!(rec.narrowband.recommended_exposure, 144.0, epsilon = 1e-9);

    meta.filter = Some("Lum".into());
    let rec = advise(&quiet_saturation(), 5.0, &meta);
    assert!(!rec.narrowband.is_narrowband);
    assert_relative_eq!(rec.narrowband.factor, 1.0);
    assert_relative_eq!(rec.narrowband.recommended_exposure, rec.recommended_exposure);
}

#[test]
fn test_optimal_sub_length() {
    let config = ExposureConfig::default();
    assert_relative_eq!(optimal_sub_length(10.0, 1.0, &config).unwrap(), 100.0);
    assert_relative_eq!(optimal_sub_length(10.0, 0.1, &config).unwrap(), 300.0);
    assert_relative_eq!(optimal_sub_length(10.0, 10.0, &config).unwrap(), 60.0);
    assert_relative_eq!(optimal_sub_length(10.0, 0.0, &config).unwrap(), 180.0);
}

#[test]
fn test_read_noise_regime() {
    // 25 e- of sky: sky noise 5 e- below 10 e- read noise.
    let meta = metadata_with_exposure(60.0);
    let rec = advise_exposure(
        &quiet_saturation(),
        5.0,
        &sky_for(&meta, 25.0),
        &meta,
        false,
        &ExposureConfig::default(),
    )
    .unwrap();
    assert!(rec.read_noise_dominant);
    assert_relative_eq!(rec.noise_regime.sky_noise, 5.0);

    let rec = advise(&quiet_saturation(), 5.0, &meta);
    assert!(!rec.read_noise_dominant);
}

#[test]
fn test_exposure_config_validation() {
    let inverted = ExposureConfig {
        min_exposure: 700.0,
        ..Default::default()
    };
    assert!(inverted.validate().is_err());
    let zero_target = ExposureConfig {
        target_snr: 0.0,
        ..Default::default()
    };
    assert!(zero_target.validate().is_err());
    assert!(ExposureConfig::default().validate().is_ok());
}

#[test]
fn test_inverted_bounds_are_rejected_not_clamped() {
    let meta = metadata_with_exposure(60.0);
    let inverted = ExposureConfig {
        min_exposure: 700.0,
        ..Default::default()
    };
    let err = advise_exposure(
        &quiet_saturation(),
        5.0,
        &sky_for(&meta, 1000.0),
        &meta,
        false,
        &inverted,
    )
    .unwrap_err();
    assert!(matches!(err, CentaurError::InvalidConfiguration(_)));

    let inverted_subs = ExposureConfig {
        min_sub_length: 400.0,
        ..Default::default()
    };
    let err = optimal_sub_length(10.0, 1.0, &inverted_subs).unwrap_err();
    assert!(matches!(err, CentaurError::InvalidConfiguration(_)));

    let nan_bound = ExposureConfig {
        max_exposure: f64::NAN,
        ..Default::default()
    };
    assert!(advise_exposure(
        &quiet_saturation(),
        5.0,
        &sky_for(&meta, 1000.0),
        &meta,
        false,
        &nan_bound,
    )
    .is_err());
}

#[test]
fn test_reason_serializes_snake_case() {
    assert_eq!(
        serde_json::to_value(ExposureReason::SnrOptimization).unwrap(),
        serde_json::json!("snr_optimization")
    );
}
