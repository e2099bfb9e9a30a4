use tracing::{info, warn};

use crate::background::separate_background;
use crate::consts::ANALYZER_VERSION;
use crate::detection::stars::star_metrics;
use crate::error::{CentaurError, Result};
use crate::exposure::advise_exposure;
use crate::frame::Frame;
use crate::profile::ProfileCheck;
use crate::report::{
    build_quality_notes, build_recommendations, AnalysisOutcome, AnalysisReport, FrameInfo,
    ImageStats,
};
use crate::saturation::classify_saturation;
use crate::sky::sky_brightness;
use crate::snr::{estimate_snr, NoiseParams};
use crate::stats::{finite_min_max, image_statistics};

use super::config::AnalysisConfig;
use super::types::{AnalysisInputs, AnalysisStage, NoOpReporter, ProgressReporter};

/// Analyze one frame, reporting stage progress.
///
/// Only an empty frame, a non-positive saturation level, an invalid
/// config, or (in strict mode) a missing exposure time abort the
/// analysis. Degraded sub-results are recorded in `warnings`.
pub fn analyze_frame_reported(
    frame: &Frame,
    inputs: &AnalysisInputs<'_>,
    config: &AnalysisConfig,
    reporter: &dyn ProgressReporter,
) -> Result<AnalysisReport> {
    config.validate()?;
    if frame.is_empty() {
        return Err(CentaurError::InsufficientData(format!(
            "{} has an empty pixel array",
            frame.filename
        )));
    }
    let data = &frame.data;
    let metadata = &frame.metadata;
    let saturation_level = metadata.saturation_level()?;
    let exposure_time = metadata.exposure_time(config.strict_metadata)?;
    let mut warnings = Vec::new();

    info!(
        file = %frame.filename,
        width = frame.width(),
        height = frame.height(),
        "Analyzing frame"
    );

    reporter.begin_stage(AnalysisStage::Statistics);
    let whole = image_statistics(data, None, &config.sigma_clip)?;
    let (min, max) = finite_min_max(data).unwrap_or((0.0, 0.0));
    reporter.finish_stage();

    reporter.begin_stage(AnalysisStage::Saturation);
    let saturation = classify_saturation(data, saturation_level)?;
    reporter.finish_stage();

    reporter.begin_stage(AnalysisStage::Background);
    let mut source_mask = inputs.sources.and_then(|s| s.mask.as_ref());
    if let Some(mask) = source_mask {
        if mask.dim() != data.dim() {
            let e = CentaurError::ShapeMismatch {
                expected: data.dim(),
                found: mask.dim(),
            };
            warn!(error = %e, "Ignoring source mask");
            warnings.push(format!("Source mask ignored: {e}"));
            source_mask = None;
        }
    }
    let background = separate_background(
        data,
        saturation_level,
        source_mask,
        &config.background,
        &config.sigma_clip,
    )?;
    reporter.finish_stage();

    reporter.begin_stage(AnalysisStage::SignalToNoise);
    // Source-based sizing only applies when the aperture sits on that source.
    let brightest = inputs.sources.and_then(|s| s.brightest());
    let (position, aperture_source) = match inputs.position {
        Some(p) => (Some(p), None),
        None => match brightest.and_then(|s| s.x.zip(s.y)) {
            Some(p) => (Some(p), brightest),
            None => (None, None),
        },
    };
    let geometry = config.aperture.geometry_for(aperture_source);
    let noise = NoiseParams {
        read_noise: metadata.read_noise(),
        dark_current: metadata.dark_current(),
        exposure_time,
    };
    let snr = estimate_snr(data, position, &geometry, &noise, &background);
    if let Some(reason) = &snr.aperture_failure {
        warnings.push(format!("Aperture SNR unavailable: {reason}"));
    }
    reporter.finish_stage();

    reporter.begin_stage(AnalysisStage::SkyBrightness);
    let focal_fallback = inputs.profile.and_then(|p| p.focal_length_mm);
    let sky = sky_brightness(background.median, metadata, exposure_time, focal_fallback);
    reporter.finish_stage();

    reporter.begin_stage(AnalysisStage::Exposure);
    let exposure = advise_exposure(
        &saturation,
        snr.measured(),
        &sky,
        metadata,
        config.strict_metadata,
        &config.exposure,
    )?;
    reporter.finish_stage();

    reporter.begin_stage(AnalysisStage::Report);
    let stars = inputs.sources.and_then(|s| star_metrics(&s.sources));

    let profile_checks: Vec<ProfileCheck> = match inputs.profile {
        Some(profile) => {
            let mut metrics = vec![
                ("snr", snr.measured()),
                ("background_median", background.median),
                ("near_saturated_percent", saturation.near_saturated_percent()),
            ];
            if let Some(mag) = sky.mag_per_arcsec2 {
                metrics.push(("sky_mag_per_arcsec2", mag));
            }
            if let Some(s) = &stars {
                metrics.push(("hfr", s.hfr));
                metrics.push(("roundness", s.roundness));
            }
            profile.check_all(metrics)
        }
        None => Vec::new(),
    };

    let recommendations = build_recommendations(&saturation, &exposure, &sky);
    let quality_notes = build_quality_notes(stars.as_ref());

    let dynamic_range = if whole.std > 0.0 { max / whole.std } else { 0.0 };
    let report = AnalysisReport {
        frame: FrameInfo {
            filename: frame.filename.clone(),
            dimensions: [frame.height(), frame.width()],
            filter: metadata.filter.clone(),
            target: metadata.target.clone(),
            exposure_from_header: metadata.exposure_time,
            gain: metadata.gain,
            saturation_level: metadata.saturation_level,
        },
        image_stats: ImageStats {
            mean: whole.mean,
            median: whole.median,
            std: whole.std,
            min,
            max,
            dynamic_range,
            num_sources_detected: background.source_regions,
        },
        saturation,
        background,
        snr,
        sky,
        exposure,
        stars,
        profile_checks,
        recommendations,
        quality_notes,
        warnings,
        analyzer_version: ANALYZER_VERSION.to_string(),
    };
    reporter.finish_stage();

    info!(
        file = %frame.filename,
        severity = %report.saturation.severity,
        recommended = report.exposure.recommended_exposure,
        "Analysis complete"
    );
    Ok(report)
}

/// Analyze one frame without progress reporting.
pub fn analyze_frame(
    frame: &Frame,
    inputs: &AnalysisInputs<'_>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    analyze_frame_reported(frame, inputs, config, &NoOpReporter)
}

/// Analyze one frame, turning any abort into a tagged failure.
pub fn analyze_outcome(
    frame: &Frame,
    inputs: &AnalysisInputs<'_>,
    config: &AnalysisConfig,
) -> AnalysisOutcome {
    match analyze_frame(frame, inputs, config) {
        Ok(report) => AnalysisOutcome::Success {
            report: Box::new(report),
        },
        Err(e) => {
            warn!(file = %frame.filename, error = %e, "Analysis failed");
            AnalysisOutcome::failed(frame.filename.clone(), &e)
        }
    }
}
