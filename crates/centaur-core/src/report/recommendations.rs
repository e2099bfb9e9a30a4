use crate::consts::{
    BRIGHT_SKY_MAG, DARK_SKY_MAG, FEW_STARS_COUNT, POOR_FOCUS_HFR, SOFT_FOCUS_HFR,
    SUB_LENGTH_TOLERANCE,
};
use crate::detection::StarMetrics;
use crate::exposure::ExposureRecommendation;
use crate::saturation::{SaturationReport, SaturationSeverity};
use crate::sky::SkyBrightness;

/// Human-readable advice, in a fixed rule order: saturation, exposure
/// factor, narrowband, sub length, sky brightness, noise regime.
pub fn build_recommendations(
    saturation: &SaturationReport,
    exposure: &ExposureRecommendation,
    sky: &SkyBrightness,
) -> Vec<String> {
    let mut out = Vec::new();
    saturation_rule(&mut out, saturation, exposure);
    exposure_factor_rule(&mut out, exposure);
    narrowband_rule(&mut out, exposure);
    sub_length_rule(&mut out, exposure);
    sky_rule(&mut out, sky);
    noise_regime_rule(&mut out, exposure);
    out
}

fn saturation_rule(
    out: &mut Vec<String>,
    sat: &SaturationReport,
    exposure: &ExposureRecommendation,
) {
    let percent = sat.near_saturated_percent();
    match sat.severity {
        SaturationSeverity::High => {
            out.push(format!(
                "SATURATION: {percent:.3}% of pixels near saturation"
            ));
            out.push(format!(
                "   Reduce exposure to {:.0}s (currently {}s)",
                exposure.recommended_exposure, exposure.current_exposure
            ));
        }
        SaturationSeverity::Moderate => {
            out.push(format!("Note: {percent:.3}% of pixels near saturation"));
            if sat.likely_hot_pixels {
                out.push("   Likely hot pixels, not object saturation".to_string());
            }
        }
        SaturationSeverity::Minor if sat.likely_hot_pixels => {
            out.push(format!(
                "Note: Few hot pixels detected ({} pixels)",
                sat.near_saturated_pixels
            ));
            out.push("   Consider dark frame calibration".to_string());
        }
        SaturationSeverity::Minor => {
            out.push(format!(
                "Note: {} pixels reach the saturation level in clustered regions",
                sat.near_saturated_pixels
            ));
        }
        SaturationSeverity::None => {
            out.push("No significant saturation detected".to_string());
        }
    }
}

fn exposure_factor_rule(out: &mut Vec<String>, exposure: &ExposureRecommendation) {
    let rec = exposure.recommended_exposure;
    if exposure.indeterminate {
        out.push(format!(
            "Exposure time unknown; suggested starting exposure {rec:.0}s"
        ));
        return;
    }
    let factor = exposure.exposure_factor;
    let line = if factor > 2.0 {
        format!("Significantly increase exposure to {rec:.0}s")
    } else if factor > 1.2 {
        format!("Consider increasing exposure to {rec:.0}s")
    } else if factor < 0.5 {
        format!("Significantly decrease exposure to {rec:.0}s")
    } else if factor < 0.8 {
        format!("Consider decreasing exposure to {rec:.0}s")
    } else {
        format!("Exposure time is good: {}s", exposure.current_exposure)
    };
    out.push(line);
}

fn narrowband_rule(out: &mut Vec<String>, exposure: &ExposureRecommendation) {
    let nb = &exposure.narrowband;
    if nb.factor < 1.0 {
        out.push(format!(
            "For SII/OIII: {:.0}s ({:.1}x Ha)",
            nb.recommended_exposure, nb.factor
        ));
    }
}

fn sub_length_rule(out: &mut Vec<String>, exposure: &ExposureRecommendation) {
    let current = exposure.current_exposure;
    let optimal = exposure.optimal_sub_length;
    if (current - optimal).abs() > SUB_LENGTH_TOLERANCE {
        out.push(format!(
            "Optimal sub length: {optimal:.0}s (currently {current}s)"
        ));
    }
}

fn sky_rule(out: &mut Vec<String>, sky: &SkyBrightness) {
    if let Some(mag) = sky.mag_per_arcsec2 {
        if mag < BRIGHT_SKY_MAG {
            out.push(format!("Bright sky ({mag:.1} mag/arcsec²)"));
        } else if mag > DARK_SKY_MAG {
            out.push(format!("Dark sky ({mag:.1} mag/arcsec²)"));
        }
    }
}

fn noise_regime_rule(out: &mut Vec<String>, exposure: &ExposureRecommendation) {
    if exposure.read_noise_dominant {
        out.push("Read-noise limited. Longer subs would help.".to_string());
    } else {
        out.push("Sky-noise limited. Good exposure.".to_string());
    }
}

/// Focus, guiding and sky-condition notes from star shapes. Empty when no
/// source catalog was supplied.
pub fn build_quality_notes(stars: Option<&StarMetrics>) -> Vec<String> {
    let Some(stars) = stars else {
        return Vec::new();
    };
    let mut out = Vec::new();
    if stars.hfr > POOR_FOCUS_HFR {
        out.push(format!(
            "Poor focus (HFR {:.2} px). Consider refocusing",
            stars.hfr
        ));
    } else if stars.hfr > SOFT_FOCUS_HFR {
        out.push(format!(
            "Focus acceptable but could improve (HFR {:.2} px)",
            stars.hfr
        ));
    }
    if stars.has_trailing {
        out.push(format!(
            "Star trailing detected (roundness {:.2}). Check guiding/tracking",
            stars.roundness
        ));
    }
    if stars.star_count < FEW_STARS_COUNT {
        out.push(format!(
            "Few stars detected ({}). Check for clouds or focus",
            stars.star_count
        ));
    }
    out
}
