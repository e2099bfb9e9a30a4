use centaur_core::profile::ThresholdStatus;
use centaur_core::report::{AnalysisOutcome, AnalysisReport};
use centaur_core::saturation::SaturationSeverity;
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    good: Style,
    warn: Style,
    bad: Style,
    disabled: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            good: Style::new().green(),
            warn: Style::new().yellow(),
            bad: Style::new().red().bold(),
            disabled: Style::new().dim().yellow(),
        }
    }

    fn severity(&self, severity: SaturationSeverity) -> &Style {
        match severity {
            SaturationSeverity::None => &self.good,
            SaturationSeverity::Minor => &self.warn,
            SaturationSeverity::Moderate | SaturationSeverity::High => &self.bad,
        }
    }

    fn status(&self, status: ThresholdStatus) -> &Style {
        match status {
            ThresholdStatus::Ok => &self.good,
            ThresholdStatus::Warning => &self.warn,
            ThresholdStatus::Critical => &self.bad,
        }
    }
}

pub fn print_outcome(outcome: &AnalysisOutcome) {
    match outcome {
        AnalysisOutcome::Success { report } => print_report(report),
        AnalysisOutcome::Failed { filename, error } => {
            let s = Styles::new();
            println!();
            println!(
                "  {} {}",
                s.bad.apply_to("FAILED"),
                s.value.apply_to(filename)
            );
            println!("    {}", s.label.apply_to(error));
            println!();
        }
    }
}

pub fn print_report(report: &AnalysisReport) {
    let s = Styles::new();
    let rule = "\u{2550}".repeat(report.frame.filename.chars().count().max(16));

    println!();
    println!("  {}", s.title.apply_to(&report.frame.filename));
    println!("  {}", s.title.apply_to(rule));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Dimensions"),
        s.value.apply_to(format!(
            "{}x{}",
            report.frame.dimensions[1], report.frame.dimensions[0]
        ))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Filter"),
        match report.frame.filter {
            Some(ref f) => s.value.apply_to(f.clone()),
            None => s.disabled.apply_to("unknown".to_string()),
        }
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Exposure"),
        s.value.apply_to(format!("{}s", report.exposure.current_exposure))
    );
    println!();

    // Saturation
    let sat = &report.saturation;
    println!("  {}", s.header.apply_to("Saturation"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Severity"),
        s.severity(sat.severity).apply_to(sat.severity)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Max"),
        s.value
            .apply_to(format!("{:.0} ADU ({:.1}%)", sat.max_value, sat.max_percentage))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Near sat."),
        s.value.apply_to(format!(
            "{} px ({:.3}%) in {} regions",
            sat.near_saturated_pixels,
            sat.near_saturated_percent(),
            sat.saturated_regions
        ))
    );
    println!();

    // Background
    let bg = &report.background;
    println!("  {}", s.header.apply_to("Background"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Median"),
        s.value.apply_to(format!("{:.1} ADU", bg.median))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Std"),
        s.value.apply_to(format!("{:.2} ADU", bg.std))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Mask"),
        s.value.apply_to(bg.mask_stage)
    );
    match report.sky.mag_per_arcsec2 {
        Some(mag) => println!(
            "    {:<12}{}",
            s.label.apply_to("Sky"),
            s.value.apply_to(format!("{:.2} mag/arcsec\u{b2}", mag))
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Sky"),
            s.disabled.apply_to("no plate scale")
        ),
    }
    println!();

    // SNR
    let snr = &report.snr;
    println!("  {}", s.header.apply_to("Signal to noise"));
    match snr.blended_snr {
        Some(v) => println!(
            "    {:<12}{}",
            s.label.apply_to("Aperture"),
            s.value.apply_to(format!("{:.1}", v))
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Aperture"),
            s.disabled.apply_to("not measured")
        ),
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("3\u{3c3} / 10\u{3c3}"),
        s.value.apply_to(format!(
            "{:.1} / {:.1}",
            snr.background.snr_faint_object, snr.background.snr_moderate_object
        ))
    );
    println!();

    // Exposure
    let exp = &report.exposure;
    println!("  {}", s.header.apply_to("Exposure"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Recommend"),
        s.value.apply_to(format!(
            "{:.0}s (x{:.2}, {})",
            exp.recommended_exposure, exp.exposure_factor, exp.reason
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Sub length"),
        s.value.apply_to(format!("{:.0}s", exp.optimal_sub_length))
    );
    println!();

    if let Some(ref stars) = report.stars {
        println!("  {}", s.header.apply_to("Stars"));
        println!(
            "    {:<12}{}",
            s.label.apply_to("HFR"),
            s.value
                .apply_to(format!("{:.2} px ({} stars)", stars.hfr, stars.star_count))
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Roundness"),
            if stars.has_trailing {
                s.warn.apply_to(format!("{:.2} (trailing)", stars.roundness))
            } else {
                s.value.apply_to(format!("{:.2}", stars.roundness))
            }
        );
        println!();
    }

    if !report.profile_checks.is_empty() {
        println!("  {}", s.header.apply_to("Profile"));
        for check in &report.profile_checks {
            println!(
                "    {:<24}{:>10.2}  {}",
                s.label.apply_to(&check.metric),
                check.value,
                s.status(check.status).apply_to(check.status)
            );
        }
        println!();
    }

    println!("  {}", s.header.apply_to("Recommendations"));
    for line in &report.recommendations {
        println!("    {}", line);
    }
    for note in &report.quality_notes {
        println!("    {}", note);
    }
    for warning in &report.warnings {
        println!("    {}", s.warn.apply_to(warning));
    }
    println!();
}

pub fn print_batch_summary(outcomes: &[AnalysisOutcome]) {
    let s = Styles::new();
    let ok = outcomes.iter().filter(|o| o.is_success()).count();
    let failed = outcomes.len() - ok;

    println!("  {}", s.title.apply_to("Batch"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Analyzed"),
        s.good.apply_to(ok)
    );
    if failed > 0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Failed"),
            s.bad.apply_to(failed)
        );
    }
    println!();
}
