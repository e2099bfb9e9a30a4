use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use centaur_core::frame::{SourceCatalog, SourceRecord};
use centaur_core::io::fits::FitsReader;
use centaur_core::pipeline::{
    analyze_frame_reported, analyze_outcome, AnalysisConfig, AnalysisInputs, AnalysisStage,
    ProgressReporter,
};
use centaur_core::profile::OpticalProfile;
use centaur_core::report::AnalysisOutcome;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::summary::{print_batch_summary, print_outcome};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input FITS files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Analysis config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Optical profile with learned thresholds (TOML)
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Aperture centre as "x,y" in pixels
    #[arg(long, value_parser = parse_position)]
    pub position: Option<(f64, f64)>,

    /// Detected sources as a JSON array (x, y, flux, semi_major, semi_minor)
    #[arg(long)]
    pub sources: Option<PathBuf>,

    /// Sigma clipping threshold
    #[arg(long)]
    pub sigma: Option<f64>,

    /// Fail when EXPTIME is missing instead of assuming 1 s
    #[arg(long)]
    pub strict: bool,

    /// Print reports as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Write JSON reports to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_position(s: &str) -> std::result::Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got \"{s}\""))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate \"{v}\": {e}"))
    };
    Ok((parse(x)?, parse(y)?))
}

/// Stage-by-stage spinner for a single-frame analysis.
struct SpinnerReporter {
    pb: ProgressBar,
}

impl ProgressReporter for SpinnerReporter {
    fn begin_stage(&self, stage: AnalysisStage) {
        self.pb.set_message(stage.to_string());
    }

    fn finish_stage(&self) {
        self.pb.inc(1);
    }
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let mut config: AnalysisConfig = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid analysis config")?
    } else {
        AnalysisConfig::default()
    };
    if let Some(sigma) = args.sigma {
        config.sigma_clip.sigma = sigma;
    }
    config.strict_metadata |= args.strict;
    config.validate()?;

    let profile: Option<OpticalProfile> = match args.profile {
        Some(ref path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read profile {}", path.display()))?;
            Some(toml::from_str(&contents).context("Invalid optical profile")?)
        }
        None => None,
    };

    let catalog = match args.sources {
        Some(ref path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read sources {}", path.display()))?;
            let records: Vec<SourceRecord> =
                serde_json::from_str(&contents).context("Invalid source list")?;
            Some(SourceCatalog::new(None, records))
        }
        None => None,
    };

    if args.files.len() > 1 && (args.position.is_some() || catalog.is_some()) {
        bail!("--position and --sources apply to a single frame");
    }

    let inputs = AnalysisInputs {
        sources: catalog.as_ref(),
        position: args.position,
        profile: profile.as_ref(),
    };

    let outcomes = if args.files.len() == 1 {
        vec![analyze_single(&args.files[0], &inputs, &config)?]
    } else {
        analyze_batch(&args.files, &inputs, &config)?
    };

    if let Some(ref path) = args.output {
        let json = serde_json::to_string_pretty(&outcomes)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            print_outcome(outcome);
        }
        if outcomes.len() > 1 {
            print_batch_summary(&outcomes);
        }
        if let Some(ref path) = args.output {
            println!("Reports saved to {}", path.display());
        }
    }

    Ok(())
}

fn analyze_single(
    path: &Path,
    inputs: &AnalysisInputs<'_>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome> {
    let frame = match FitsReader::open(path).and_then(|r| r.read_frame()) {
        Ok(frame) => frame,
        Err(e) => return Ok(AnalysisOutcome::failed(display_name(path), &e)),
    };

    let pb = ProgressBar::new(7);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:28} [{bar:30}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let reporter = SpinnerReporter { pb };

    let outcome = match analyze_frame_reported(&frame, inputs, config, &reporter) {
        Ok(report) => AnalysisOutcome::Success {
            report: Box::new(report),
        },
        Err(e) => AnalysisOutcome::failed(frame.filename.clone(), &e),
    };
    reporter.pb.finish_and_clear();
    Ok(outcome)
}

fn analyze_batch(
    files: &[PathBuf],
    inputs: &AnalysisInputs<'_>,
    config: &AnalysisConfig,
) -> Result<Vec<AnalysisOutcome>> {
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Analyzing frames");

    let outcomes = files
        .par_iter()
        .map(|path| {
            let outcome = match FitsReader::open(path).and_then(|r| r.read_frame()) {
                Ok(frame) => analyze_outcome(&frame, inputs, config),
                Err(e) => AnalysisOutcome::failed(display_name(path), &e),
            };
            pb.inc(1);
            outcome
        })
        .collect();

    pb.finish_with_message("Done");
    Ok(outcomes)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("12.5, 40").unwrap(), (12.5, 40.0));
        assert!(parse_position("12.5").is_err());
        assert!(parse_position("a,b").is_err());
    }
}
