use std::path::PathBuf;

use anyhow::Result;
use centaur_core::io::fits::FitsReader;
use clap::Args;

#[derive(Args)]
pub struct InfoArgs {
    /// Input FITS file
    pub file: PathBuf,

    /// Also list every header keyword
    #[arg(long)]
    pub all: bool,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let reader = FitsReader::open(&args.file)?;
    let meta = reader.metadata();

    let show = |v: Option<f64>, unit: &str| match v {
        Some(v) => format!("{v}{unit}"),
        None => "-".to_string(),
    };

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}x{}", reader.width(), reader.height());
    println!("BITPIX:      {}", reader.bitpix());
    println!("Exposure:    {}", show(meta.exposure_time, " s"));
    println!("Gain:        {}", show(meta.gain, " e-/ADU"));
    println!("Read noise:  {}", show(meta.read_noise, " e-"));
    println!("Saturation:  {}", show(meta.saturation_level, " ADU"));
    println!("Pixel scale: {}", show(meta.pixel_scale, "\"/px"));
    println!("Focal len.:  {}", show(meta.focal_length_mm, " mm"));
    println!("Pixel size:  {}", show(meta.pixel_size_um, " um"));
    if let Some(ref filter) = meta.filter {
        println!("Filter:      {}", filter);
    }
    if let Some(ref target) = meta.target {
        println!("Target:      {}", target);
    }

    if args.all {
        println!("\nHeader ({} keywords):", reader.header.len());
        for (key, value) in reader.header.iter() {
            println!("  {:<8} = {:?}", key, value);
        }
    }

    Ok(())
}
